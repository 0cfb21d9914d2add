// src/pipeline/sync.rs

//! Incremental blog sync.
//!
//! For one blog, stored posts are replayed first (stored order), then the
//! remote source is paged newest-first until a post at or below the
//! highest stored id shows up. Every emitted post goes through the
//! blog's [`Broadcaster`].

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;

use crate::board::Board;
use crate::models::Post;
use crate::pipeline::broadcast::{BoardSink, Broadcaster, PostSink, StoreSink};
use crate::services::{RemoteSource, parse_post};
use crate::storage::PostStore;

/// Outcome of one blog sync run.
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub blog: String,
    /// Stored posts replayed to the sinks
    pub replayed: usize,
    /// New posts fetched from the remote source and emitted
    pub fetched: usize,
    /// Remote pages fetched
    pub pages: usize,
    /// Remote entries that could not be parsed
    pub dropped: usize,
    /// Remote entries skipped because their id was already fetched this run
    pub duplicates: usize,
    /// Individual sink deliveries that failed
    pub sink_failures: usize,
    /// Pagination stopped at already-known history
    pub boundary_reached: bool,
    /// A page fetch failed and ended the new-post phase
    pub fetch_failed: bool,
    /// The run was cancelled before it finished
    pub cancelled: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SyncReport {
    fn start(blog: &str) -> Self {
        let now = Utc::now();
        Self {
            blog: blog.to_string(),
            replayed: 0,
            fetched: 0,
            pages: 0,
            dropped: 0,
            duplicates: 0,
            sink_failures: 0,
            boundary_reached: false,
            fetch_failed: false,
            cancelled: false,
            started_at: now,
            finished_at: now,
        }
    }

    fn finish(mut self) -> Self {
        self.finished_at = Utc::now();
        log::info!(
            "Synced {} in {}ms: {} replayed, {} new, {} pages{}{}{}",
            self.blog,
            self.elapsed().num_milliseconds(),
            self.replayed,
            self.fetched,
            self.pages,
            if self.boundary_reached { ", reached known history" } else { "" },
            if self.fetch_failed { ", fetch failed" } else { "" },
            if self.cancelled { ", cancelled" } else { "" },
        );
        self
    }

    /// Wall-clock duration of the run.
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    /// Total posts emitted to the sinks.
    pub fn emitted(&self) -> usize {
        self.replayed + self.fetched
    }
}

/// Per-run sync state.
struct SyncState {
    /// Highest stored id; the pagination boundary
    max_known_id: Option<i64>,
    /// Remote ids already emitted this run
    fetched_ids: HashSet<i64>,
    page_offset: usize,
}

impl SyncState {
    fn is_known(&self, id: i64) -> bool {
        self.max_known_id.is_some_and(|max| id <= max)
    }
}

/// Syncs blogs from a remote source against a post store.
pub struct SyncPipeline {
    source: Arc<dyn RemoteSource>,
    store: Arc<dyn PostStore>,
    page_size: usize,
}

impl SyncPipeline {
    pub fn new(source: Arc<dyn RemoteSource>, store: Arc<dyn PostStore>, page_size: usize) -> Self {
        Self {
            source,
            store,
            page_size: page_size.max(1),
        }
    }

    /// Sync one blog, broadcasting every emitted post.
    ///
    /// With `fetch_new == false` only stored posts are replayed. Errors
    /// never escape: they are logged and recorded in the report.
    pub async fn sync_blog(
        &self,
        blog: &str,
        fetch_new: bool,
        cancel: &CancellationToken,
        broadcaster: &Broadcaster,
    ) -> SyncReport {
        let mut report = SyncReport::start(blog);
        let mut state = SyncState {
            max_known_id: None,
            fetched_ids: HashSet::new(),
            page_offset: 0,
        };

        let stored = self.store.load(blog).await.unwrap_or_else(|e| {
            log::warn!("Could not read stored posts for {}: {}. Treating as empty.", blog, e);
            Vec::new()
        });

        for post in &stored {
            state.max_known_id = Some(state.max_known_id.map_or(post.id, |max| max.max(post.id)));
            match deliver(broadcaster, post, cancel).await {
                Some(failures) => report.sink_failures += failures,
                None => {
                    report.cancelled = true;
                    return report.finish();
                }
            }
            report.replayed += 1;
        }

        if !fetch_new {
            return report.finish();
        }

        loop {
            let offset = state.page_offset;
            let page = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    report.cancelled = true;
                    break;
                }
                page = self.source.fetch_page(blog, offset, self.page_size) => page,
            };

            let entries = match page {
                Ok(entries) => entries,
                Err(e) => {
                    log::warn!("Fetching {} at offset {} failed: {}", blog, offset, e);
                    report.fetch_failed = true;
                    break;
                }
            };
            report.pages += 1;
            let full_page = entries.len() >= self.page_size;

            for raw in &entries {
                let post = match parse_post(raw) {
                    Ok(post) => post,
                    Err(e) => {
                        log::warn!("Dropping malformed entry from {}: {}", blog, e);
                        report.dropped += 1;
                        continue;
                    }
                };

                if state.is_known(post.id) {
                    report.boundary_reached = true;
                    return report.finish();
                }
                if !state.fetched_ids.insert(post.id) {
                    // Shifted onto this page by posts published mid-sync.
                    log::debug!("Skipping repeated post {} from {}", post.id, blog);
                    report.duplicates += 1;
                    continue;
                }

                match deliver(broadcaster, &post, cancel).await {
                    Some(failures) => report.sink_failures += failures,
                    None => {
                        report.cancelled = true;
                        return report.finish();
                    }
                }
                report.fetched += 1;
            }

            state.page_offset += self.page_size;
            if !(full_page || offset == 0) {
                break;
            }
        }

        report.finish()
    }

    /// Sync one blog into `board` and its record set.
    pub async fn sync_into(
        &self,
        blog: &str,
        fetch_new: bool,
        board: Arc<Board>,
        cancel: &CancellationToken,
    ) -> SyncReport {
        let live: Arc<dyn PostSink> = Arc::new(BoardSink::new(board));
        let persist: Arc<dyn PostSink> =
            Arc::new(StoreSink::open(Arc::clone(&self.store), blog).await);
        let broadcaster = Broadcaster::new(live, persist);
        self.sync_blog(blog, fetch_new, cancel, &broadcaster).await
    }

    /// Sync every blog concurrently into a shared board.
    ///
    /// At most `max_concurrent` blogs run at once. Reports come back in
    /// completion order.
    pub async fn sync_all(
        &self,
        blogs: &[String],
        fetch_new: bool,
        board: Arc<Board>,
        max_concurrent: usize,
        cancel: &CancellationToken,
    ) -> Vec<SyncReport> {
        stream::iter(blogs.iter().cloned())
            .map(move |blog: String| {
                let board = Arc::clone(&board);
                async move { self.sync_into(&blog, fetch_new, board, cancel).await }
            })
            .buffer_unordered(max_concurrent.max(1))
            .collect()
            .await
    }
}

/// Broadcast one post unless `cancel` fires first.
///
/// Returns the sink failure count, or `None` when cancelled.
async fn deliver(
    broadcaster: &Broadcaster,
    post: &Post,
    cancel: &CancellationToken,
) -> Option<usize> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        failures = broadcaster.send(post) => Some(failures),
    }
}

/// Stored posts for a blog, without syncing.
pub async fn stored_posts(store: &dyn PostStore, blog: &str) -> Vec<Post> {
    store.load(blog).await.unwrap_or_else(|e| {
        log::warn!("Could not read stored posts for {}: {}", blog, e);
        Vec::new()
    })
}
