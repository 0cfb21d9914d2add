//! Synchronous two-way fan-out of posts.
//!
//! A [`Broadcaster`] holds a live sink (the board) and a persist sink
//! (the store). Every post is handed to both, live first, and `send`
//! only returns once both have accepted it. The pipeline awaits `send`
//! before touching the next post, so both sinks see the same order.

use std::sync::Arc;

use async_trait::async_trait;

use crate::board::Board;
use crate::error::Result;
use crate::models::Post;
use crate::storage::{PostStore, StoreSummary};

/// Downstream consumer of pipeline output.
#[async_trait]
pub trait PostSink: Send + Sync {
    /// Accept one post. Returns once the post is applied.
    async fn accept(&self, post: &Post) -> Result<()>;
}

/// Live sink: appends to the shared board.
pub struct BoardSink {
    board: Arc<Board>,
}

impl BoardSink {
    pub fn new(board: Arc<Board>) -> Self {
        Self { board }
    }
}

#[async_trait]
impl PostSink for BoardSink {
    async fn accept(&self, post: &Post) -> Result<()> {
        self.board.add_post(post.clone());
        Ok(())
    }
}

/// Persist sink: appends to one blog's record set.
///
/// Posts at or below the high-water id captured at open time are already
/// stored (they are replayed records) and are not written again.
pub struct StoreSink {
    store: Arc<dyn PostStore>,
    blog: String,
    stored_through: Option<i64>,
}

impl StoreSink {
    /// Open a sink for `blog`, reading its current high-water id.
    pub async fn open(store: Arc<dyn PostStore>, blog: impl Into<String>) -> Self {
        let blog = blog.into();
        let stored_through = match store.load(&blog).await {
            Ok(posts) => StoreSummary::of(&posts).max_id,
            Err(e) => {
                log::warn!("Could not read record set for {}: {}", blog, e);
                None
            }
        };
        Self {
            store,
            blog,
            stored_through,
        }
    }
}

#[async_trait]
impl PostSink for StoreSink {
    async fn accept(&self, post: &Post) -> Result<()> {
        if self.stored_through.is_some_and(|max| post.id <= max) {
            return Ok(());
        }
        self.store.append(&self.blog, post).await
    }
}

/// Relays each post to a live and a persist sink.
pub struct Broadcaster {
    live: Arc<dyn PostSink>,
    persist: Arc<dyn PostSink>,
}

impl Broadcaster {
    pub fn new(live: Arc<dyn PostSink>, persist: Arc<dyn PostSink>) -> Self {
        Self { live, persist }
    }

    /// Deliver `post` to both sinks and return how many of them failed.
    ///
    /// A failing sink does not stop delivery to the other one.
    pub async fn send(&self, post: &Post) -> usize {
        let mut failures = 0;
        for (name, sink) in [("live", &self.live), ("persist", &self.persist)] {
            if let Err(e) = sink.accept(post).await {
                failures += 1;
                log::warn!("{} sink rejected post {}: {}", name, post.id, e);
            }
        }
        failures
    }
}
