//! Read-only queries over a board snapshot.
//!
//! - `search`: case-insensitive title substring search with an offset window
//! - `stats`: post count and salient keywords
//! - `get_post` / `get_post_data`: lookup by raw path identifier
//! - `sorted`: copy of the snapshot ordered by id or likes
//!
//! Every function takes the snapshot by slice so handlers can call
//! `Board::posts()` once per request.

mod keywords;

use serde::{Deserialize, Serialize};

use crate::board::{sort_by_id, sort_by_likes};
use crate::error::{AppError, Result};
use crate::models::{Post, PostJson};

pub use keywords::{KeywordConfig, KeywordExtractor, TitleKeywords};

/// Response body of a search.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SearchResults {
    pub data: Vec<PostJson>,
    pub offset: usize,
    #[serde(rename = "totalResults")]
    pub total_results: usize,
}

/// Response body of the stats endpoint.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Stats {
    pub keywords: Vec<String>,
    #[serde(rename = "postCount")]
    pub post_count: String,
}

/// Single-post response body: `{"data":[post]}`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PostData {
    pub data: Vec<PostJson>,
}

/// Listing order for a snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Board arrival order
    #[default]
    Board,
    /// Descending id
    Id,
    /// Descending likes
    Likes,
}

/// Parse a raw `offset` parameter. Missing or malformed values become 0.
pub fn parse_offset(raw: Option<&str>) -> usize {
    raw.and_then(|s| s.trim().parse::<usize>().ok())
        .unwrap_or(0)
}

/// Search post titles for `query`, case-insensitively.
///
/// `totalResults` counts every match; `data` holds the matches from
/// `offset` on, capped at `page_size` when one is given.
pub fn search(posts: &[Post], query: &str, offset: usize, page_size: Option<usize>) -> SearchResults {
    let needle = query.to_lowercase();
    let matches: Vec<&Post> = posts
        .iter()
        .filter(|p| p.title.to_lowercase().contains(&needle))
        .collect();

    let window = matches
        .iter()
        .skip(offset)
        .take(page_size.unwrap_or(usize::MAX));

    SearchResults {
        data: window.map(|p| p.to_json()).collect(),
        offset,
        total_results: matches.len(),
    }
}

/// Post count and keywords for the board.
pub fn stats(posts: &[Post], extractor: &dyn KeywordExtractor) -> Stats {
    Stats {
        keywords: extractor.extract(posts),
        post_count: posts.len().to_string(),
    }
}

/// Look up a post by the raw identifier taken from a request path.
pub fn get_post(posts: &[Post], raw_id: &str) -> Result<Post> {
    let id: i64 = raw_id
        .parse()
        .map_err(|_| AppError::not_found(format!("malformed post id {raw_id:?}")))?;

    posts
        .iter()
        .find(|p| p.id == id)
        .cloned()
        .ok_or_else(|| AppError::not_found(format!("post {id}")))
}

/// Like [`get_post`], wrapped for the JSON data endpoint.
pub fn get_post_data(posts: &[Post], raw_id: &str) -> Result<PostData> {
    let post = get_post(posts, raw_id)?;
    Ok(PostData {
        data: vec![post.to_json()],
    })
}

/// Every post in the requested order, ready to serialize.
pub fn all_posts(posts: &[Post], order: SortOrder) -> Vec<PostJson> {
    sorted(posts, order).iter().map(PostJson::from).collect()
}

/// A sorted copy of the snapshot.
pub fn sorted(posts: &[Post], order: SortOrder) -> Vec<Post> {
    let mut posts = posts.to_vec();
    match order {
        SortOrder::Board => {}
        SortOrder::Id => sort_by_id(&mut posts),
        SortOrder::Likes => sort_by_likes(&mut posts),
    }
    posts
}
