//! Service layer for talking to remote blogs.
//!
//! - `RemoteSource`: paginated, newest-first access to a blog's posts
//! - `TumblrClient`: `RemoteSource` over the Tumblr v2 API
//! - `parse_post`: raw API entry to [`Post`](crate::models::Post)

mod tumblr;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

pub use tumblr::{TumblrClient, extract_image, parse_post};

/// Paginated read-only access to a blog's posts.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Fetch up to `limit` raw entries starting at `offset`, newest first.
    async fn fetch_page(&self, blog: &str, offset: usize, limit: usize) -> Result<Vec<Value>>;
}
