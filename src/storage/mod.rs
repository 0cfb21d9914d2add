//! Storage abstractions for post persistence.
//!
//! Each blog owns one append-only record set. Records are read back in
//! the order they were appended.
//!
//! ## Directory Structure
//!
//! ```text
//! data/
//! ├── devopsreactions.tumblr.com.jsonl   # one JSON record per line
//! └── another.tumblr.com.jsonl
//! ```

pub mod local;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Post;

// Re-export for convenience
pub use local::LocalStorage;

/// Trait for post storage backends.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Load every stored post for a blog, in stored order.
    ///
    /// A blog with no record set yields an empty vector.
    async fn load(&self, blog: &str) -> Result<Vec<Post>>;

    /// Append one post to a blog's record set.
    async fn append(&self, blog: &str, post: &Post) -> Result<()>;
}

/// Summary of a blog's stored record set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreSummary {
    pub count: usize,
    pub max_id: Option<i64>,
}

impl StoreSummary {
    pub fn of(posts: &[Post]) -> Self {
        Self {
            count: posts.len(),
            max_id: posts.iter().map(|p| p.id).max(),
        }
    }
}
