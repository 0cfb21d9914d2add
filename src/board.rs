// src/board.rs

//! In-memory post board shared by sync pipelines and request handlers.
//!
//! The board is created once per process and handed out as `Arc<Board>`.
//! Writers (pipeline live sinks) and readers (query handlers) go through
//! a single `RwLock`; no lock is ever held across an `.await`.

use std::cmp::Ordering;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::models::Post;

/// Concurrency-safe, insertion-ordered collection of posts.
#[derive(Debug, Default)]
pub struct Board {
    posts: RwLock<Vec<Post>>,
}

impl Board {
    /// Create an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a board seeded with posts, in the given order.
    pub fn with_posts(posts: Vec<Post>) -> Self {
        Self {
            posts: RwLock::new(posts),
        }
    }

    /// Append a post. No deduplication happens here.
    pub fn add_post(&self, post: Post) {
        self.write().push(post);
    }

    /// Clear the board.
    pub fn reset(&self) {
        self.write().clear();
    }

    /// Consistent snapshot of every post in arrival order.
    pub fn posts(&self) -> Vec<Post> {
        self.read().clone()
    }

    /// Find the first post with the given id.
    pub fn find(&self, id: i64) -> Option<Post> {
        self.read().iter().find(|p| p.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // Each mutation is a single push or clear, so a panic elsewhere can
    // never leave the vector half-written; recover from poisoning.
    fn read(&self) -> RwLockReadGuard<'_, Vec<Post>> {
        self.posts.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Post>> {
        self.posts.write().unwrap_or_else(|e| e.into_inner())
    }
}

/// Sort posts by descending id.
pub fn sort_by_id(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.id.cmp(&a.id));
}

/// Sort posts by descending likes, newest (highest id) first on ties.
pub fn sort_by_likes(posts: &mut [Post]) {
    posts.sort_by(|a, b| match b.likes.cmp(&a.likes) {
        Ordering::Equal => b.id.cmp(&a.id),
        other => other,
    });
}
