//! Local filesystem storage implementation.
//!
//! Stores one JSON Lines file per blog. Each line is a full record with
//! fields in the order `id, title, url, image, likes`.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! └── {blog}.jsonl
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::Post;
use crate::storage::PostStore;

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Record file for a blog.
    pub fn path_for(&self, blog: &str) -> PathBuf {
        self.root_dir.join(format!("{}.jsonl", Self::file_stem(blog)))
    }

    /// Blog identifier made safe for use as a file name.
    fn file_stem(blog: &str) -> String {
        blog.chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self, path: &Path) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Parse JSON Lines, skipping blank and malformed lines.
    fn parse_records(blog: &str, bytes: &[u8]) -> Vec<Post> {
        let text = String::from_utf8_lossy(bytes);
        text.lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .filter_map(|(n, line)| match serde_json::from_str::<Post>(line) {
                Ok(post) => Some(post),
                Err(e) => {
                    log::warn!("Skipping malformed record {}:{}: {}", blog, n + 1, e);
                    None
                }
            })
            .collect()
    }
}

#[async_trait]
impl PostStore for LocalStorage {
    async fn load(&self, blog: &str) -> Result<Vec<Post>> {
        let path = self.path_for(blog);
        match self.read_bytes(&path).await? {
            Some(bytes) => Ok(Self::parse_records(blog, &bytes)),
            None => {
                log::debug!("No record set for {} at {}", blog, path.display());
                Ok(Vec::new())
            }
        }
    }

    async fn append(&self, blog: &str, post: &Post) -> Result<()> {
        let path = self.path_for(blog);
        tokio::fs::create_dir_all(&self.root_dir).await?;

        let mut line = serde_json::to_vec(post)?;
        line.push(b'\n');

        // One write per record keeps each line whole under O_APPEND.
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn post(id: i64, title: &str) -> Post {
        Post {
            id,
            title: title.to_string(),
            url: format!("https://example.tumblr.com/post/{id}"),
            image: "https://example.com/img.gif".to_string(),
            likes: id * 2,
        }
    }

    #[tokio::test]
    async fn test_load_missing_blog_is_empty() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        let posts = storage.load("new.tumblr.com").await.unwrap();
        assert!(posts.is_empty());
    }

    #[tokio::test]
    async fn test_append_then_load_keeps_order() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path().join("nested"));

        for p in [post(20, "b"), post(30, "c"), post(10, "a")] {
            storage.append("blog", &p).await.unwrap();
        }

        let loaded = storage.load("blog").await.unwrap();
        let ids: Vec<i64> = loaded.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![20, 30, 10]);
        assert_eq!(loaded[0], post(20, "b"));
    }

    #[tokio::test]
    async fn test_record_field_order() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        storage.append("blog", &post(1, "t")).await.unwrap();

        let raw = std::fs::read_to_string(storage.path_for("blog")).unwrap();
        assert_eq!(
            raw,
            "{\"id\":1,\"title\":\"t\",\"url\":\"https://example.tumblr.com/post/1\",\
             \"image\":\"https://example.com/img.gif\",\"likes\":2}\n"
        );
    }

    #[tokio::test]
    async fn test_malformed_lines_are_skipped() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        std::fs::write(
            storage.path_for("blog"),
            "{\"id\":1,\"title\":\"ok\"}\nnot json\n\n{\"id\":2}\n",
        )
        .unwrap();

        let ids: Vec<i64> = storage
            .load("blog")
            .await
            .unwrap()
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_blogs_are_isolated() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        storage.append("a.tumblr.com", &post(1, "a")).await.unwrap();
        storage.append("b.tumblr.com", &post(2, "b")).await.unwrap();

        assert_eq!(storage.load("a.tumblr.com").await.unwrap().len(), 1);
        assert_eq!(storage.load("b.tumblr.com").await.unwrap()[0].id, 2);
    }

    #[test]
    fn test_file_stem_sanitized() {
        assert_eq!(LocalStorage::file_stem("a/../b c"), "a_.._b_c");
        assert_eq!(LocalStorage::file_stem("x.tumblr.com"), "x.tumblr.com");
    }
}
