// src/models/post.rs

//! Post data structure.

use std::sync::OnceLock;

use deunicode::deunicode;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Maximum length of the slug part of an internal post path.
const SLUG_MAX_LEN: usize = 30;

/// A single blog post.
///
/// Field order matters: it is the persisted record order and the JSON
/// key order served to the frontend.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Post {
    /// Remote post identifier, unique within a blog
    pub id: i64,

    /// Post title (may be empty)
    #[serde(default)]
    pub title: String,

    /// Canonical external link
    #[serde(default)]
    pub url: String,

    /// Representative image URL (may be empty)
    #[serde(default)]
    pub image: String,

    /// Engagement count
    #[serde(default)]
    pub likes: i64,
}

impl Post {
    /// Path of the post on this site: `/post/{id}/{slug}`.
    pub fn internal_url(&self) -> String {
        format!("/post/{}/{}", self.id, slugify(&self.title))
    }

    /// Build the frontend representation of this post.
    pub fn to_json(&self) -> PostJson {
        PostJson {
            post: self.clone(),
            internal_url: self.internal_url(),
        }
    }
}

/// A post as served to the frontend, with its derived internal path.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PostJson {
    #[serde(flatten)]
    pub post: Post,

    #[serde(rename = "internalURL")]
    pub internal_url: String,
}

impl From<&Post> for PostJson {
    fn from(post: &Post) -> Self {
        post.to_json()
    }
}

/// Make a URL-safe slug of a title, truncated to 30 characters.
pub fn slugify(title: &str) -> String {
    static NON_ALNUM: OnceLock<Regex> = OnceLock::new();
    let re = NON_ALNUM.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("static regex"));

    let lowered = deunicode(title).to_lowercase();
    let slug = re.replace_all(&lowered, "-");
    let mut slug = slug.trim_matches('-').to_string();
    // ASCII only after transliteration and replacement, so byte truncation is safe
    slug.truncate(SLUG_MAX_LEN);
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_post() -> Post {
        Post {
            id: 1234,
            title: "When the build finally passes".to_string(),
            url: "https://example.tumblr.com/post/1234".to_string(),
            image: "https://example.com/a.gif".to_string(),
            likes: 42,
        }
    }

    #[test]
    fn test_internal_url() {
        let post = sample_post();
        assert_eq!(post.internal_url(), "/post/1234/when-the-build-finally-passes");
    }

    #[test]
    fn test_slug_truncated() {
        let slug = slugify("When the deploy script deletes production on Friday");
        assert_eq!(slug.len(), 30);
        assert_eq!(slug, "when-the-deploy-script-deletes");
    }

    #[test]
    fn test_slug_strips_punctuation() {
        assert_eq!(slugify("  asdf% qwer!! "), "asdf-qwer");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn test_slug_transliterates_non_ascii() {
        assert_eq!(slugify("Café déjà vu"), "cafe-deja-vu");
        let slug = slugify("日本語");
        assert!(!slug.is_empty());
        assert!(slug.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-'));
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_string(&sample_post().to_json()).unwrap();
        assert_eq!(
            json,
            "{\"id\":1234,\"title\":\"When the build finally passes\",\
             \"url\":\"https://example.tumblr.com/post/1234\",\
             \"image\":\"https://example.com/a.gif\",\"likes\":42,\
             \"internalURL\":\"/post/1234/when-the-build-finally-passes\"}"
        );
    }

    #[test]
    fn test_record_defaults() {
        let post: Post = serde_json::from_str("{\"id\":7}").unwrap();
        assert_eq!(post.id, 7);
        assert!(post.title.is_empty());
        assert_eq!(post.likes, 0);
    }
}
