// src/services/tumblr.rs

//! Tumblr API client.
//!
//! Fetches text posts page by page and converts raw entries into posts.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{Post, SourceConfig};
use crate::services::RemoteSource;
use crate::utils::resolve_url;

/// Post type requested from the API.
const POST_TYPE: &str = "text";

/// Client for the Tumblr v2 posts endpoint.
pub struct TumblrClient {
    client: Client,
    api_url: Url,
    api_key: String,
}

impl TumblrClient {
    /// Create a new client with the given source configuration.
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_url: Url::parse(&config.api_url)?,
            api_key: config.api_key.clone(),
        })
    }

    /// Posts endpoint for a blog.
    fn posts_url(&self, blog: &str) -> Result<Url> {
        Ok(self
            .api_url
            .join(&format!("/v2/blog/{blog}/posts/{POST_TYPE}"))?)
    }
}

/// Envelope returned by the posts endpoint.
#[derive(Debug, Deserialize)]
struct PostsEnvelope {
    response: PostsResponse,
}

#[derive(Debug, Deserialize)]
struct PostsResponse {
    #[serde(default)]
    posts: Vec<Value>,
}

#[async_trait]
impl RemoteSource for TumblrClient {
    async fn fetch_page(&self, blog: &str, offset: usize, limit: usize) -> Result<Vec<Value>> {
        let url = self.posts_url(blog)?;
        log::debug!("Downloading {} offset={} limit={}", blog, offset, limit);

        let offset = offset.to_string();
        let limit = limit.to_string();
        let response = self
            .client
            .get(url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("offset", offset.as_str()),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::remote(blog, format!("status {status}")));
        }

        let envelope: PostsEnvelope = response.json().await?;
        Ok(envelope.response.posts)
    }
}

/// The fields of a raw text post that make up a [`Post`].
#[derive(Debug, Deserialize)]
struct RawPost {
    id: i64,
    #[serde(default)]
    title: Option<String>,
    post_url: String,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    note_count: Option<i64>,
}

/// Convert a raw API entry into a post.
///
/// The title is trimmed, the image is the first `img` in the body, and
/// a missing note count means no likes.
pub fn parse_post(raw: &Value) -> Result<Post> {
    let raw = RawPost::deserialize(raw).map_err(AppError::parse)?;
    let image = raw
        .body
        .as_deref()
        .map(|body| extract_image(body, &raw.post_url))
        .unwrap_or_default();

    Ok(Post {
        id: raw.id,
        title: raw.title.as_deref().unwrap_or("").trim().to_string(),
        url: raw.post_url,
        image,
        likes: raw.note_count.unwrap_or(0).max(0),
    })
}

/// `src` of the first `img` element in an HTML fragment.
///
/// Relative sources are resolved against `base`. Returns an empty string
/// when there is no image.
pub fn extract_image(body: &str, base: &str) -> String {
    let Ok(selector) = Selector::parse("img[src]") else {
        return String::new();
    };
    let fragment = Html::parse_fragment(body);
    let Some(src) = fragment
        .select(&selector)
        .next()
        .and_then(|img| img.value().attr("src"))
    else {
        return String::new();
    };

    match Url::parse(base) {
        Ok(base) => resolve_url(&base, src),
        Err(_) => src.to_string(),
    }
}
