//! Application configuration structures.

use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Remote blog API settings
    #[serde(default)]
    pub source: SourceConfig,

    /// Local persistence settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Which blogs to sync and how
    #[serde(default)]
    pub sync: SyncConfig,

    /// Query layer tuning
    #[serde(default)]
    pub query: QueryConfig,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Apply `PORT` and `TUMBLR_API_KEY` environment overrides.
    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var("PORT").ok().as_deref(),
            std::env::var("TUMBLR_API_KEY").ok().as_deref(),
        );
    }

    fn apply_overrides(&mut self, port: Option<&str>, api_key: Option<&str>) {
        if let Some(port) = port.map(str::trim).filter(|p| !p.is_empty()) {
            let host = self
                .server
                .bind_addr
                .rsplit_once(':')
                .map_or("0.0.0.0", |(host, _)| host);
            self.server.bind_addr = format!("{host}:{port}");
        }
        if let Some(key) = api_key.filter(|k| !k.is_empty()) {
            self.source.api_key = key.to_string();
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        self.server
            .bind_addr
            .parse::<SocketAddr>()
            .map_err(|e| AppError::validation(format!("server.bind_addr is invalid: {e}")))?;
        if self.source.user_agent.trim().is_empty() {
            return Err(AppError::validation("source.user_agent is empty"));
        }
        if self.source.timeout_secs == 0 {
            return Err(AppError::validation("source.timeout_secs must be > 0"));
        }
        if self.source.page_size == 0 {
            return Err(AppError::validation("source.page_size must be > 0"));
        }
        url::Url::parse(&self.source.api_url)?;
        if self.sync.max_concurrent == 0 {
            return Err(AppError::validation("sync.max_concurrent must be > 0"));
        }
        if self.query.page_size == Some(0) {
            return Err(AppError::validation("query.page_size must be > 0 when set"));
        }
        if self.sync.blogs.iter().any(|b| b.trim().is_empty()) {
            return Err(AppError::validation("sync.blogs contains an empty name"));
        }
        Ok(())
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on
    #[serde(default = "defaults::bind_addr")]
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: defaults::bind_addr(),
        }
    }
}

/// Remote blog API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Base URL of the blog API
    #[serde(default = "defaults::api_url")]
    pub api_url: String,

    /// API key sent with every request
    #[serde(default)]
    pub api_key: String,

    /// Posts requested per page
    #[serde(default = "defaults::page_size")]
    pub page_size: usize,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            api_url: defaults::api_url(),
            api_key: String::new(),
            page_size: defaults::page_size(),
            timeout_secs: defaults::timeout(),
            user_agent: defaults::user_agent(),
        }
    }
}

/// Local persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one record file per blog
    #[serde(default = "defaults::data_dir")]
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: defaults::data_dir(),
        }
    }
}

/// Sync behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Blog identifiers to sync
    #[serde(default)]
    pub blogs: Vec<String>,

    /// Contact the remote source after replaying stored posts
    #[serde(default = "defaults::fetch_new")]
    pub fetch_new: bool,

    /// Maximum blogs synced at the same time
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            blogs: Vec::new(),
            fetch_new: defaults::fetch_new(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// Query layer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Search results per page; unset serves every match from the offset
    #[serde(default)]
    pub page_size: Option<usize>,

    /// Number of keywords reported by the stats endpoint
    #[serde(default = "defaults::keyword_limit")]
    pub keyword_limit: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            page_size: None,
            keyword_limit: defaults::keyword_limit(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    // Server defaults
    pub fn bind_addr() -> String {
        "0.0.0.0:8080".into()
    }

    // Source defaults
    pub fn api_url() -> String {
        "https://api.tumblr.com".into()
    }
    pub fn page_size() -> usize {
        20
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; blogboard/0.1)".into()
    }

    // Storage defaults
    pub fn data_dir() -> String {
        "data".into()
    }

    // Sync defaults
    pub fn fetch_new() -> bool {
        true
    }
    pub fn max_concurrent() -> usize {
        4
    }

    // Query defaults
    pub fn keyword_limit() -> usize {
        10
    }

    pub fn log_level() -> String {
        "info".into()
    }
}
