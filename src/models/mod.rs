// src/models/mod.rs

//! Domain models for the application.

mod config;
mod post;

// Re-export all public types
pub use config::{
    Config, LoggingConfig, QueryConfig, ServerConfig, SourceConfig, StorageConfig, SyncConfig,
};
pub use post::{Post, PostJson, slugify};
