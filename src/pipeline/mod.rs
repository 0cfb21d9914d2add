//! Ingestion pipeline.
//!
//! - `sync`: replay stored posts, then page the remote source for new ones
//! - `broadcast`: hand every emitted post to the live and persist sinks

pub mod broadcast;
pub mod sync;

pub use broadcast::{BoardSink, Broadcaster, PostSink, StoreSink};
pub use sync::{SyncPipeline, SyncReport, stored_posts};
