//! HTTP surface over the board.
//!
//! # Route Structure
//!
//! - `GET /data.json` - Every post (optional `?sort=id|likes`)
//! - `GET /search?query=&offset=` - Title search
//! - `GET /post/{id}` and `/post/{id}/{slug}` - Rendered post page
//! - `GET /postdata/{id}` - Single post as JSON
//! - `GET /stats.json` - Post count and keywords

mod render;
mod routes;

use std::sync::Arc;

use axum::Router;
use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::board::Board;
use crate::error::Result;
use crate::models::QueryConfig;
use crate::query::KeywordExtractor;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub board: Arc<Board>,
    pub extractor: Arc<dyn KeywordExtractor>,
    pub query: Arc<QueryConfig>,
}

impl AppState {
    pub fn new(
        board: Arc<Board>,
        extractor: Arc<dyn KeywordExtractor>,
        query: QueryConfig,
    ) -> Self {
        Self {
            board,
            extractor,
            query: Arc::new(query),
        }
    }
}

/// Build the router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/data.json", get(routes::data))
        .route("/search", get(routes::search))
        .route("/post/:id", get(routes::post))
        .route("/post/:id/:slug", get(routes::post_with_slug))
        .route("/postdata/:id", get(routes::post_data))
        .route("/stats.json", get(routes::stats))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

async fn log_request(request: Request, next: Next) -> Response {
    log::debug!("{} {}", request.method(), request.uri().path());
    next.run(request).await
}

/// Serve until `shutdown` is cancelled.
pub async fn serve(state: AppState, bind_addr: &str, shutdown: CancellationToken) -> Result<()> {
    let listener = TcpListener::bind(bind_addr).await?;
    log::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    log::info!("Server stopped");
    Ok(())
}
