//! Request handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::Html;
use serde::Deserialize;

use crate::error::Result;
use crate::models::PostJson;
use crate::query::{self, PostData, SearchResults, SortOrder, Stats};
use crate::server::AppState;
use crate::server::render;

#[derive(Debug, Deserialize)]
pub struct DataParams {
    #[serde(default)]
    sort: SortOrder,
}

/// First value of `key` in raw query pairs.
///
/// Search reads its parameters from raw pairs so that repeated or
/// malformed values never reject the request.
fn first_param<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(name, _)| name == key)
        .map(|(_, value)| value.as_str())
}

pub async fn data(
    State(state): State<AppState>,
    params: Option<Query<DataParams>>,
) -> Json<Vec<PostJson>> {
    let order = params.map(|Query(p)| p.sort).unwrap_or_default();
    Json(query::all_posts(&state.board.posts(), order))
}

pub async fn search(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Json<SearchResults> {
    let term = first_param(&pairs, "query").unwrap_or_default();
    let offset = query::parse_offset(first_param(&pairs, "offset"));
    log::debug!("search query={:?} offset={}", term, offset);
    Json(query::search(
        &state.board.posts(),
        term,
        offset,
        state.query.page_size,
    ))
}

pub async fn post(State(state): State<AppState>, Path(id): Path<String>) -> Result<Html<String>> {
    let post = query::get_post(&state.board.posts(), &id)?;
    Ok(Html(render::post_page(&post).into_string()))
}

pub async fn post_with_slug(
    state: State<AppState>,
    Path((id, _slug)): Path<(String, String)>,
) -> Result<Html<String>> {
    post(state, Path(id)).await
}

pub async fn post_data(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PostData>> {
    Ok(Json(query::get_post_data(&state.board.posts(), &id)?))
}

pub async fn stats(State(state): State<AppState>) -> Json<Stats> {
    Json(query::stats(&state.board.posts(), state.extractor.as_ref()))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::board::Board;
    use crate::models::{Post, QueryConfig};
    use crate::query::TitleKeywords;
    use crate::server::{AppState, router};

    fn state_with(posts: Vec<Post>) -> AppState {
        AppState::new(
            Arc::new(Board::with_posts(posts)),
            Arc::new(TitleKeywords::new()),
            QueryConfig::default(),
        )
    }

    async fn get(state: AppState, uri: &str) -> (StatusCode, String) {
        let response = router(state)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn post(id: i64, title: &str) -> Post {
        Post {
            id,
            title: title.to_string(),
            ..Post::default()
        }
    }

    #[tokio::test]
    async fn test_search_empty_board() {
        let (status, body) = get(state_with(vec![]), "/search?query=searchTerm").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "{\"data\":[],\"offset\":0,\"totalResults\":0}");
    }

    #[tokio::test]
    async fn test_search_offset() {
        let (status, body) = get(state_with(vec![]), "/search?offset=1&query=searchTerm").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "{\"data\":[],\"offset\":1,\"totalResults\":0}");
    }

    #[tokio::test]
    async fn test_search_malformed_offset() {
        let (status, body) = get(state_with(vec![]), "/search?offset=asdf&query=searchTerm").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "{\"data\":[],\"offset\":0,\"totalResults\":0}");
    }

    #[tokio::test]
    async fn test_search_repeated_offset_uses_first() {
        let state = state_with(vec![post(1, "a one"), post(2, "a two")]);
        let (status, body) = get(state.clone(), "/search?query=a&offset=1&offset=x").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["offset"], 1);
        assert_eq!(json["totalResults"], 2);

        let (status, body) = get(state, "/search?offset=x&offset=1&query=two&query=one").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["offset"], 0);
        assert_eq!(json["data"][0]["id"], 2);
    }

    #[tokio::test]
    async fn test_search_without_params_lists_everything() {
        let (status, body) = get(state_with(vec![post(1, "a"), post(2, "b")]), "/search").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["totalResults"], 2);
        assert_eq!(json["data"][1]["id"], 2);
    }

    #[tokio::test]
    async fn test_post_malformed_id() {
        let (status, _) = get(state_with(vec![]), "/post/asdf").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_post_unknown_id() {
        let (status, _) = get(state_with(vec![]), "/post/1234").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_post_found() {
        let state = state_with(vec![]);
        state.board.add_post(post(1234, ""));
        let (status, body) = get(state.clone(), "/post/1234").await;
        assert_eq!(status, StatusCode::OK);
        assert!(!body.is_empty());

        state.board.reset();
        let (status, _) = get(state, "/post/1234").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_post_with_slug() {
        let state = state_with(vec![post(1234, "Friday deploy")]);
        let (status, body) = get(state, "/post/1234/friday-deploy").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Friday deploy"));
    }

    #[tokio::test]
    async fn test_post_data_found() {
        let state = state_with(vec![post(1234, "")]);
        let (status, body) = get(state, "/postdata/1234").await;
        assert_eq!(status, StatusCode::OK);
        assert!(!body.is_empty());
    }

    #[tokio::test]
    async fn test_post_data_percent_title() {
        let state = state_with(vec![post(1234, "asdf% qwer")]);
        let (_, body) = get(state, "/postdata/1234").await;
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["data"][0]["title"], "asdf% qwer");
    }

    #[tokio::test]
    async fn test_post_data_malformed_and_unknown() {
        let (status, _) = get(state_with(vec![]), "/postdata/asdf").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = get(state_with(vec![]), "/postdata/1234").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_stats_empty_board() {
        let (status, body) = get(state_with(vec![]), "/stats.json").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "{\"keywords\":[],\"postCount\":\"0\"}");
    }

    #[tokio::test]
    async fn test_data_json_includes_internal_url() {
        let state = state_with(vec![post(1, "first"), post(2, "second")]);
        let (status, body) = get(state, "/data.json").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json[0]["internalURL"], "/post/1/first");
        assert_eq!(json[1]["id"], 2);
    }

    #[tokio::test]
    async fn test_data_json_sorted_by_id() {
        let state = state_with(vec![post(1, "first"), post(2, "second")]);
        let (_, body) = get(state, "/data.json?sort=id").await;
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json[0]["id"], 2);
    }
}
