use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use vivacripto_shared::{
    categories::{Category, CATEGORIES},
    client::DEFAULT_SEARCH_LIMIT,
    Article, ListQuery, PagedList,
};

use crate::{pages::LISTING_PAGE_SIZE, state::AppState};

/// Largest page the load-more endpoint will ask the content API for.
const MAX_API_PAGE_SIZE: u32 = 100;
/// Routes whose rendered pages a revalidation drops.
const REVALIDATED_PATHS: &[&str] = &["/", "/posts"];

#[derive(Debug, Deserialize)]
pub struct PostsQuery {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<Article>,
    pub total: usize,
    pub query: String,
    pub fallback: bool,
}

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub categories: &'static [Category],
}

/// GET /api/posts: one page for the "load more" button.
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<PostsQuery>,
) -> Json<PagedList> {
    let page_size = query
        .page_size
        .filter(|size| *size > 0)
        .unwrap_or(LISTING_PAGE_SIZE)
        .min(MAX_API_PAGE_SIZE);
    let page = query.page.unwrap_or(1);
    Json(state.listing(ListQuery::published(page, page_size)).await)
}

/// GET /api/search?q&limit
pub async fn search_posts(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Json<SearchResponse> {
    let limit = query
        .limit
        .filter(|limit| *limit > 0)
        .unwrap_or(DEFAULT_SEARCH_LIMIT)
        .min(MAX_API_PAGE_SIZE);
    let outcome = state.client.search(&query.q, limit).await;

    Json(SearchResponse {
        total: outcome.results.len(),
        results: outcome.results,
        query: query.q,
        fallback: outcome.fallback,
    })
}

/// GET /api/categories
pub async fn list_categories() -> Json<CategoriesResponse> {
    Json(CategoriesResponse {
        categories: CATEGORIES,
    })
}

/// POST /api/revalidate with `{"secret": "..."}`.
///
/// 500 when no secret is configured or the body is not JSON, 400 when the
/// secret is missing or not a string, 401 when it does not match.
pub async fn revalidate(State(state): State<AppState>, body: Bytes) -> Response {
    let Some(expected) = state.config.revalidate_secret.as_deref() else {
        tracing::error!("revalidation requested but REVALIDATE_SECRET is not configured");
        return message(StatusCode::INTERNAL_SERVER_ERROR, "Server configuration error");
    };

    let payload: Value = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(err) => {
            tracing::warn!("revalidation body is not valid JSON: {}", err);
            return message(StatusCode::INTERNAL_SERVER_ERROR, "Error revalidating");
        },
    };

    let Some(secret) = payload
        .get("secret")
        .and_then(Value::as_str)
        .filter(|secret| !secret.is_empty())
    else {
        return message(StatusCode::BAD_REQUEST, "Secret is required");
    };

    if !constant_time_eq(secret.as_bytes(), expected.as_bytes()) {
        tracing::warn!("revalidation rejected: invalid secret");
        return message(StatusCode::UNAUTHORIZED, "Invalid secret");
    }

    state.revalidate_paths(REVALIDATED_PATHS);
    (
        StatusCode::OK,
        Json(json!({
            "revalidated": true,
            "now": Utc::now().timestamp_millis(),
        })),
    )
        .into_response()
}

fn message(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

/// Compares without short-circuiting on the first differing byte. Length is
/// not secret.
fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    left.iter()
        .zip(right)
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}
