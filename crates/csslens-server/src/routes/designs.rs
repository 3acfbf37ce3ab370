//! Saved results: design tokens and structure analyses by page URL.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use csslens_core::Result;
use csslens_store::Storage;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/designs", get(get_designs))
        .route("/structures", get(get_structures))
}

#[derive(Debug, Deserialize)]
struct UrlQuery {
    url: Option<String>,
}

/// GET /api/designs[?url=]: the whole map, or one saved record (404 if none).
async fn get_designs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UrlQuery>,
) -> impl IntoResponse {
    match query.url {
        Some(url) => one(state.store.design(&url), &url),
        None => all(state.store.designs()),
    }
}

/// GET /api/structures[?url=]
async fn get_structures(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UrlQuery>,
) -> impl IntoResponse {
    match query.url {
        Some(url) => one(state.store.structure(&url), &url),
        None => all(state.store.structures()),
    }
}

fn one<T: Serialize>(result: Result<Option<T>>, url: &str) -> (StatusCode, Json<serde_json::Value>) {
    match result {
        Ok(Some(record)) => (StatusCode::OK, Json(serde_json::json!(record))),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": format!("Nothing saved for {}", url) })),
        ),
        Err(e) => internal(e),
    }
}

fn all<T: Serialize>(result: Result<T>) -> (StatusCode, Json<serde_json::Value>) {
    match result {
        Ok(map) => (StatusCode::OK, Json(serde_json::json!(map))),
        Err(e) => internal(e),
    }
}

fn internal(e: csslens_core::Error) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": e.to_string() })),
    )
}
