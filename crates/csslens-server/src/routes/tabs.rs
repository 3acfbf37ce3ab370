//! Tab routes: open pages, list and close tabs.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use tracing::warn;

use crate::state::AppState;
use csslens_browser::{OpenTabRequest, TabInfo};

// ---------------------------------------------------------------
// Route builder
// ---------------------------------------------------------------

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tabs", get(list_tabs).post(open_tab))
        .route("/tabs/{id}", get(get_tab).delete(close_tab))
}

// ---------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------

/// POST /api/tabs: load a page into a new tab.
async fn open_tab(
    State(state): State<Arc<AppState>>,
    Json(body): Json<OpenTabRequest>,
) -> impl IntoResponse {
    let url = body.url.trim();
    if url.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "Missing url" })),
        );
    }

    match state.tabs.open(url).await {
        Ok(info) => (StatusCode::OK, Json(serde_json::json!(info))),
        Err(e) => {
            warn!("Failed to open tab for {}: {}", url, e);
            (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
        }
    }
}

/// GET /api/tabs
async fn list_tabs(State(state): State<Arc<AppState>>) -> Json<Vec<TabInfo>> {
    Json(state.tabs.list())
}

/// GET /api/tabs/{id}
async fn get_tab(State(state): State<Arc<AppState>>, Path(id): Path<u64>) -> impl IntoResponse {
    match state.tabs.get(id) {
        Some(info) => (StatusCode::OK, Json(serde_json::json!(info))),
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": format!("Tab {} not found", id) })),
        ),
    }
}

/// DELETE /api/tabs/{id}
async fn close_tab(State(state): State<Arc<AppState>>, Path(id): Path<u64>) -> impl IntoResponse {
    if state.tabs.close(id) {
        (StatusCode::OK, Json(serde_json::json!({ "success": true })))
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": format!("Tab {} not found", id) })),
        )
    }
}
