//! Settings routes: API key and model.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::state::AppState;
use csslens_store::Storage;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/settings", get(get_settings))
        .route("/settings/api-key", put(set_api_key).delete(clear_api_key))
}

#[derive(Debug, Deserialize)]
struct ApiKeyBody {
    #[serde(rename = "apiKey")]
    api_key: Option<String>,
}

#[derive(Serialize)]
struct SettingsResponse {
    #[serde(rename = "apiKeyConfigured")]
    api_key_configured: bool,
    model: String,
}

/// GET /api/settings: never echoes the key itself.
async fn get_settings(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.store.api_key() {
        Ok(key) => (
            StatusCode::OK,
            Json(serde_json::json!(SettingsResponse {
                api_key_configured: key.is_some(),
                model: state.claude_config.model.clone(),
            })),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": e.to_string() })),
        ),
    }
}

/// PUT /api/settings/api-key
async fn set_api_key(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ApiKeyBody>,
) -> impl IntoResponse {
    match state.relay.set_api_key(body.api_key.as_deref()) {
        Ok(()) => {
            info!("API key updated");
            (StatusCode::OK, Json(serde_json::json!({ "success": true })))
        }
        Err(e @ csslens_core::Error::MissingInput(_)) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": e.to_string() })),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": e.to_string() })),
        ),
    }
}

/// DELETE /api/settings/api-key
async fn clear_api_key(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.store.clear_api_key() {
        Ok(removed) => (
            StatusCode::OK,
            Json(serde_json::json!({ "success": true, "removed": removed })),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": e.to_string() })),
        ),
    }
}
