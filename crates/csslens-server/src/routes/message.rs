//! Message channel: `{ action, ... }` in, `{ ok, data?, error? }` out.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};

use crate::state::AppState;
use csslens_relay::Reply;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/message", post(post_message))
}

/// POST /api/message: always 200; the outcome is in `ok`.
async fn post_message(
    State(state): State<Arc<AppState>>,
    Json(body): Json<serde_json::Value>,
) -> Json<Reply> {
    Json(state.relay.handle_value(body).await)
}
