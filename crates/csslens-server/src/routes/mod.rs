//! HTTP route handlers.

pub mod designs;
pub mod health;
pub mod message;
pub mod settings;
pub mod tabs;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;

use crate::state::AppState;

/// Build the main Axum router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(health::routes())
        .merge(message::routes())
        .merge(tabs::routes())
        .merge(settings::routes())
        .merge(designs::routes())
}
