pub mod backend;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;

use axum::{Router, routing::{get, post}};
use tower_http::cors::{CorsLayer, Any};

use crate::routes::{generate, health, root, AppState};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/health", get(health))
        .route("/api/generate", post(generate))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
