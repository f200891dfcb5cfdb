use axum::{Json, extract::State, http::header, response::{IntoResponse, Response}};
use bytes::Bytes;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use crate::{backend::{BackendClient, Generated}, error::ProxyError};

#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<BackendClient>,
}

/// `POST /api/generate`: relay the client's JSON to the backend and answer
/// with the result or an error envelope, never both.
pub async fn generate(State(state): State<AppState>, body: Bytes) -> Response {
    let request_id = Uuid::new_v4();
    tracing::info!(%request_id, "🍳 Generate request ({} bytes)", body.len());

    match relay(&state, body).await {
        Ok(Generated { result, body }) => {
            tracing::info!(%request_id, "✅ Generated '{}' with {} steps", result.recipe_name, result.instructions.len());
            // validated above, sent on exactly as the backend wrote it
            ([(header::CONTENT_TYPE, "application/json")], body).into_response()
        }
        Err(e) => {
            tracing::error!(%request_id, category = e.category(), "❌ Generate failed: {}", e);
            e.into_response()
        }
    }
}

async fn relay(state: &AppState, body: Bytes) -> Result<Generated, ProxyError> {
    // any JSON is accepted; the backend owns the request schema
    serde_json::from_slice::<Value>(&body)
        .map_err(|e| ProxyError::Transport(format!("unparseable request payload: {}", e)))?;
    state.backend.forward(body).await
}

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "status": "ok", "backend": state.backend.endpoint() }))
}

pub async fn root() -> Json<Value> {
    Json(json!({ "status": "ok", "service": "Roast My Fridge" }))
}
