//! HTTP API for the memory store
//!
//! - `POST /save` - store a message for a session
//! - `GET /context/:session_id?query=..&top_k=..` - semantically closest messages
//! - `GET /load/:session_id` - full session log
//! - `GET /health` - liveness and store counts

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::error::Error;
use crate::memory::SessionMemoryStore;

type SharedStore = Arc<SessionMemoryStore>;

/// Build the router over a shared store
pub fn create_router(store: SharedStore) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/save", post(save))
        .route("/context/:session_id", get(context))
        .route("/load/:session_id", get(load))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .with_state(store)
}

// === Handlers ===

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub sessions: usize,
    pub entries: usize,
    pub dimensions: usize,
}

async fn health(State(store): State<SharedStore>) -> Json<HealthResponse> {
    let stats = store.stats().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        sessions: stats.sessions,
        entries: stats.entries,
        dimensions: stats.dimensions,
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SaveRequest {
    pub session_id: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SaveResponse {
    pub status: String,
    pub sequence_index: usize,
}

async fn save(
    State(store): State<SharedStore>,
    Json(req): Json<SaveRequest>,
) -> Result<Json<SaveResponse>, ApiError> {
    let sequence_index = store.add_message(&req.session_id, &req.message).await?;
    Ok(Json(SaveResponse {
        status: "saved".to_string(),
        sequence_index,
    }))
}

#[derive(Debug, Deserialize)]
struct ContextQuery {
    query: String,
    top_k: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ContextResponse {
    pub context: Vec<String>,
}

async fn context(
    State(store): State<SharedStore>,
    Path(session_id): Path<String>,
    Query(params): Query<ContextQuery>,
) -> Result<Json<ContextResponse>, ApiError> {
    let top_k = params.top_k.unwrap_or_else(|| store.default_top_k());
    let context = store
        .semantic_context(&session_id, &params.query, top_k)
        .await?;
    Ok(Json(ContextResponse { context }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoadResponse {
    pub messages: Vec<String>,
}

async fn load(
    State(store): State<SharedStore>,
    Path(session_id): Path<String>,
) -> Json<LoadResponse> {
    Json(LoadResponse {
        messages: store.get_messages(&session_id).await,
    })
}

// === Errors ===

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// Store error rendered as a JSON response
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match &self.0 {
            // Callers only send text; a bad vector length comes from the embedder
            Error::DimensionMismatch { .. } => (StatusCode::BAD_GATEWAY, "embedding_dimension_mismatch"),
            Error::EmbeddingService(_) => (StatusCode::BAD_GATEWAY, "embedding_service"),
            Error::Http(_) | Error::Remote { .. } => (StatusCode::BAD_GATEWAY, "upstream"),
            Error::IndexOutOfRange { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "index_out_of_range"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        warn!(status = %status, error = %self.0, "Request failed");
        let body = ErrorResponse {
            error: self.0.to_string(),
            code: code.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (Error::dimension_mismatch(3, 2), StatusCode::BAD_GATEWAY),
            (Error::embedding("timeout"), StatusCode::BAD_GATEWAY),
            (
                Error::IndexOutOfRange { index: 9, len: 1 },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (Error::config("bad"), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            let (status, _) = ApiError::from(err).status_and_code();
            assert_eq!(status, expected);
        }
    }

    #[test]
    fn test_error_response_status() {
        let response = ApiError::from(Error::embedding("quota")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
