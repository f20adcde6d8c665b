use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::manager::{Manager, ServiceSnapshot, Snapshot};

/// Application state shared across handlers
pub struct AppState {
    pub manager: Arc<Manager>,
}

// ============================================================================
// Health Check
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ============================================================================
// Snapshot
// ============================================================================

pub async fn snapshot(State(state): State<Arc<AppState>>) -> Json<Snapshot> {
    Json(state.manager.snapshot())
}

pub async fn category(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<Vec<ServiceSnapshot>>, ApiError> {
    let services = state
        .manager
        .category(&name)
        .ok_or_else(|| ApiError::NotFound(format!("Category '{}' not found", name)))?;

    Ok(Json(services.iter().map(|s| s.snapshot()).collect()))
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}
