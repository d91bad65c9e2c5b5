//! Health check endpoint

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

use crate::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

/// GET /health - Report whether the default dataset is readable
pub async fn check(State(state): State<AppState>) -> impl IntoResponse {
    match tokio::fs::metadata(state.dataset_path.as_path()).await {
        Ok(meta) if meta.is_file() => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy".to_string(),
                reason: None,
            }),
        ),
        Ok(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "unhealthy".to_string(),
                reason: Some(format!("{} is not a file", state.dataset_path.display())),
            }),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Health check could not stat dataset");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unhealthy".to_string(),
                    reason: Some(format!("Dataset unavailable: {}", e)),
                }),
            )
        }
    }
}
