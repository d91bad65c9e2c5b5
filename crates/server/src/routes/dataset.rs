//! Dataset download endpoints

use axum::{
    Json,
    extract::State,
    http::header,
    response::IntoResponse,
};
use serde_json::{Value as JsonValue, json};

use crate::AppState;
use crate::error::AppError;

/// GET / - Liveness sentinel
pub async fn root() -> Json<JsonValue> {
    Json(json!({"Hello": "World"}))
}

/// GET /get-file - Serve the last conversion, falling back to the default dataset
pub async fn get_file(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let content = match state.store.load().await? {
        Some(content) => content,
        None => {
            let path = state.dataset_path.as_path();
            tokio::fs::read(path).await.map_err(|e| {
                AppError::NotFound(format!("Dataset {} unavailable: {}", path.display(), e))
            })?
        }
    };

    Ok(([(header::CONTENT_TYPE, "application/json")], content))
}
