//! Application error handling

use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use covid_fhir_core::{ConvertError, IssueType, OperationOutcome};

use crate::storage::StorageError;

/// Application error type
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Convert(ConvertError),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, outcome) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, OperationOutcome::not_found(&msg)),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, OperationOutcome::invalid(&msg)),
            AppError::Convert(err) => {
                tracing::warn!(error = %err, "Conversion rejected");
                (StatusCode::BAD_REQUEST, OperationOutcome::from(&err))
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    OperationOutcome::error(IssueType::Exception, &msg),
                )
            }
        };

        (status, Json(outcome)).into_response()
    }
}

impl From<ConvertError> for AppError {
    fn from(err: ConvertError) -> Self {
        AppError::Convert(err)
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::Internal(format!("Storage error: {}", err))
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::BadRequest(format!("Invalid upload: {}", err.body_text()))
    }
}
