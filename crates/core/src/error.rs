use crate::outcome::{IssueType, OperationOutcome};
use thiserror::Error;

/// Conversion error types
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unexpected document shape: {0}")]
    UnexpectedShape(String),

    #[error("ValidationError: malformed record at index {index}: {reason}")]
    MalformedRecord { index: usize, reason: String },
}

impl ConvertError {
    pub fn malformed(index: usize, reason: impl ToString) -> Self {
        ConvertError::MalformedRecord {
            index,
            reason: reason.to_string(),
        }
    }
}

impl From<&ConvertError> for OperationOutcome {
    fn from(err: &ConvertError) -> Self {
        let issue_type = match err {
            ConvertError::Json(_) => IssueType::Structure,
            ConvertError::UnexpectedShape(_) => IssueType::Structure,
            ConvertError::MalformedRecord { .. } => IssueType::Invalid,
        };
        OperationOutcome::error(issue_type, &err.to_string())
    }
}
