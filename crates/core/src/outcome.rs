use serde::{Deserialize, Serialize};

/// Severity of the issue (every outcome this service returns is an error)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Error,
}

/// Type of issue (the codes this service reports)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum IssueType {
    Invalid,
    Structure,
    NotFound,
    Exception,
}

/// A single issue within an OperationOutcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationOutcomeIssue {
    pub severity: IssueSeverity,
    pub code: IssueType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<String>,
}

/// FHIR OperationOutcome, returned as the body of every error response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationOutcome {
    pub resource_type: String,
    pub issue: Vec<OperationOutcomeIssue>,
}

impl OperationOutcome {
    fn single(severity: IssueSeverity, code: IssueType, message: &str) -> Self {
        Self {
            resource_type: "OperationOutcome".to_string(),
            issue: vec![OperationOutcomeIssue {
                severity,
                code,
                diagnostics: Some(message.to_string()),
            }],
        }
    }

    /// Error outcome with an explicit issue type
    pub fn error(code: IssueType, message: &str) -> Self {
        Self::single(IssueSeverity::Error, code, message)
    }

    pub fn invalid(message: &str) -> Self {
        Self::error(IssueType::Invalid, message)
    }

    pub fn not_found(message: &str) -> Self {
        Self::error(IssueType::NotFound, message)
    }
}
