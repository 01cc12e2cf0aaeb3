
use axum::http::StatusCode;
use serde::Serialize;

use super::domain::{Field, InferenceKind, RequestId, SessionId};

/// Why a present field was not accepted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum IssueReason {
    NotNumeric,
    BelowMinimum { min: f64 },
    UnknownOption { allowed: Vec<String> },
    NotInState { state: String },
    UnresolvedState,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldIssue {
    pub field: Field,
    pub value: String,
    #[serde(flatten)]
    pub reason: IssueReason,
}

impl FieldIssue {
    pub fn describe(&self) -> String {
        match &self.reason {
            IssueReason::NotNumeric => format!("{} '{}' is not a number", self.field, self.value),
            IssueReason::BelowMinimum { min } => {
                format!("{} {} is below the minimum of {}", self.field, self.value, min)
            }
            IssueReason::UnknownOption { allowed } => format!(
                "{} '{}' is not one of: {}",
                self.field,
                self.value,
                allowed.join(", ")
            ),
            IssueReason::NotInState { state } => {
                format!("{} '{}' is not in {}", self.field, self.value, state)
            }
            IssueReason::UnresolvedState => format!(
                "{} '{}' cannot be checked without a valid state",
                self.field, self.value
            ),
        }
    }
}

/// User-correctable rejection listing every offending field in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error("{}", summarize(.missing_fields, .out_of_range_fields))]
pub struct ValidationError {
    pub kind: InferenceKind,
    pub missing_fields: Vec<Field>,
    pub out_of_range_fields: Vec<FieldIssue>,
}

impl ValidationError {
    pub fn missing_field_names(&self) -> Vec<&'static str> {
        self.missing_fields.iter().map(|field| field.as_str()).collect()
    }

    pub fn invalid_field_names(&self) -> Vec<&'static str> {
        self.out_of_range_fields
            .iter()
            .map(|issue| issue.field.as_str())
            .collect()
    }

    pub fn summary(&self) -> String {
        summarize(&self.missing_fields, &self.out_of_range_fields)
    }
}

fn summarize(missing: &[Field], invalid: &[FieldIssue]) -> String {
    let mut parts = Vec::new();
    if !missing.is_empty() {
        let names = missing.iter().map(|field| field.as_str()).collect::<Vec<_>>();
        parts.push(format!("Please fill in all fields: {}", names.join(", ")));
    }
    if !invalid.is_empty() {
        let details = invalid.iter().map(FieldIssue::describe).collect::<Vec<_>>();
        parts.push(format!("Invalid values: {}", details.join("; ")));
    }
    parts.join(". ")
}

/// Strategy failure; rare once validation has passed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("inference failed: {reason}")]
pub struct InferenceError {
    pub reason: String,
}

impl InferenceError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn missing_feature(field: Field) -> Self {
        Self::new(format!("feature vector has no '{field}' value"))
    }
}

/// A submit arrived while another request of the session was still running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("request {in_flight} is still in progress; try again shortly")]
pub struct BusyError {
    pub in_flight: RequestId,
    pub in_flight_kind: InferenceKind,
}

/// Terminal failure recorded in a session's request state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ErrorKind {
    Validation(ValidationError),
    Inference(InferenceError),
}

impl ErrorKind {
    /// Text for the status collaborator. Inference failures stay generic.
    pub fn status_message(&self) -> String {
        match self {
            ErrorKind::Validation(err) => err.summary(),
            ErrorKind::Inference(_) => "Prediction failed. Please try again.".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AdvisoryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Inference(#[from] InferenceError),
    #[error(transparent)]
    Busy(#[from] BusyError),
    #[error("request {request} was superseded by a newer submit")]
    Superseded { request: RequestId },
    #[error("session {0} not found")]
    SessionNotFound(SessionId),
}

impl AdvisoryError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AdvisoryError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AdvisoryError::Busy(_) | AdvisoryError::Superseded { .. } => StatusCode::CONFLICT,
            AdvisoryError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            AdvisoryError::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ErrorKind> for AdvisoryError {
    fn from(value: ErrorKind) -> Self {
        match value {
            ErrorKind::Validation(err) => AdvisoryError::Validation(err),
            ErrorKind::Inference(err) => AdvisoryError::Inference(err),
        }
    }
}
