//! Tool outcomes and backend failure normalization.
//!
//! Handlers produce a [`ToolOutcome`]; it is flattened to text only when the
//! result leaves the dispatcher. Each failure kind owns a fixed leading phrase
//! so callers can tell categories apart by prefix alone.

use std::fmt;

use tracing::error;

use crate::backend::BackendError;
use crate::tools::ToolError;

/// Backend operation a handler performs. Selects the API error phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Predict,
    SearchModels,
    GetModelInfo,
    GetModelSummary,
}

impl Operation {
    /// Phrase that leads an API error raised by this operation.
    pub fn api_error_phrase(self) -> &'static str {
        match self {
            Operation::Predict => "API error",
            Operation::SearchModels => "Search failed",
            Operation::GetModelInfo => "Failed to get model info",
            Operation::GetModelSummary => "Failed to get model summary",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// A required argument was absent or falsy.
    MissingArgument,
    /// An argument had the wrong JSON type.
    InvalidArgument,
    UnknownTool,
    PredictionFailure,
    PredictionTimeout,
    Api(Operation),
    Unexpected,
}

impl FailureKind {
    pub fn prefix(self) -> &'static str {
        match self {
            FailureKind::MissingArgument
            | FailureKind::InvalidArgument
            | FailureKind::UnknownTool => "Error",
            FailureKind::PredictionFailure => "Prediction failed",
            FailureKind::PredictionTimeout => "Prediction timed out",
            FailureKind::Api(operation) => operation.api_error_phrase(),
            FailureKind::Unexpected => "Unexpected error",
        }
    }
}

/// Result of one tool call before it is flattened to text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutcome {
    Success(String),
    Failure { kind: FailureKind, detail: String },
}

impl ToolOutcome {
    pub fn failure(kind: FailureKind, detail: impl Into<String>) -> Self {
        ToolOutcome::Failure {
            kind,
            detail: detail.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ToolOutcome::Success(_))
    }

    /// The single string returned to the caller.
    pub fn into_text(self) -> String {
        match self {
            ToolOutcome::Success(text) => text,
            failure => failure.to_string(),
        }
    }
}

impl fmt::Display for ToolOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolOutcome::Success(text) => f.write_str(text),
            ToolOutcome::Failure { kind, detail } => write!(f, "{}: {}", kind.prefix(), detail),
        }
    }
}

impl From<ToolError> for ToolOutcome {
    fn from(err: ToolError) -> Self {
        let kind = match &err {
            ToolError::ToolNotFound(_) => FailureKind::UnknownTool,
            ToolError::InvalidArgument { .. } => FailureKind::InvalidArgument,
        };
        ToolOutcome::failure(kind, err.to_string())
    }
}

/// Map a backend failure onto its outcome category.
///
/// Uncategorized failures are logged with the tool name before being handed
/// back, since the caller only sees the message text.
pub fn normalize(tool: &str, operation: Operation, err: BackendError) -> ToolOutcome {
    let kind = match &err {
        BackendError::PredictionFailure(_) => FailureKind::PredictionFailure,
        BackendError::PredictionTimeout(_) => FailureKind::PredictionTimeout,
        BackendError::Api { .. } => FailureKind::Api(operation),
        BackendError::Unexpected(detail) => {
            error!("Unexpected error in {}: {}", tool, detail);
            FailureKind::Unexpected
        }
    };

    match err {
        BackendError::PredictionFailure(detail)
        | BackendError::PredictionTimeout(detail)
        | BackendError::Unexpected(detail) => ToolOutcome::failure(kind, detail),
        BackendError::Api { message, .. } => ToolOutcome::failure(kind, message),
    }
}
