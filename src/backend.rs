//! Backend capability trait and its failure categories.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Failures reported by a [`ModelBackend`].
///
/// The variants are the categories the error normalizer distinguishes; each
/// carries the detail text that is echoed back to the caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("{0}")]
    PredictionFailure(String),

    #[error("{0}")]
    PredictionTimeout(String),

    /// The remote service answered with an error.
    #[error("{message}")]
    Api {
        status: Option<u16>,
        message: String,
    },

    /// Anything else: connection failures, undecodable payloads.
    #[error("{0}")]
    Unexpected(String),
}

impl BackendError {
    pub fn api(message: impl Into<String>) -> Self {
        BackendError::Api {
            status: None,
            message: message.into(),
        }
    }

    /// Text forwarded to the caller after the category prefix.
    pub fn detail(&self) -> &str {
        match self {
            BackendError::PredictionFailure(detail)
            | BackendError::PredictionTimeout(detail)
            | BackendError::Unexpected(detail) => detail,
            BackendError::Api { message, .. } => message,
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        BackendError::Unexpected(err.to_string())
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        BackendError::Unexpected(format!("invalid response payload: {err}"))
    }
}

/// Authenticated access to the remote modelling service.
///
/// Implementations are shared across concurrent tool calls.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Run a prediction and wait for its result.
    async fn predict(&self, model_id: i64, dataset: Vec<Value>) -> Result<Value, BackendError>;

    /// Search models by free text, paginated.
    async fn search_models(&self, query: &str, page: i64, size: i64)
        -> Result<Value, BackendError>;

    /// Full model description.
    async fn get_model_by_id(&self, model_id: i64) -> Result<Value, BackendError>;

    /// Condensed model description: name, type and features.
    async fn get_model_summary(&self, model_id: i64) -> Result<Value, BackendError>;
}
