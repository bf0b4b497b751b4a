//! Error types for the Orion server.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response}
};
use errors::{ProviderError, ValidationError};
use serde::Serialize;
use thiserror::Error;
use workflows::{EvaluationError, JournalError, MemoryError, MilestoneError};

/// Errors returned by route handlers.
///
/// The `Display` text becomes the `error` field of the response body and is
/// shown to the user as is.
#[derive(Error, Debug)]
pub enum ApiError {
    /// No session, or the session token is invalid or expired.
    #[error("Unauthorized")]
    Unauthorized,

    /// Login attempted with the wrong username or password.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// A required field is missing or malformed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The request is well formed but cannot be applied.
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    /// An upstream collaborator failed.
    #[error("{message}")]
    Upstream {
        message: String,
        #[source]
        source: ProviderError
    },

    /// Model output could not be parsed; the raw text is returned to the
    /// caller.
    #[error("{message}")]
    Parse {
        message: String,
        raw_content: String
    },

    #[error("{0}")]
    Internal(String)
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Unauthorized | Self::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED")
            }
            Self::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Upstream { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "UPSTREAM_ERROR"),
            Self::Parse { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "PARSE_ERROR"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
        }
    }

    fn upstream(message: impl Into<String>, source: ProviderError) -> Self {
        Self::Upstream {
            message: message.into(),
            source
        }
    }
}

/// Error response body for HTTP endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_content: Option<String>
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        match &self {
            Self::Upstream { source, .. } => {
                tracing::error!(error = %source, service = %source.service(), "Upstream call failed");
            }
            Self::Parse { .. } => tracing::warn!("Model output could not be parsed"),
            Self::Internal(message) => tracing::error!(message = %message, "Internal error"),
            _ => {}
        }

        let error = self.to_string();
        let raw_content = match self {
            Self::Parse { raw_content, .. } => Some(raw_content),
            _ => None
        };

        let body = ErrorResponse {
            success: false,
            error,
            code: code.to_string(),
            raw_content
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(status = %rejection.status(), "Rejected request body");
        Self::BadRequest(rejection.body_text())
    }
}

impl From<ProviderError> for ApiError {
    fn from(source: ProviderError) -> Self {
        Self::upstream(source.to_string(), source)
    }
}

impl From<JournalError> for ApiError {
    fn from(err: JournalError) -> Self {
        let message = err.to_string();
        match err {
            JournalError::InvalidInput => Self::BadRequest(message),
            JournalError::DurableStoreWriteFailed { source }
            | JournalError::EmbeddingFailed { source }
            | JournalError::VectorStoreWriteFailed { source } => Self::upstream(message, source)
        }
    }
}

impl From<EvaluationError> for ApiError {
    fn from(err: EvaluationError) -> Self {
        let message = err.to_string();
        match err {
            EvaluationError::OpportunityNotFound { .. } => Self::NotFound(message),
            EvaluationError::OpportunityFetch { source }
            | EvaluationError::Generation { source } => Self::upstream(message, source),
            EvaluationError::Parse { raw_content } => Self::Parse {
                message,
                raw_content
            }
        }
    }
}

impl From<MilestoneError> for ApiError {
    fn from(err: MilestoneError) -> Self {
        let message = err.to_string();
        match err {
            MilestoneError::NotFound { .. } | MilestoneError::AtBoundary { .. } => {
                Self::BadRequest(message)
            }
            MilestoneError::UpdateFailed { .. } => Self::Internal(message)
        }
    }
}

impl From<MemoryError> for ApiError {
    fn from(err: MemoryError) -> Self {
        match err {
            MemoryError::Validation(e) => Self::Validation(e),
            MemoryError::Provider(e) => e.into()
        }
    }
}

/// Errors that stop the server from starting or serving.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Missing required secrets: {}", .missing.join(", "))]
    MissingSecrets { missing: Vec<&'static str> },

    #[error("Failed to build provider: {0}")]
    Provider(#[from] ProviderError),

    #[error("Failed to install metrics recorder: {0}")]
    Metrics(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Server error: {0}")]
    Serve(#[from] std::io::Error)
}
