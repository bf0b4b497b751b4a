//! # Orion Errors
//!
//! Error types shared by every crate in the workspace.
//!
//! - [`ProviderError`] describes a failed call to one of the upstream
//!   collaborators (Notion, Qdrant, the embedding and generation endpoints,
//!   Habitica).
//! - [`ValidationError`] describes a request that was rejected before any
//!   upstream call was made.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// The upstream collaborator a [`ProviderError`] originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Service {
    Notion,
    Qdrant,
    Embedding,
    Llm,
    Habitica
}

impl Service {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Notion => "notion",
            Self::Qdrant => "qdrant",
            Self::Embedding => "embedding",
            Self::Llm => "llm",
            Self::Habitica => "habitica"
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upstream call failures.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{service} request failed: {reason}")]
    Http { service: Service, reason: String },

    #[error("{service} returned status {status}: {message}")]
    Status {
        service: Service,
        status: u16,
        message: String
    },

    #[error("{service} response could not be decoded: {reason}")]
    Decode { service: Service, reason: String },

    #[error("{service} returned no {what}")]
    EmptyResult { service: Service, what: String },

    #[error("{service} has no record {id}")]
    NotFound { service: Service, id: String },

    #[error("{service} is not configured: {setting} missing")]
    NotConfigured { service: Service, setting: String }
}

impl ProviderError {
    pub fn http(service: Service, reason: impl fmt::Display) -> Self {
        Self::Http {
            service,
            reason: reason.to_string()
        }
    }

    pub fn decode(service: Service, reason: impl fmt::Display) -> Self {
        Self::Decode {
            service,
            reason: reason.to_string()
        }
    }

    pub fn empty(service: Service, what: impl Into<String>) -> Self {
        Self::EmptyResult {
            service,
            what: what.into()
        }
    }

    pub fn not_configured(service: Service, setting: impl Into<String>) -> Self {
        Self::NotConfigured {
            service,
            setting: setting.into()
        }
    }

    pub fn service(&self) -> Service {
        match self {
            Self::Http { service, .. }
            | Self::Status { service, .. }
            | Self::Decode { service, .. }
            | Self::EmptyResult { service, .. }
            | Self::NotFound { service, .. }
            | Self::NotConfigured { service, .. } => *service
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
            || matches!(self, Self::Status { status: 404, .. })
    }
}

/// Request validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid {field}: {reason}")]
    InvalidField { field: String, reason: String }
}

impl ValidationError {
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into()
        }
    }

    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_display() {
        let err = ProviderError::Status {
            service: Service::Notion,
            status: 400,
            message: "validation_error".to_string()
        };
        assert_eq!(
            err.to_string(),
            "notion returned status 400: validation_error"
        );
        assert_eq!(err.service(), Service::Notion);
    }

    #[test]
    fn test_not_found_detection() {
        let err = ProviderError::Status {
            service: Service::Notion,
            status: 404,
            message: "object_not_found".to_string()
        };
        assert!(err.is_not_found());

        let err = ProviderError::NotFound {
            service: Service::Notion,
            id: "page-1".to_string()
        };
        assert!(err.is_not_found());

        assert!(!ProviderError::http(Service::Qdrant, "connection refused").is_not_found());
    }

    #[test]
    fn test_service_serializes_lowercase() {
        let json = serde_json::to_string(&Service::Habitica).unwrap();
        assert_eq!(json, "\"habitica\"");
    }

    #[test]
    fn test_validation_error_display() {
        assert_eq!(
            ValidationError::missing("text").to_string(),
            "Missing required field: text"
        );
        assert_eq!(
            ValidationError::invalid("limit", "must be positive").to_string(),
            "Invalid limit: must be positive"
        );
    }
}
