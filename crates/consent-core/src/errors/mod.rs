//! Error types and error handling utilities
//!
//! Defines the error taxonomy shared by the service layer and the HTTP
//! adapter. Every service method returns either a domain result or one of
//! these variants; the adapter maps them onto status codes.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type used throughout the consent service
pub type ConsentResult<T> = Result<T, ConsentError>;

/// Error taxonomy for the consent service
#[derive(Debug, Error, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "details", rename_all = "snake_case")]
pub enum ConsentError {
    /// Malformed payload, missing required field, or failed business rule
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Missing consent/authorization for the given id within the tenant.
    /// An org mismatch is reported exactly like an absent row.
    #[error("{resource} not found: {id}")]
    NotFound { resource: String, id: String },

    /// Structurally accepted payload failing a derived constraint
    #[error("Validation error: {0}")]
    Validation(String),

    /// Any persistence-layer failure; surfaced as a generic 500
    #[error("Database error: {0}")]
    Database(String),

    /// Uniqueness collision during creation
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Unexpected internal failure
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConsentError {
    pub fn invalid_request<S: Into<String>>(message: S) -> Self {
        ConsentError::InvalidRequest(message.into())
    }

    pub fn not_found<S: Into<String>>(resource: S, id: S) -> Self {
        ConsentError::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        ConsentError::Validation(message.into())
    }

    pub fn database<S: Into<String>>(message: S) -> Self {
        ConsentError::Database(message.into())
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        ConsentError::Internal(message.into())
    }

    /// Error category for logging and metrics
    pub fn category(&self) -> ErrorCategory {
        match self {
            ConsentError::InvalidRequest(_) => ErrorCategory::InvalidRequest,
            ConsentError::NotFound { .. } => ErrorCategory::NotFound,
            ConsentError::Validation(_) => ErrorCategory::Validation,
            ConsentError::Database(_) => ErrorCategory::Database,
            ConsentError::Conflict(_) => ErrorCategory::Conflict,
            ConsentError::Internal(_) => ErrorCategory::Internal,
        }
    }

    /// Whether the error is attributable to the caller
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ConsentError::InvalidRequest(_)
                | ConsentError::NotFound { .. }
                | ConsentError::Validation(_)
                | ConsentError::Conflict(_)
        )
    }
}

/// Error categories for classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    InvalidRequest,
    NotFound,
    Validation,
    Database,
    Conflict,
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::InvalidRequest => write!(f, "invalid_request"),
            ErrorCategory::NotFound => write!(f, "not_found"),
            ErrorCategory::Validation => write!(f, "validation"),
            ErrorCategory::Database => write!(f, "database"),
            ErrorCategory::Conflict => write!(f, "conflict"),
            ErrorCategory::Internal => write!(f, "internal"),
        }
    }
}

impl From<validator::ValidationErrors> for ConsentError {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut messages = Vec::new();
        for (field, field_errors) in err.field_errors() {
            for error in field_errors {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for field '{}'", field));
                messages.push(message);
            }
        }
        ConsentError::InvalidRequest(messages.join(", "))
    }
}

impl From<serde_json::Error> for ConsentError {
    fn from(err: serde_json::Error) -> Self {
        ConsentError::Validation(err.to_string())
    }
}

impl From<anyhow::Error> for ConsentError {
    fn from(err: anyhow::Error) -> Self {
        ConsentError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let error = ConsentError::invalid_request("purpose list is empty");
        assert_eq!(error.category(), ErrorCategory::InvalidRequest);
        assert!(error.is_client_error());
    }

    #[test]
    fn test_not_found_error() {
        let error = ConsentError::not_found("Consent", "abc-123");
        assert_eq!(error.category(), ErrorCategory::NotFound);

        match error {
            ConsentError::NotFound { resource, id } => {
                assert_eq!(resource, "Consent");
                assert_eq!(id, "abc-123");
            }
            _ => panic!("Expected NotFound error"),
        }
    }

    #[test]
    fn test_database_error_is_not_client_error() {
        let error = ConsentError::database("connection reset");
        assert_eq!(error.category(), ErrorCategory::Database);
        assert!(!error.is_client_error());
    }

    #[test]
    fn test_error_serialization() {
        let error = ConsentError::validation("bad resources payload");
        let json = serde_json::to_string(&error).unwrap();
        let deserialized: ConsentError = serde_json::from_str(&json).unwrap();

        assert_eq!(error.to_string(), deserialized.to_string());
    }

    #[test]
    fn test_category_display() {
        assert_eq!(ErrorCategory::NotFound.to_string(), "not_found");
        assert_eq!(ErrorCategory::Database.to_string(), "database");
    }
}
