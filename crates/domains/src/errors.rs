//! # Domain Errors
//!
//! Leaf error types raised by domain validation and by adapters at the
//! port boundary. The services crate folds these into `ServiceError`.

use thiserror::Error;

/// A structural or content violation, always tied to the offending field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Failures reported by repository adapters.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepoError {
    /// Record not found (e.g., Board, Feedback, Comment)
    #[error("{entity} not found with ID {id}")]
    NotFound { entity: &'static str, id: String },

    /// Uniqueness violation (e.g., duplicate tag name or username)
    #[error("conflict: {0}")]
    Conflict(String),

    /// A write that would leave a dangling reference (e.g., unknown tag or parent)
    #[error("invalid write: {0}")]
    Invalid(#[from] ValidationError),

    /// Infrastructure failure (e.g., DB down)
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl RepoError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// Failures reported by identity-provider adapters (hashing, tokens).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("token issuing failed: {0}")]
    Issuing(String),
}

/// A specialized Result type for repository ports.
pub type RepoResult<T> = std::result::Result<T, RepoError>;
