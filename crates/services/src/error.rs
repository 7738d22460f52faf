//! # ServiceError
//!
//! Centralized error handling for the application services.
//! Maps domain and adapter failures to the request-level taxonomy the
//! transport boundary reports: authentication, permission, validation,
//! not-found, conflict, internal.

use domains::{AuthError, RepoError, ValidationError};
use thiserror::Error;

use crate::policy::{Action, EntityKind};

/// The primary error type for all service operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// No identity where the action mandates one
    #[error("authentication required")]
    Unauthenticated,

    /// Authenticated actor fails the eligibility predicate
    #[error("permission denied: cannot {action} this {entity}")]
    PermissionDenied { entity: EntityKind, action: Action },

    /// Structural or content violation on a named field
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Reference to a nonexistent record
    #[error("{entity} not found with ID {id}")]
    NotFound { entity: &'static str, id: String },

    /// Resource already exists (e.g., duplicate tag name)
    #[error("conflict: {0}")]
    Conflict(String),

    /// Login with an unknown user or a wrong password
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Infrastructure failure
    #[error("internal service error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound { entity, id } => Self::NotFound { entity, id },
            RepoError::Conflict(msg) => Self::Conflict(msg),
            RepoError::Invalid(err) => Self::Validation(err),
            RepoError::Backend(msg) => Self::Internal(msg),
        }
    }
}

impl From<AuthError> for ServiceError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials | AuthError::InvalidToken(_) => Self::Unauthenticated,
            AuthError::Hashing(msg) | AuthError::Issuing(msg) => Self::Internal(msg),
        }
    }
}

/// A specialized Result type for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;
