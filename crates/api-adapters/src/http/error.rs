//! API error type and the `ServiceError` to HTTP mapping.
//!
//! Internal failures are logged server-side and answered with a generic
//! message. Policy refusals carry an [`AuthzDenial`] response extension so
//! the metrics middleware can count them by entity kind.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use services::ServiceError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
}

/// Marks a response produced by a policy refusal.
#[derive(Debug, Clone, Copy)]
pub struct AuthzDenial {
    pub entity: &'static str,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
    denial: Option<AuthzDenial>,
}

impl ApiError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                code,
                message: message.into(),
                field: None,
            },
            denial: None,
        }
    }

    /// Malformed request bodies, query strings and headers.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "bad_request", message)
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let message = err.to_string();
        match err {
            ServiceError::Unauthenticated => {
                Self::new(StatusCode::UNAUTHORIZED, "not_authenticated", message)
            }
            ServiceError::InvalidCredentials => {
                Self::new(StatusCode::UNAUTHORIZED, "invalid_credentials", message)
            }
            ServiceError::PermissionDenied { entity, .. } => Self {
                denial: Some(AuthzDenial {
                    entity: entity.as_str(),
                }),
                ..Self::new(StatusCode::FORBIDDEN, "permission_denied", message)
            },
            ServiceError::Validation(v) => Self {
                body: ErrorBody {
                    code: "invalid",
                    message: v.message,
                    field: Some(v.field),
                },
                ..Self::new(StatusCode::BAD_REQUEST, "invalid", "")
            },
            ServiceError::NotFound { .. } => Self::new(StatusCode::NOT_FOUND, "not_found", message),
            ServiceError::Conflict(_) => Self::new(StatusCode::CONFLICT, "conflict", message),
            ServiceError::Internal(detail) => {
                tracing::error!(error = %detail, "internal service error");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "internal server error",
                )
            }
        }
    }
}

impl From<domains::ValidationError> for ApiError {
    fn from(err: domains::ValidationError) -> Self {
        ServiceError::from(err).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(self.body)).into_response();
        if let Some(denial) = self.denial {
            response.extensions_mut().insert(denial);
        }
        response
    }
}
