//! Route handlers, one module per resource. Each handler resolves the actor,
//! calls a single service operation and shapes the response.

pub mod admin;
pub mod auth;
pub mod boards;
pub mod comments;
pub mod feedback;
pub mod system;
pub mod tags;

use super::error::ApiError;

pub type ApiResult<T> = Result<T, ApiError>;
