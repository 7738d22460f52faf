//! # Domain Models
//!
//! These structs represent the core entities of the feedback board.
//! Identifiers are UUID v7 so that they sort by creation time.

pub mod board;
pub mod comment;
pub mod feedback;
pub mod identity;
pub mod tag;

pub use board::*;
pub use comment::*;
pub use feedback::*;
pub use identity::*;
pub use tag::*;

use crate::errors::ValidationError;

/// Trims `value` and checks its character count against `min..=max`.
/// Returns the trimmed string so callers store the normalized form.
pub(crate) fn trimmed_within(
    field: &'static str,
    value: &str,
    min: usize,
    max: Option<usize>,
) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    let len = trimmed.chars().count();
    if len < min {
        let message = if min <= 1 {
            "must not be empty".to_string()
        } else {
            format!("must be at least {min} characters long")
        };
        return Err(ValidationError::new(field, message));
    }
    if let Some(max) = max {
        if len > max {
            return Err(ValidationError::new(
                field,
                format!("must be at most {max} characters long"),
            ));
        }
    }
    Ok(trimmed.to_string())
}
