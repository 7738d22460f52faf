//! feedback-board/crates/auth-adapters/src/lib.rs
//!
//! Identity-provider adapters: password hashing and bearer tokens.

pub mod password;

#[cfg(feature = "auth-jwt")]
pub mod jwt;

pub use password::Argon2PasswordHasher;

#[cfg(feature = "auth-jwt")]
pub use jwt::JwtTokenCodec;
