//! feedback-board/crates/api-adapters/src/lib.rs
//!
//! Transport adapters exposing the application services.

pub mod metrics;

#[cfg(feature = "web-axum")]
pub mod http;

pub use metrics::Metrics;
