//! feedback-board/crates/storage-adapters/src/lib.rs
//!
//! Persistence adapters implementing the repository ports from `domains`.

#[cfg(feature = "memory")]
pub mod memory;

#[cfg(feature = "memory")]
pub use memory::InMemoryStore;
