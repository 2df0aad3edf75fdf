//! impulsa-common — Shared error types used across all Impulsa crates.

pub mod error;

// Re-export commonly used types
pub use error::{ApiError, ApiResult};
