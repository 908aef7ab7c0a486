//! Shared types for Foodio
//!
//! Domain models, request/response payloads and the unified error system
//! used by the server and mirrored by the web frontend.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::Json;
pub use error::{AppError, AppResult, ErrorCode, ErrorResponse};
