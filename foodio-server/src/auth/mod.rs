//! Access layer
//!
//! - [`JwtService`] - token issuing and verification
//! - [`CurrentUser`] - authenticated caller (axum extractor)
//! - [`require_auth`] / [`require_admin`] - route gating middleware

pub mod extractor;
pub mod jwt;
pub mod middleware;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::{require_admin, require_auth};
