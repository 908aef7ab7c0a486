//! Foodio server
//!
//! HTTP backend for a small food-ordering service.
//!
//! ```text
//! foodio-server/src/
//! ├── api/        # HTTP routes and handlers
//! ├── auth/       # JWT, CurrentUser extractor, route gating
//! ├── db/         # repository traits, PostgreSQL and in-memory stores
//! ├── orders/     # order engine and policies
//! ├── identity.rs # registration, login, account updates
//! ├── config.rs   # environment configuration
//! └── logger.rs   # tracing setup
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod identity;
pub mod logger;
pub mod orders;
pub mod state;
pub mod util;

pub use api::create_router;
pub use auth::{CurrentUser, JwtService};
pub use config::Config;
pub use orders::OrderEngine;
pub use state::AppState;

/// Security event logging on the `security` target
///
/// ```ignore
/// security_log!(WARN, "auth_failed", uri = "/orders");
/// ```
#[macro_export]
macro_rules! security_log {
    (WARN, $event:expr, $($arg:tt)*) => {
        tracing::warn!(target: "security", event = $event, $($arg)*)
    };
    (INFO, $event:expr, $($arg:tt)*) => {
        tracing::info!(target: "security", event = $event, $($arg)*)
    };
}
