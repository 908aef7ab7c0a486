//! Data models
//!
//! Shared between the server and the web frontend (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.

pub mod menu_item;
pub mod money;
pub mod order;
pub mod user;

// Re-exports
pub use menu_item::*;
pub use money::*;
pub use order::*;
pub use user::*;
