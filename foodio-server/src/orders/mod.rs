//! Order placement and status lifecycle

pub mod engine;
pub mod policy;

pub use engine::OrderEngine;
pub use policy::{PricingPolicy, StatusPolicy};
