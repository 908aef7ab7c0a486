//! Pricing and status-transition policies

use std::fmt;
use std::str::FromStr;

use shared::error::{AppError, ErrorCode};
use shared::models::OrderStatus;

/// How line prices and the order total are established
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PricingPolicy {
    /// Store client prices and total verbatim
    #[default]
    TrustClient,
    /// Recompute from catalog prices and reject a mismatched total
    Catalog,
}

impl fmt::Display for PricingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PricingPolicy::TrustClient => "trust_client",
            PricingPolicy::Catalog => "catalog",
        })
    }
}

impl FromStr for PricingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trust_client" => Ok(Self::TrustClient),
            "catalog" => Ok(Self::Catalog),
            other => Err(format!("expected 'trust_client' or 'catalog', got '{other}'")),
        }
    }
}

/// Which status changes are accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusPolicy {
    /// Any recognized status may replace any other
    #[default]
    Open,
    /// Single forward steps only; rewriting the current status is a no-op
    Strict,
}

impl StatusPolicy {
    pub fn check(&self, from: OrderStatus, to: OrderStatus) -> Result<(), AppError> {
        match self {
            StatusPolicy::Open => Ok(()),
            StatusPolicy::Strict if from == to || from.next() == Some(to) => Ok(()),
            StatusPolicy::Strict => Err(AppError::with_message(
                ErrorCode::InvalidStatusTransition,
                format!("Cannot change order status from {from} to {to}"),
            )
            .with_detail("from", from.as_str())
            .with_detail("to", to.as_str())),
        }
    }
}

impl fmt::Display for StatusPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StatusPolicy::Open => "open",
            StatusPolicy::Strict => "strict",
        })
    }
}

impl FromStr for StatusPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "strict" => Ok(Self::Strict),
            other => Err(format!("expected 'open' or 'strict', got '{other}'")),
        }
    }
}
