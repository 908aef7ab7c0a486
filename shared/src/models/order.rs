//! Order Model
//!
//! Wire shapes for checkout, status updates and the expanded order
//! representation returned to clients.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::money::check_amount;
use crate::error::{AppError, ErrorCode};

/// Order lifecycle status
///
/// Expected progression is `Pending → Preparing → Ready → Completed`.
/// There is no cancelled or failed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OrderStatus {
    #[default]
    Pending,
    Preparing,
    Ready,
    Completed,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Preparing => "Preparing",
            OrderStatus::Ready => "Ready",
            OrderStatus::Completed => "Completed",
        }
    }

    /// The following phase, `None` for `Completed`
    pub fn next(&self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Pending => Some(OrderStatus::Preparing),
            OrderStatus::Preparing => Some(OrderStatus::Ready),
            OrderStatus::Ready => Some(OrderStatus::Completed),
            OrderStatus::Completed => None,
        }
    }

    /// Parse a client-supplied label, failing with `InvalidOrderStatus`
    pub fn parse_label(label: &str) -> Result<Self, AppError> {
        label.parse().map_err(|_| {
            AppError::with_message(
                ErrorCode::InvalidOrderStatus,
                format!(
                    "Invalid status '{label}'. Expected one of: Pending, Preparing, Ready, Completed"
                ),
            )
            .with_detail("status", label)
        })
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Unknown order status: {s}"))
    }
}

/// Placeholder labels the web checkout sends when no address was typed
pub const ADDRESS_PLACEHOLDERS: [&str; 2] = ["Address needed", "Default Address"];

/// Whether a submitted address should be replaced by the profile address
pub fn needs_profile_address(address: Option<&str>) -> bool {
    match address.map(str::trim) {
        None | Some("") => true,
        Some(a) => ADDRESS_PLACEHOLDERS
            .iter()
            .any(|p| p.eq_ignore_ascii_case(a)),
    }
}

// ── Inbound ──

/// One cart line submitted at checkout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineInput {
    pub menu_item_id: i64,
    pub quantity: i32,
    pub price: Decimal,
}

/// POST /orders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    #[serde(default)]
    pub items: Vec<OrderLineInput>,
    pub total: Decimal,
    pub address: Option<String>,
}

impl PlaceOrderRequest {
    /// Shape checks: at least one line, quantity ≥ 1, non-negative amounts
    /// that fit the money column
    pub fn check(&self) -> Result<(), AppError> {
        if self.items.is_empty() {
            return Err(
                AppError::validation("Order must have at least one item").with_detail("field", "items")
            );
        }
        for (index, line) in self.items.iter().enumerate() {
            if line.quantity < 1 {
                return Err(AppError::validation("Quantity must be at least 1")
                    .with_detail("field", format!("items[{index}].quantity")));
            }
            if line.price.is_sign_negative() && !line.price.is_zero() {
                return Err(AppError::validation("Price cannot be negative")
                    .with_detail("field", format!("items[{index}].price")));
            }
            check_amount(line.price, &format!("items[{index}].price"), "Price")?;
        }
        if self.total.is_sign_negative() && !self.total.is_zero() {
            return Err(AppError::validation("Total cannot be negative").with_detail("field", "total"));
        }
        check_amount(self.total, "total", "Total")
    }
}

/// PUT /orders/{id}/status
///
/// Kept as a raw label so unknown values surface as `InvalidOrderStatus`
/// instead of a body deserialization failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}

// ── Outbound ──

/// Owning user as embedded in an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderOwner {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Menu item as embedded in an order line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderMenuItem {
    pub id: i64,
    pub title: String,
    pub price: Decimal,
    pub image_url: String,
}

/// Order line with its historical price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: i64,
    pub menu_item_id: i64,
    pub quantity: i32,
    /// Price captured at order time
    pub price: Decimal,
    /// `None` when the menu item has since been removed from the catalog
    pub menu_item: Option<OrderMenuItem>,
}

/// Fully expanded order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub user: Option<OrderOwner>,
    pub items: Vec<OrderItem>,
    pub total: Decimal,
    pub status: OrderStatus,
    pub address: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(quantity: i32, price: Decimal) -> OrderLineInput {
        OrderLineInput {
            menu_item_id: 7,
            quantity,
            price,
        }
    }

    #[test]
    fn test_status_labels() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
        assert!("Shipped".parse::<OrderStatus>().is_err());
        assert!("pending".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_parse_label_error_code() {
        let err = OrderStatus::parse_label("Shipped").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidOrderStatus);
    }

    #[test]
    fn test_next_status() {
        assert_eq!(OrderStatus::Pending.next(), Some(OrderStatus::Preparing));
        assert_eq!(OrderStatus::Ready.next(), Some(OrderStatus::Completed));
        assert_eq!(OrderStatus::Completed.next(), None);
    }

    #[test]
    fn test_address_placeholders() {
        assert!(needs_profile_address(None));
        assert!(needs_profile_address(Some("   ")));
        assert!(needs_profile_address(Some(" address NEEDED ")));
        assert!(needs_profile_address(Some("Default Address")));
        assert!(!needs_profile_address(Some("12 Elm St")));
    }

    #[test]
    fn test_place_request_wire_format() {
        let json = r#"{"items":[{"menuItemId":7,"quantity":2,"price":9.50}],"total":19.00}"#;
        let req: PlaceOrderRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.items.len(), 1);
        assert_eq!(req.items[0].menu_item_id, 7);
        assert_eq!(req.items[0].price, Decimal::new(950, 2));
        assert_eq!(req.total, Decimal::new(1900, 2));
        assert!(req.address.is_none());
    }

    #[test]
    fn test_check_rejects_empty_items() {
        let req = PlaceOrderRequest {
            items: vec![],
            total: Decimal::ZERO,
            address: None,
        };
        let err = req.check().unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(err.message, "Order must have at least one item");
    }

    #[test]
    fn test_check_rejects_bad_lines() {
        let zero_qty = PlaceOrderRequest {
            items: vec![line(0, Decimal::ONE)],
            total: Decimal::ONE,
            address: None,
        };
        assert_eq!(
            zero_qty.check().unwrap_err().message,
            "Quantity must be at least 1"
        );

        let negative_price = PlaceOrderRequest {
            items: vec![line(1, Decimal::new(-1, 0))],
            total: Decimal::ONE,
            address: None,
        };
        assert_eq!(
            negative_price.check().unwrap_err().message,
            "Price cannot be negative"
        );

        let negative_total = PlaceOrderRequest {
            items: vec![line(1, Decimal::ONE)],
            total: Decimal::new(-5, 0),
            address: None,
        };
        assert_eq!(
            negative_total.check().unwrap_err().message,
            "Total cannot be negative"
        );
    }

    #[test]
    fn test_check_rejects_unstorable_amounts() {
        let sub_cent_total = PlaceOrderRequest {
            items: vec![line(1, Decimal::new(1900, 2))],
            total: Decimal::new(19005, 3),
            address: None,
        };
        let err = sub_cent_total.check().unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(err.details.unwrap()["field"], "total");

        let huge_total = PlaceOrderRequest {
            items: vec![line(1, Decimal::ONE)],
            total: "123456789012.345".parse().unwrap(),
            address: None,
        };
        assert_eq!(huge_total.check().unwrap_err().code, ErrorCode::ValidationFailed);

        let sub_cent_price = PlaceOrderRequest {
            items: vec![line(1, Decimal::new(1, 3))],
            total: Decimal::ZERO,
            address: None,
        };
        let err = sub_cent_price.check().unwrap_err();
        assert_eq!(err.details.unwrap()["field"], "items[0].price");

        let trailing_zeros = PlaceOrderRequest {
            items: vec![line(2, Decimal::new(9500, 3))],
            total: Decimal::new(19000, 3),
            address: None,
        };
        assert!(trailing_zeros.check().is_ok());
    }

    #[test]
    fn test_order_serializes_camel_case() {
        let order = Order {
            id: Uuid::nil(),
            user: None,
            items: vec![],
            total: Decimal::ZERO,
            status: OrderStatus::Pending,
            address: String::new(),
            created_at: DateTime::<Utc>::UNIX_EPOCH,
        };
        let value = serde_json::to_value(&order).unwrap();
        assert_eq!(value["status"], "Pending");
        assert!(value.get("createdAt").is_some());
        assert!(value["user"].is_null());
    }
}
