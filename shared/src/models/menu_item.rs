//! Menu Item Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::money::check_amount;
use crate::error::{AppError, ErrorCode};

/// Category label meaning "no filter" in menu listings
pub const ALL_CATEGORIES: &str = "All";

/// Menu item entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub price: Decimal,
    /// Free-text label, e.g. "Starters", "Main Courses", "Desserts"
    pub category: String,
    pub is_available: bool,
    /// Image path or absolute URL (may be empty)
    pub image_url: String,
}

/// Create menu item payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemCreate {
    #[validate(length(min = 3, message = "Title must be at least 3 characters long"))]
    pub title: String,
    #[validate(length(min = 10, message = "Description must be at least 10 characters long"))]
    pub description: String,
    pub price: Decimal,
    #[validate(length(min = 1, message = "Category is required"))]
    pub category: String,
    pub is_available: Option<bool>,
    #[validate(length(max = 2048, message = "Image URL is too long"))]
    pub image_url: Option<String>,
}

impl MenuItemCreate {
    /// Field rules plus the non-negative price check
    pub fn check(&self) -> Result<(), AppError> {
        self.validate()?;
        check_price(self.price)
    }
}

/// Update menu item payload (partial)
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemUpdate {
    #[validate(length(min = 3, message = "Title must be at least 3 characters long"))]
    pub title: Option<String>,
    #[validate(length(min = 10, message = "Description must be at least 10 characters long"))]
    pub description: Option<String>,
    pub price: Option<Decimal>,
    #[validate(length(min = 1, message = "Category is required"))]
    pub category: Option<String>,
    pub is_available: Option<bool>,
    #[validate(length(max = 2048, message = "Image URL is too long"))]
    pub image_url: Option<String>,
}

impl MenuItemUpdate {
    pub fn check(&self) -> Result<(), AppError> {
        self.validate()?;
        match self.price {
            Some(price) => check_price(price),
            None => Ok(()),
        }
    }

    /// Apply the present fields onto an existing item
    pub fn apply_to(&self, item: &mut MenuItem) {
        if let Some(title) = &self.title {
            item.title = title.clone();
        }
        if let Some(description) = &self.description {
            item.description = description.clone();
        }
        if let Some(price) = self.price {
            item.price = price;
        }
        if let Some(category) = &self.category {
            item.category = category.clone();
        }
        if let Some(is_available) = self.is_available {
            item.is_available = is_available;
        }
        if let Some(image_url) = &self.image_url {
            item.image_url = image_url.clone();
        }
    }
}

/// Menu listing filter (`?category=`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuQuery {
    pub category: Option<String>,
}

impl MenuQuery {
    /// The effective category filter; `None` or "All" means every category
    pub fn category_filter(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty() && *c != ALL_CATEGORIES)
    }
}

fn check_price(price: Decimal) -> Result<(), AppError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(AppError::new(ErrorCode::MenuItemInvalidPrice));
    }
    check_amount(price, "price", "Price")
}
