//! Money bounds
//!
//! Prices and totals are persisted as `NUMERIC(10, 2)`: two decimal places,
//! eight integer digits.

use rust_decimal::Decimal;

use crate::error::AppError;

/// Decimal places kept for any amount
pub const MONEY_SCALE: u32 = 2;

/// Largest storable amount, 99 999 999.99
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, MONEY_SCALE);

/// Whether `amount` is stored without rounding or overflow
///
/// Trailing zeros do not count towards the scale (`9.500` is fine).
pub fn fits_money_column(amount: Decimal) -> bool {
    amount.normalize().scale() <= MONEY_SCALE && amount.abs() <= MAX_AMOUNT
}

/// Reject amounts the money column cannot hold exactly
pub fn check_amount(amount: Decimal, field: &str, label: &str) -> Result<(), AppError> {
    if fits_money_column(amount) {
        return Ok(());
    }
    Err(AppError::validation(format!(
        "{label} must have at most {MONEY_SCALE} decimal places and not exceed {MAX_AMOUNT}"
    ))
    .with_detail("field", field))
}
