//! Money calculation utilities using rust_decimal for precision
//!
//! Amounts are stored as `f64` (SQLite REAL); every sum, product and
//! comparison goes through `Decimal` and is rounded to 2 places half-up.

use rust_decimal::prelude::*;

use crate::utils::{AppError, ErrorCode};

const DECIMAL_PLACES: u32 = 2;

/// Upper bound for any single amount
pub const MAX_AMOUNT: f64 = 1_000_000.0;

#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::error!(value = ?value, "Non-finite f64 in monetary calculation, defaulting to zero");
        Decimal::ZERO
    })
}

/// Convert back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    let rounded = value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);
    rounded.to_f64().unwrap_or_else(|| {
        tracing::error!(value = %rounded, "Decimal not representable as f64, defaulting to zero");
        0.0
    })
}

#[inline]
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Exact equality at 2 decimal places; 10.004 is not 10.00
pub fn money_eq(a: f64, b: f64) -> bool {
    let (a, b) = (to_decimal(a), to_decimal(b));
    has_cents_precision(a) && has_cents_precision(b) && a == b
}

/// No digits beyond the cent
#[inline]
fn has_cents_precision(value: Decimal) -> bool {
    round2(value) == value
}

/// unit_price × quantity
pub fn line_total(unit_price: f64, quantity: i32) -> Decimal {
    round2(to_decimal(unit_price) * Decimal::from(quantity))
}

/// round2(subtotal × rate)
pub fn tax_for(subtotal: Decimal, rate: f64) -> Decimal {
    round2(subtotal * to_decimal(rate))
}

/// Amount must be finite, non-negative, below [`MAX_AMOUNT`] and carry at most 2 decimals
pub fn validate_amount(value: f64, field: &str) -> Result<(), AppError> {
    if !value.is_finite() {
        return Err(AppError::validation(format!("{field} must be a finite number"))
            .with_detail("field", field));
    }
    if value < 0.0 {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("{field} must be non-negative, got {value}"),
        )
        .with_detail("field", field));
    }
    if value > MAX_AMOUNT {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("{field} exceeds maximum allowed ({MAX_AMOUNT}), got {value}"),
        )
        .with_detail("field", field));
    }
    if !has_cents_precision(to_decimal(value)) {
        return Err(AppError::validation(format!(
            "{field} must have at most {DECIMAL_PLACES} decimal places, got {value}"
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// total == subtotal + tax − discount
pub fn is_total_consistent(subtotal: f64, tax: f64, discount: f64, total: f64) -> bool {
    let expected = to_decimal(subtotal) + to_decimal(tax) - to_decimal(discount);
    let total = to_decimal(total);
    has_cents_precision(total) && round2(expected) == total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_decimal_precision() {
        let sum_f64 = 0.1_f64 + 0.2_f64;
        assert_ne!(sum_f64, 0.3);
        assert_eq!(to_f64(to_decimal(0.1) + to_decimal(0.2)), 0.3);
    }

    #[test]
    fn test_line_total_and_tax() {
        assert_eq!(to_f64(line_total(12.5, 2)), 25.0);
        assert_eq!(to_f64(line_total(0.35, 3)), 1.05);
        // 33.33 × 0.1 = 3.333 → 3.33
        assert_eq!(to_f64(tax_for(to_decimal(33.33), 0.10)), 3.33);
        // 0.05 × 0.1 = 0.005 → 0.01 (half-up)
        assert_eq!(to_f64(tax_for(to_decimal(0.05), 0.10)), 0.01);
    }

    #[test]
    fn test_total_identity() {
        assert!(is_total_consistent(100.0, 10.0, 5.0, 105.0));
        assert!(is_total_consistent(0.1, 0.2, 0.0, 0.3));
        assert!(!is_total_consistent(100.0, 10.0, 0.0, 100.0));
        assert!(!is_total_consistent(100.0, 10.0, 5.0, 105.02));
        // 差不到一分也不行
        assert!(!is_total_consistent(100.0, 10.0, 5.0, 105.009));
        assert!(!is_total_consistent(100.0, 10.0, 5.0, 104.999));
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount(0.0, "tax").is_ok());
        assert!(validate_amount(99.99, "subtotal").is_ok());

        let err = validate_amount(-1.0, "discount").unwrap_err();
        assert_eq!(err.code, ErrorCode::ValueOutOfRange);
        assert!(validate_amount(f64::NAN, "total_amount").is_err());
        assert!(validate_amount(f64::INFINITY, "total_amount").is_err());
        assert!(validate_amount(MAX_AMOUNT + 1.0, "subtotal").is_err());

        let err = validate_amount(105.009, "total_amount").unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[test]
    fn test_money_eq_is_exact() {
        assert!(money_eq(30.8, 30.80));
        assert!(money_eq(44.0, 44.0));
        assert!(!money_eq(10.0, 10.004));
        assert!(!money_eq(10.0, 10.01));
    }
}
