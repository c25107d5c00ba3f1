//! Amount validation
//!
//! Balances and amounts are fixed-point decimals, so many small deposits never
//! accumulate binary rounding drift. Every amount entering a guard is checked
//! here first: it must be a finite, non-negative number.

use super::error::GuardError;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Validate an amount for the given operation
///
/// # Errors
///
/// Returns `GuardError::InvalidAmount` if the amount is negative.
pub fn validate_amount(amount: Decimal, operation: &str) -> Result<Decimal, GuardError> {
    if amount < Decimal::ZERO {
        return Err(GuardError::invalid_amount(amount, operation));
    }
    Ok(amount)
}

/// Convert a floating-point amount into a validated decimal
///
/// NaN, infinities and negative values are rejected, as are finite values
/// too large to be represented as a `Decimal`.
pub fn amount_from_f64(value: f64, operation: &str) -> Result<Decimal, GuardError> {
    if !value.is_finite() {
        return Err(GuardError::invalid_amount(value, operation));
    }

    let amount =
        Decimal::from_f64(value).ok_or_else(|| GuardError::invalid_amount(value, operation))?;
    validate_amount(amount, operation)
}

/// Parse a decimal string (e.g. `"105000"`, `"12.75"`) into a validated amount
pub fn parse_amount(input: &str, operation: &str) -> Result<Decimal, GuardError> {
    let trimmed = input.trim();
    let amount =
        Decimal::from_str(trimmed).map_err(|_| GuardError::invalid_amount(trimmed, operation))?;
    validate_amount(amount, operation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::zero(Decimal::ZERO)]
    #[case::whole(Decimal::new(105000, 0))]
    #[case::fractional(Decimal::new(12345, 4))]
    fn test_validate_accepts_non_negative(#[case] amount: Decimal) {
        assert_eq!(validate_amount(amount, "deposit"), Ok(amount));
    }

    #[test]
    fn test_validate_rejects_negative() {
        let result = validate_amount(Decimal::new(-1, 0), "withdrawal");
        assert_eq!(
            result,
            Err(GuardError::InvalidAmount {
                amount: "-1".to_string(),
                operation: "withdrawal".to_string(),
            })
        );
    }

    #[rstest]
    #[case::nan(f64::NAN)]
    #[case::infinity(f64::INFINITY)]
    #[case::negative_infinity(f64::NEG_INFINITY)]
    #[case::negative(-0.5)]
    fn test_amount_from_f64_rejects(#[case] value: f64) {
        let result = amount_from_f64(value, "deposit");
        assert!(matches!(result, Err(GuardError::InvalidAmount { .. })));
    }

    #[rstest]
    #[case::whole(3000.0, Decimal::new(3000, 0))]
    #[case::half(2.5, Decimal::new(25, 1))]
    #[case::zero(0.0, Decimal::ZERO)]
    fn test_amount_from_f64_converts(#[case] value: f64, #[case] expected: Decimal) {
        assert_eq!(amount_from_f64(value, "deposit"), Ok(expected));
    }

    #[rstest]
    #[case::whole("105000", Decimal::new(105000, 0))]
    #[case::padded("  12.75 ", Decimal::new(1275, 2))]
    #[case::zero("0", Decimal::ZERO)]
    fn test_parse_amount_valid(#[case] input: &str, #[case] expected: Decimal) {
        assert_eq!(parse_amount(input, "deposit"), Ok(expected));
    }

    #[rstest]
    #[case::negative("-3")]
    #[case::garbage("abc")]
    #[case::empty("")]
    fn test_parse_amount_invalid(#[case] input: &str) {
        assert!(matches!(
            parse_amount(input, "deposit"),
            Err(GuardError::InvalidAmount { .. })
        ));
    }
}
