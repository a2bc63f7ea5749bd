//! Custom Test Assertions
//!
//! Assertion helpers that give clearer failure messages for amounts and
//! field-level validation errors.

use core_kernel::ValidationErrors;
use domain_vehicle::VehicleError;
use rust_decimal::Decimal;

/// Asserts two amounts are equal after normalising their scale
pub fn assert_amount_eq(actual: Decimal, expected: Decimal) {
    assert_eq!(
        actual.normalize(),
        expected.normalize(),
        "Amounts differ: actual={actual}, expected={expected}"
    );
}

/// Asserts two amounts differ by at most `tolerance`
pub fn assert_amount_approx_eq(actual: Decimal, expected: Decimal, tolerance: Decimal) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= tolerance,
        "Amounts differ by more than tolerance: actual={actual}, expected={expected}, diff={diff}, tolerance={tolerance}"
    );
}

/// Asserts the errors name exactly `fields`, in any order
pub fn assert_fields(errors: &ValidationErrors, fields: &[&str]) {
    let mut actual: Vec<&str> = errors.errors().iter().map(|e| e.field.as_str()).collect();
    actual.sort_unstable();
    actual.dedup();
    let mut expected = fields.to_vec();
    expected.sort_unstable();
    assert_eq!(actual, expected, "Validation fields differ: {errors:?}");
}

/// Asserts a ledger error is a validation failure naming exactly `fields`
pub fn assert_validation_error(error: &VehicleError, fields: &[&str]) {
    match error {
        VehicleError::Validation(errors) => assert_fields(errors, fields),
        other => panic!("Expected validation error on {fields:?}, got {other:?}"),
    }
}

/// Asserts a ledger error is a not-found failure
pub fn assert_not_found(error: &VehicleError) {
    assert!(
        matches!(error, VehicleError::NotFound { .. }),
        "Expected not found, got {error:?}"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amount_eq_ignores_scale() {
        assert_amount_eq(dec!(280.00), dec!(280));
    }

    #[test]
    #[should_panic(expected = "Amounts differ")]
    fn test_amount_eq_fails_on_difference() {
        assert_amount_eq(dec!(280.01), dec!(280));
    }

    #[test]
    fn test_fields_ignore_order_and_repeats() {
        let mut errors = ValidationErrors::new();
        errors.add("sale_date", "required");
        errors.add("buyer_id", "required");
        errors.add("buyer_id", "unknown");
        assert_fields(&errors, &["buyer_id", "sale_date"]);
    }

    #[test]
    fn test_validation_error_helper() {
        let error = VehicleError::validation("remaining", "required when a balance remains");
        assert_validation_error(&error, &["remaining"]);
    }
}
