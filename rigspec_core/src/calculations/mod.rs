//! # Test Calculations
//!
//! The formula library. Each test follows the pattern:
//!
//! - `*Input` - typed input parameters (JSON-serializable)
//! - `*Result` - results including intermediate quantities
//! - `calculate(input) -> Result<*Result, FormulaError>` - pure calculation
//! - `evaluate(values) -> Result<ResultValues, FormulaError>` - the
//!   label-keyed form bound into the test registry
//!
//! Formulas never return infinity or NaN. Undefined arithmetic is reported
//! as a [`FormulaError`] at the point where it happens.
//!
//! ## Available Calculations
//!
//! - [`panic_brake`] - Panic brake fatigue rig load and cycle count
//! - [`front_fork`] - Front fork bending fatigue cycle count

pub mod front_fork;
pub mod panic_brake;

use crate::errors::FormulaError;
use crate::values::InputValues;

pub use front_fork::{FrontForkInput, FrontForkResult};
pub use panic_brake::{PanicBrakeInput, PanicBrakeResult};

/// Read a numeric input that validation has already bound.
pub(crate) fn bound_number(values: &InputValues, label: &str) -> Result<f64, FormulaError> {
    values.number(label).ok_or_else(|| FormulaError::UnboundInput {
        label: label.to_string(),
    })
}

/// Read a text input that validation has already bound.
pub(crate) fn bound_text<'a>(values: &'a InputValues, label: &str) -> Result<&'a str, FormulaError> {
    values.text(label).ok_or_else(|| FormulaError::UnboundInput {
        label: label.to_string(),
    })
}

/// Divide, failing on an exactly-zero divisor.
pub(crate) fn checked_div(
    numerator: f64,
    denominator: f64,
    quantity: &str,
    inputs: &[&str],
) -> Result<f64, FormulaError> {
    if denominator == 0.0 {
        return Err(FormulaError::division_by_zero(quantity, inputs));
    }
    ensure_finite(numerator / denominator, quantity, inputs)
}

/// Reject overflowed or NaN values.
pub(crate) fn ensure_finite(value: f64, quantity: &str, inputs: &[&str]) -> Result<f64, FormulaError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(FormulaError::non_finite(quantity, inputs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_div() {
        assert_eq!(checked_div(10.0, 4.0, "q", &["a"]).unwrap(), 2.5);

        let err = checked_div(10.0, 0.0, "q", &["a", "b"]).unwrap_err();
        assert_eq!(err, FormulaError::division_by_zero("q", &["a", "b"]));

        // -0.0 == 0.0 in IEEE 754
        assert!(checked_div(1.0, -0.0, "q", &["a"]).is_err());
    }

    #[test]
    fn test_overflow_is_non_finite() {
        let err = checked_div(f64::MAX, 1e-300, "q", &["a"]).unwrap_err();
        assert!(matches!(err, FormulaError::NonFinite { .. }));
    }

    #[test]
    fn test_unbound_input() {
        let values = InputValues::new().with("material", "Steel");
        assert!(matches!(
            bound_number(&values, "material"),
            Err(FormulaError::UnboundInput { .. })
        ));
        assert_eq!(bound_text(&values, "material").unwrap(), "Steel");
    }
}
