//! # Error Types
//!
//! Structured error types for rigspec_core. Every failure of a single
//! `evaluate` call is reported as one of these variants; nothing is retried
//! and no partial results are returned.
//!
//! ## Example
//!
//! ```rust
//! use rigspec_core::errors::{CalcError, CalcResult};
//!
//! fn check_mass(mass_kg: f64) -> CalcResult<()> {
//!     if mass_kg < 1.0 {
//!         return Err(CalcError::out_of_range(
//!             "Panic Brake Fatigue",
//!             "vehicleMass",
//!             mass_kg,
//!             rigspec_core::errors::Bound::Min(1.0),
//!         ));
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for rigspec_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// A declared numeric bound that an input violated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "limit")]
pub enum Bound {
    /// Value was below the declared minimum
    Min(f64),
    /// Value was above the declared maximum
    Max(f64),
}

impl std::fmt::Display for Bound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Bound::Min(limit) => write!(f, "minimum {}", limit),
            Bound::Max(limit) => write!(f, "maximum {}", limit),
        }
    }
}

/// Failure raised inside a formula at the point of undefined arithmetic.
///
/// Formulas know nothing about the registry, so these carry no test name.
/// The dispatcher wraps them into [`CalcError::Domain`].
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum FormulaError {
    /// A divisor evaluated to exactly zero
    #[error("division by zero while computing {quantity} (inputs: {})", inputs.join(", "))]
    DivisionByZero {
        quantity: String,
        inputs: Vec<String>,
    },

    /// An intermediate or final value overflowed or became NaN
    #[error("{quantity} is not a finite number (inputs: {})", inputs.join(", "))]
    NonFinite {
        quantity: String,
        inputs: Vec<String>,
    },

    /// The formula asked for a label the validated inputs do not hold
    #[error("formula input '{label}' was not bound")]
    UnboundInput { label: String },

    /// A material choice did not resolve against the catalog
    #[error("unknown material '{name}'")]
    UnknownMaterial { name: String },
}

impl FormulaError {
    /// Create a DivisionByZero error
    pub fn division_by_zero(quantity: impl Into<String>, inputs: &[&str]) -> Self {
        FormulaError::DivisionByZero {
            quantity: quantity.into(),
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Create a NonFinite error
    pub fn non_finite(quantity: impl Into<String>, inputs: &[&str]) -> Self {
        FormulaError::NonFinite {
            quantity: quantity.into(),
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Input labels implicated in the failure
    pub fn implicated_inputs(&self) -> Vec<String> {
        match self {
            FormulaError::DivisionByZero { inputs, .. } | FormulaError::NonFinite { inputs, .. } => {
                inputs.clone()
            }
            FormulaError::UnboundInput { label } => vec![label.clone()],
            FormulaError::UnknownMaterial { .. } => vec!["material".to_string()],
        }
    }
}

/// Structured error type for registry, formula and storage operations.
///
/// Each variant provides specific context about what went wrong,
/// enabling programmatic error handling by the CLI and other consumers.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// No test is registered under this name
    #[error("Test not found: {test_name}")]
    NotFound { test_name: String },

    /// A required input label was not supplied
    #[error("Missing input for '{test_name}': {label}")]
    MissingInput { test_name: String, label: String },

    /// A numeric input violated a declared bound
    #[error("Input '{label}' of '{test_name}' is out of range: {value} violates {bound}")]
    OutOfRange {
        test_name: String,
        label: String,
        value: f64,
        bound: Bound,
    },

    /// A choice input is not one of the allowed values
    #[error("Invalid choice for '{label}' of '{test_name}': {value} (allowed: {})", allowed.join(", "))]
    InvalidChoice {
        test_name: String,
        label: String,
        value: String,
        allowed: Vec<String>,
    },

    /// An input has the wrong kind or is not a finite number
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// Undefined arithmetic inside a formula
    #[error("Calculation failed for '{test_name}': {source}")]
    Domain {
        test_name: String,
        #[source]
        source: FormulaError,
    },

    /// Material not found in the catalog
    #[error("Material not found: {material_name}")]
    MaterialNotFound { material_name: String },

    /// No calculation record with this id
    #[error("Calculation record not found: {id}")]
    RecordNotFound { id: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// File is locked by another user/process
    #[error("File locked: '{path}' is locked by {locked_by} since {locked_at}")]
    FileLocked {
        path: String,
        locked_by: String,
        locked_at: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CalcError {
    /// Create a NotFound error
    pub fn not_found(test_name: impl Into<String>) -> Self {
        CalcError::NotFound {
            test_name: test_name.into(),
        }
    }

    /// Create a MissingInput error
    pub fn missing_input(test_name: impl Into<String>, label: impl Into<String>) -> Self {
        CalcError::MissingInput {
            test_name: test_name.into(),
            label: label.into(),
        }
    }

    /// Create an OutOfRange error
    pub fn out_of_range(test_name: impl Into<String>, label: impl Into<String>, value: f64, bound: Bound) -> Self {
        CalcError::OutOfRange {
            test_name: test_name.into(),
            label: label.into(),
            value,
            bound,
        }
    }

    /// Create an InvalidChoice error
    pub fn invalid_choice(
        test_name: impl Into<String>,
        label: impl Into<String>,
        value: impl Into<String>,
        allowed: &[String],
    ) -> Self {
        CalcError::InvalidChoice {
            test_name: test_name.into(),
            label: label.into(),
            value: value.into(),
            allowed: allowed.to_vec(),
        }
    }

    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Wrap a formula failure with the test it came from
    pub fn domain(test_name: impl Into<String>, source: FormulaError) -> Self {
        CalcError::Domain {
            test_name: test_name.into(),
            source,
        }
    }

    /// Create a MaterialNotFound error
    pub fn material_not_found(material_name: impl Into<String>) -> Self {
        CalcError::MaterialNotFound {
            material_name: material_name.into(),
        }
    }

    /// Create a RecordNotFound error
    pub fn record_not_found(id: impl Into<String>) -> Self {
        CalcError::RecordNotFound { id: id.into() }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileLocked error
    pub fn file_locked(path: impl Into<String>, locked_by: impl Into<String>, locked_at: impl Into<String>) -> Self {
        CalcError::FileLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    /// Create a SerializationError
    pub fn serialization(reason: impl Into<String>) -> Self {
        CalcError::SerializationError {
            reason: reason.into(),
        }
    }

    /// Check if this is a recoverable error (e.g., can retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CalcError::FileLocked { .. })
    }

    /// True for the division-by-zero family of formula failures
    pub fn is_division_by_zero(&self) -> bool {
        matches!(
            self,
            CalcError::Domain {
                source: FormulaError::DivisionByZero { .. },
                ..
            }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::NotFound { .. } => "NOT_FOUND",
            CalcError::MissingInput { .. } => "MISSING_INPUT",
            CalcError::OutOfRange { .. } => "OUT_OF_RANGE",
            CalcError::InvalidChoice { .. } => "INVALID_CHOICE",
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::Domain {
                source: FormulaError::DivisionByZero { .. },
                ..
            } => "DIVISION_BY_ZERO",
            CalcError::Domain { .. } => "DOMAIN_ERROR",
            CalcError::MaterialNotFound { .. } => "MATERIAL_NOT_FOUND",
            CalcError::RecordNotFound { .. } => "RECORD_NOT_FOUND",
            CalcError::FileError { .. } => "FILE_ERROR",
            CalcError::FileLocked { .. } => "FILE_LOCKED",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CalcError::VersionMismatch { .. } => "VERSION_MISMATCH",
            CalcError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = CalcError::out_of_range("Panic Brake Fatigue", "vehicleMass", 0.5, Bound::Min(1.0));
        let json = serde_json::to_string(&error).unwrap();
        let roundtrip: CalcError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
        assert!(json.contains("OutOfRange"));
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(CalcError::missing_input("t", "x").error_code(), "MISSING_INPUT");
        assert_eq!(CalcError::not_found("t").error_code(), "NOT_FOUND");
        assert_eq!(CalcError::material_not_found("Brass").error_code(), "MATERIAL_NOT_FOUND");

        let div = CalcError::domain("t", FormulaError::division_by_zero("torque", &["fixtureArmLength"]));
        assert_eq!(div.error_code(), "DIVISION_BY_ZERO");
        assert!(div.is_division_by_zero());

        let nan = CalcError::domain("t", FormulaError::non_finite("damage", &["targetDamage"]));
        assert_eq!(nan.error_code(), "DOMAIN_ERROR");
        assert!(!nan.is_division_by_zero());
    }

    #[test]
    fn test_domain_message_names_test_and_inputs() {
        let err = CalcError::domain(
            "Panic Brake Fatigue",
            FormulaError::division_by_zero("requiredLoadKg", &["fixtureArmLength"]),
        );
        let msg = err.to_string();
        assert!(msg.contains("Panic Brake Fatigue"));
        assert!(msg.contains("fixtureArmLength"));
    }

    #[test]
    fn test_bound_display() {
        assert_eq!(Bound::Min(1.0).to_string(), "minimum 1");
        assert_eq!(Bound::Max(0.01).to_string(), "maximum 0.01");
    }
}
