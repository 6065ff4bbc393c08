//! # rigspec_core - Test Rig Specification Engine
//!
//! `rigspec_core` turns engineering test parameters into rig specifications.
//! A registry maps each test name to an ordered input schema and a formula;
//! callers fetch the schema to build a form, submit label-keyed values and
//! get label-keyed results back.
//!
//! ## Design Philosophy
//!
//! - **Stateless core**: validation and formulas are pure functions
//! - **JSON-First**: schemas, values, records and reports serialize with serde
//! - **Rich Errors**: structured error types, never infinity or NaN
//!
//! ## Quick Start
//!
//! ```rust
//! use rigspec_core::{evaluate, list_tests, InputValues};
//!
//! let tests = list_tests();
//! assert_eq!(tests[0].name, "Panic Brake Fatigue");
//!
//! let inputs = InputValues::new()
//!     .with("maxDeceleration", 9.8)
//!     .with("vehicleMass", 250.0)
//!     .with("tyreRollingRadius", 0.3)
//!     .with("fixtureArmLength", 0.5)
//!     .with("totalLifeKm", 100_000.0)
//!     .with("roadToRigFactor", 100.0);
//!
//! let results = evaluate("Panic Brake Fatigue", &inputs).unwrap();
//! let load = results.get("requiredLoadKg").unwrap();
//! assert!((load - 149.847).abs() < 1e-3);
//! ```
//!
//! ## Modules
//!
//! - [`registry`] - Test catalog, field schemas, validation and dispatch
//! - [`calculations`] - The formula library
//! - [`materials`] - Fork material constants
//! - [`values`] - Label-keyed input and result mappings
//! - [`units`] - Type-safe unit wrappers
//! - [`errors`] - Structured error types
//! - [`history`] - Append-only calculation history with atomic saves and locking
//! - [`report`] - JSON and PDF calculation reports

pub mod calculations;
pub mod errors;
pub mod history;
pub mod materials;
pub mod registry;
pub mod report;
pub mod units;
pub mod values;

// Re-export commonly used types at crate root for convenience
pub use errors::{CalcError, CalcResult, FormulaError};
pub use history::{append_record, load_history, load_or_default, CalculationRecord, HistoryLog};
pub use registry::{
    evaluate, list_tests, registry, FieldKind, InputFieldSpec, OutputFieldSpec, TestDefinition, TestId,
    TestSchema,
};
pub use report::{render_report_pdf, CalculationReport};
pub use values::{InputValue, InputValues, ResultValues};
