//! # Test Registry
//!
//! The catalog of rig tests. Each test is identified by a [`TestId`] variant
//! that is statically bound to its formula; the catalog itself is built once
//! and shared read-only for the life of the process.
//!
//! ## Architecture
//!
//! - `TestId` - closed set of tests, with name lookup
//! - `TestDefinition` - ordered input schema, output schema and formula
//! - `TestRegistry` - the catalog plus validation and dispatch
//!
//! ## Usage
//!
//! ```rust
//! use rigspec_core::registry::registry;
//! use rigspec_core::values::InputValues;
//!
//! let inputs = InputValues::new()
//!     .with("maxDeceleration", 9.8)
//!     .with("vehicleMass", 250.0)
//!     .with("tyreRollingRadius", 0.3)
//!     .with("fixtureArmLength", 0.5)
//!     .with("totalLifeKm", 100_000.0)
//!     .with("roadToRigFactor", 100.0);
//!
//! let results = registry().evaluate("Panic Brake Fatigue", &inputs).unwrap();
//! assert_eq!(results.get("requiredCycles"), Some(1000.0));
//! ```

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::calculations::{front_fork, panic_brake};
use crate::errors::{Bound, CalcError, CalcResult, FormulaError};
use crate::materials::Material;
use crate::values::{InputValue, InputValues, ResultValues};

/// A formula over validated, label-keyed inputs.
pub type FormulaFn = fn(&InputValues) -> Result<ResultValues, FormulaError>;

// ============================================================================
// Test Identity
// ============================================================================

/// All tests known to rigspec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TestId {
    PanicBrakeFatigue,
    FrontForkFatigue,
}

impl TestId {
    /// All tests in catalog order
    pub const ALL: [TestId; 2] = [TestId::PanicBrakeFatigue, TestId::FrontForkFatigue];

    /// Catalog name, as shown to users
    pub fn name(&self) -> &'static str {
        match self {
            TestId::PanicBrakeFatigue => "Panic Brake Fatigue",
            TestId::FrontForkFatigue => "Front Fork Fatigue",
        }
    }

    /// Parse a test name, ignoring case and treating `-`/`_` as spaces.
    ///
    /// ```rust
    /// use rigspec_core::registry::TestId;
    ///
    /// assert_eq!(TestId::from_name("front-fork-fatigue"), Some(TestId::FrontForkFatigue));
    /// assert_eq!(TestId::from_name("Seat Post"), None);
    /// ```
    pub fn from_name(name: &str) -> Option<Self> {
        let wanted = normalize_name(name);
        TestId::ALL
            .into_iter()
            .find(|id| normalize_name(id.name()) == wanted)
    }

    /// The formula bound to this test
    pub fn formula(&self) -> FormulaFn {
        match self {
            TestId::PanicBrakeFatigue => panic_brake::evaluate,
            TestId::FrontForkFatigue => front_fork::evaluate,
        }
    }

    /// Input labels the bound formula consumes
    pub fn formula_labels(&self) -> &'static [&'static str] {
        match self {
            TestId::PanicBrakeFatigue => &panic_brake::PanicBrakeInput::LABELS,
            TestId::FrontForkFatigue => &front_fork::FrontForkInput::LABELS,
        }
    }

    /// The registered definition for this test
    pub fn definition(&self) -> &'static TestDefinition {
        registry().definition(*self)
    }
}

impl std::fmt::Display for TestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

fn normalize_name(name: &str) -> String {
    name.to_lowercase()
        .replace(['-', '_'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// Field Specifications
// ============================================================================

/// How an input is entered and validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    /// Real number, optionally bounded
    Numeric {
        default: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        step: Option<f64>,
    },
    /// One of a fixed set of values
    Choice { default: String, allowed: Vec<String> },
}

/// One input slot of a test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputFieldSpec {
    /// Key in `InputValues`, unique within the test
    pub label: String,
    /// Caption for forms and reports
    pub display_name: String,
    /// Unit string, empty for dimensionless inputs
    pub unit: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    /// Decimal places to display, `None` for shortest representation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u8>,
}

impl InputFieldSpec {
    /// Unbounded numeric field
    pub fn number(label: &str, display_name: &str, unit: &str, default: f64) -> Self {
        InputFieldSpec {
            label: label.to_string(),
            display_name: display_name.to_string(),
            unit: unit.to_string(),
            kind: FieldKind::Numeric {
                default,
                min: None,
                max: None,
                step: None,
            },
            precision: None,
        }
    }

    /// Choice field over `allowed`
    pub fn choice(label: &str, display_name: &str, allowed: Vec<String>, default: &str) -> Self {
        InputFieldSpec {
            label: label.to_string(),
            display_name: display_name.to_string(),
            unit: String::new(),
            kind: FieldKind::Choice {
                default: default.to_string(),
                allowed,
            },
            precision: None,
        }
    }

    /// Set the inclusive lower bound of a numeric field
    pub fn min(mut self, value: f64) -> Self {
        if let FieldKind::Numeric { min, .. } = &mut self.kind {
            *min = Some(value);
        }
        self
    }

    /// Set the inclusive upper bound of a numeric field
    pub fn max(mut self, value: f64) -> Self {
        if let FieldKind::Numeric { max, .. } = &mut self.kind {
            *max = Some(value);
        }
        self
    }

    /// Set the entry increment of a numeric field
    pub fn step(mut self, value: f64) -> Self {
        if let FieldKind::Numeric { step, .. } = &mut self.kind {
            *step = Some(value);
        }
        self
    }

    pub fn precision(mut self, places: u8) -> Self {
        self.precision = Some(places);
        self
    }

    /// Default value as an input
    pub fn default_value(&self) -> InputValue {
        match &self.kind {
            FieldKind::Numeric { default, .. } => InputValue::Number(*default),
            FieldKind::Choice { default, .. } => InputValue::Text(default.clone()),
        }
    }

    /// Format a value for display using the field's precision
    pub fn format_value(&self, value: &InputValue) -> String {
        match (value, self.precision) {
            (InputValue::Number(n), Some(places)) => format!("{:.*}", places as usize, n),
            _ => value.to_string(),
        }
    }

    /// Validate one raw value, returning the canonical bound value.
    fn validate(&self, test_name: &str, value: &InputValue) -> CalcResult<InputValue> {
        match (&self.kind, value) {
            (FieldKind::Numeric { min, max, .. }, InputValue::Number(n)) => {
                if !n.is_finite() {
                    return Err(CalcError::invalid_input(
                        &self.label,
                        n.to_string(),
                        "Value must be a finite number",
                    ));
                }
                if let Some(lo) = min {
                    if n < lo {
                        return Err(CalcError::out_of_range(test_name, &self.label, *n, Bound::Min(*lo)));
                    }
                }
                if let Some(hi) = max {
                    if n > hi {
                        return Err(CalcError::out_of_range(test_name, &self.label, *n, Bound::Max(*hi)));
                    }
                }
                Ok(InputValue::Number(*n))
            }
            (FieldKind::Numeric { .. }, InputValue::Text(s)) => Err(CalcError::invalid_input(
                &self.label,
                s.as_str(),
                "Expected a number",
            )),
            (FieldKind::Choice { allowed, .. }, InputValue::Text(s)) => allowed
                .iter()
                .find(|a| a.eq_ignore_ascii_case(s.trim()))
                .map(|a| InputValue::Text(a.clone()))
                .ok_or_else(|| CalcError::invalid_choice(test_name, &self.label, s.as_str(), allowed)),
            (FieldKind::Choice { allowed, .. }, InputValue::Number(n)) => Err(CalcError::invalid_input(
                &self.label,
                n.to_string(),
                format!("Expected one of: {}", allowed.join(", ")),
            )),
        }
    }
}

/// One result a test produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputFieldSpec {
    pub label: String,
    pub display_name: String,
    pub unit: String,
    /// Decimal places to display
    pub precision: u8,
}

impl OutputFieldSpec {
    pub fn new(label: &str, display_name: &str, unit: &str, precision: u8) -> Self {
        OutputFieldSpec {
            label: label.to_string(),
            display_name: display_name.to_string(),
            unit: unit.to_string(),
            precision,
        }
    }

    pub fn format_value(&self, value: f64) -> String {
        format!("{:.*}", self.precision as usize, value)
    }
}

// ============================================================================
// Test Definitions
// ============================================================================

/// A registered test: schema plus its statically bound formula.
#[derive(Debug, Clone)]
pub struct TestDefinition {
    pub id: TestId,
    /// Unique catalog key
    pub name: String,
    pub description: String,
    /// Inputs in form order
    pub inputs: Vec<InputFieldSpec>,
    /// Outputs in presentation order
    pub outputs: Vec<OutputFieldSpec>,
    pub formula: FormulaFn,
}

/// Serializable view of a definition for driving forms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestSchema {
    pub name: String,
    pub description: String,
    pub inputs: Vec<InputFieldSpec>,
    pub outputs: Vec<OutputFieldSpec>,
}

impl TestDefinition {
    pub fn schema(&self) -> TestSchema {
        TestSchema {
            name: self.name.clone(),
            description: self.description.clone(),
            inputs: self.inputs.clone(),
            outputs: self.outputs.clone(),
        }
    }

    /// Look up an input spec by label
    pub fn input(&self, label: &str) -> Option<&InputFieldSpec> {
        self.inputs.iter().find(|f| f.label == label)
    }

    /// Look up an output spec by label
    pub fn output(&self, label: &str) -> Option<&OutputFieldSpec> {
        self.outputs.iter().find(|f| f.label == label)
    }

    /// The form defaults as a complete input mapping
    pub fn default_inputs(&self) -> InputValues {
        self.inputs
            .iter()
            .map(|f| (f.label.clone(), f.default_value()))
            .collect()
    }

    /// Check every declared field in order and return the bound inputs.
    ///
    /// Labels the test does not declare are dropped from the result.
    pub fn validate(&self, inputs: &InputValues) -> CalcResult<InputValues> {
        let mut bound = InputValues::new();
        for field in &self.inputs {
            let raw = inputs
                .get(&field.label)
                .ok_or_else(|| CalcError::missing_input(&self.name, &field.label))?;
            bound.insert(field.label.clone(), field.validate(&self.name, raw)?);
        }
        Ok(bound)
    }

    /// Validate, then run the bound formula.
    pub fn evaluate(&self, inputs: &InputValues) -> CalcResult<ResultValues> {
        let bound = self.validate(inputs)?;
        (self.formula)(&bound).map_err(|e| CalcError::domain(&self.name, e))
    }
}

fn panic_brake_definition() -> TestDefinition {
    use panic_brake::labels::*;

    let id = TestId::PanicBrakeFatigue;
    TestDefinition {
        id,
        name: id.name().to_string(),
        description: "Brake rig load at the fixture arm and rig cycles for the design life".to_string(),
        inputs: vec![
            InputFieldSpec::number(MAX_DECELERATION, "Max Deceleration (m/s^2)", "m/s^2", 1.0).min(1.0),
            InputFieldSpec::number(VEHICLE_MASS, "Mass of the Vehicle (kg)", "kg", 1.0).min(1.0),
            InputFieldSpec::number(TYRE_ROLLING_RADIUS, "Tyre rolling radius (m)", "m", 1.0),
            InputFieldSpec::number(FIXTURE_ARM_LENGTH, "Fixture arm length (m)", "m", 1.0),
            InputFieldSpec::number(TOTAL_LIFE_KM, "Total life (km)", "km", 1.0).min(1.0),
            InputFieldSpec::number(ROAD_TO_RIG_FACTOR, "Road to rig factor", "", 1.0),
        ],
        outputs: vec![
            OutputFieldSpec::new(REQUIRED_LOAD_KG, "Required Load (kg)", "kg", 3),
            OutputFieldSpec::new(REQUIRED_CYCLES, "Required Cycles", "cycles", 1),
        ],
        formula: id.formula(),
    }
}

fn front_fork_definition() -> TestDefinition {
    use front_fork::labels::*;

    let id = TestId::FrontForkFatigue;
    TestDefinition {
        id,
        name: id.name().to_string(),
        description: "Fork bending fatigue cycles from load range, gauge calibration and material".to_string(),
        inputs: vec![
            InputFieldSpec::number(TARGET_DAMAGE, "Target Damage", "", 640_582_108_680.192),
            InputFieldSpec::number(FORK_LENGTH_MM, "Fork Length (mm)", "mm", 545.0),
            InputFieldSpec::number(MAX_LOAD_KGF, "Max Load (kgf)", "kgf", 200.0),
            InputFieldSpec::number(MIN_LOAD_KGF, "Min Load (kgf)", "kgf", -200.0),
            InputFieldSpec::number(CALIBRATION_FACTOR, "Calibration factor", "", 0.0068)
                .min(0.0001)
                .max(0.01)
                .step(0.0001)
                .precision(5),
            InputFieldSpec::number(CALIBRATION_CONSTANT, "Calibration constant", "", -1.356)
                .step(0.001)
                .precision(5),
            InputFieldSpec::choice(MATERIAL, "Material", Material::names(), Material::Steel.name()),
            InputFieldSpec::number(FACTOR_OF_SAFETY, "Factor of Safety", "", 1.0),
        ],
        outputs: vec![OutputFieldSpec::new(
            NUMBER_OF_CYCLES,
            "Total Number of cycles",
            "cycles",
            0,
        )],
        formula: id.formula(),
    }
}

// ============================================================================
// Registry
// ============================================================================

/// The immutable test catalog.
#[derive(Debug, Clone)]
pub struct TestRegistry {
    tests: Vec<TestDefinition>,
}

static REGISTRY: Lazy<TestRegistry> = Lazy::new(TestRegistry::builtin);

/// The process-wide built-in catalog.
pub fn registry() -> &'static TestRegistry {
    &REGISTRY
}

impl TestRegistry {
    /// Build the catalog of every [`TestId`]
    pub fn builtin() -> Self {
        TestRegistry {
            tests: TestId::ALL
                .iter()
                .map(|id| match id {
                    TestId::PanicBrakeFatigue => panic_brake_definition(),
                    TestId::FrontForkFatigue => front_fork_definition(),
                })
                .collect(),
        }
    }

    /// All definitions in catalog order
    pub fn definitions(&self) -> &[TestDefinition] {
        &self.tests
    }

    /// Names and schemas of every test, for building forms
    pub fn list_tests(&self) -> Vec<TestSchema> {
        self.tests.iter().map(TestDefinition::schema).collect()
    }

    /// Resolve a test by name. Exact names match first, then the
    /// case-insensitive forms accepted by [`TestId::from_name`].
    pub fn get(&self, test_name: &str) -> CalcResult<&TestDefinition> {
        self.tests
            .iter()
            .find(|t| t.name == test_name)
            .or_else(|| {
                let id = TestId::from_name(test_name)?;
                self.tests.iter().find(|t| t.id == id)
            })
            .ok_or_else(|| CalcError::not_found(test_name))
    }

    fn definition(&self, id: TestId) -> &TestDefinition {
        // builtin() is the only constructor: one definition per TestId, in declaration order
        &self.tests[id as usize]
    }

    /// Validate `inputs` against the named test and run its formula.
    ///
    /// # Errors
    ///
    /// * `CalcError::NotFound` - unknown test name
    /// * `CalcError::MissingInput` - a declared label is absent
    /// * `CalcError::OutOfRange` - a numeric bound is violated
    /// * `CalcError::InvalidChoice` - a choice is not allowed
    /// * `CalcError::InvalidInput` - wrong value kind or non-finite number
    /// * `CalcError::Domain` - undefined arithmetic in the formula
    pub fn evaluate(&self, test_name: &str, inputs: &InputValues) -> CalcResult<ResultValues> {
        self.get(test_name)?.evaluate(inputs)
    }
}

/// List every registered test.
pub fn list_tests() -> Vec<TestSchema> {
    registry().list_tests()
}

/// Evaluate a registered test by name.
pub fn evaluate(test_name: &str, inputs: &InputValues) -> CalcResult<ResultValues> {
    registry().evaluate(test_name, inputs)
}
