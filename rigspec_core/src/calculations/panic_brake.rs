//! # Panic Brake Fatigue
//!
//! Converts a vehicle's worst-case braking into the load a brake fatigue rig
//! must apply at its fixture arm, and the road life into rig cycles.
//!
//! ```text
//! force          = m * a
//! torque         = force * r_tyre
//! requiredLoadKg = (torque / L_arm) / g
//! requiredCycles = totalLifeKm / roadToRigFactor
//! ```
//!
//! ## Example
//!
//! ```rust
//! use rigspec_core::calculations::panic_brake::{calculate, PanicBrakeInput};
//!
//! let input = PanicBrakeInput {
//!     max_deceleration_m_s2: 9.8,
//!     vehicle_mass_kg: 250.0,
//!     tyre_rolling_radius_m: 0.3,
//!     fixture_arm_length_m: 0.5,
//!     total_life_km: 100_000.0,
//!     road_to_rig_factor: 100.0,
//! };
//! let result = calculate(&input).unwrap();
//! assert!((result.required_load_kg - 149.847).abs() < 1e-3);
//! assert_eq!(result.required_cycles, 1000.0);
//! ```

use serde::{Deserialize, Serialize};

use super::{bound_number, checked_div, ensure_finite};
use crate::errors::FormulaError;
use crate::units::{KilogramsForce, NewtonMetres, Newtons};
use crate::values::{InputValues, ResultValues};

/// Input and output labels
pub mod labels {
    pub const MAX_DECELERATION: &str = "maxDeceleration";
    pub const VEHICLE_MASS: &str = "vehicleMass";
    pub const TYRE_ROLLING_RADIUS: &str = "tyreRollingRadius";
    pub const FIXTURE_ARM_LENGTH: &str = "fixtureArmLength";
    pub const TOTAL_LIFE_KM: &str = "totalLifeKm";
    pub const ROAD_TO_RIG_FACTOR: &str = "roadToRigFactor";

    pub const REQUIRED_LOAD_KG: &str = "requiredLoadKg";
    pub const REQUIRED_CYCLES: &str = "requiredCycles";
}

use labels::*;

/// Input parameters for the panic brake rig.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanicBrakeInput {
    /// Peak deceleration during a panic stop (m/s²)
    pub max_deceleration_m_s2: f64,
    /// Laden vehicle mass (kg)
    pub vehicle_mass_kg: f64,
    /// Tyre rolling radius (m)
    pub tyre_rolling_radius_m: f64,
    /// Rig fixture arm length (m)
    pub fixture_arm_length_m: f64,
    /// Design life on the road (km)
    pub total_life_km: f64,
    /// Road kilometres represented by one rig cycle
    pub road_to_rig_factor: f64,
}

impl PanicBrakeInput {
    /// Every input label this formula consumes
    pub const LABELS: [&'static str; 6] = [
        MAX_DECELERATION,
        VEHICLE_MASS,
        TYRE_ROLLING_RADIUS,
        FIXTURE_ARM_LENGTH,
        TOTAL_LIFE_KM,
        ROAD_TO_RIG_FACTOR,
    ];

    /// Bind from a validated label mapping
    pub fn from_values(values: &InputValues) -> Result<Self, FormulaError> {
        Ok(PanicBrakeInput {
            max_deceleration_m_s2: bound_number(values, MAX_DECELERATION)?,
            vehicle_mass_kg: bound_number(values, VEHICLE_MASS)?,
            tyre_rolling_radius_m: bound_number(values, TYRE_ROLLING_RADIUS)?,
            fixture_arm_length_m: bound_number(values, FIXTURE_ARM_LENGTH)?,
            total_life_km: bound_number(values, TOTAL_LIFE_KM)?,
            road_to_rig_factor: bound_number(values, ROAD_TO_RIG_FACTOR)?,
        })
    }
}

/// Results from the panic brake calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanicBrakeResult {
    /// Braking force at the tyre contact patch
    pub force: Newtons,
    /// Braking torque at the wheel
    pub torque: NewtonMetres,
    /// Load to apply at the fixture arm (kg)
    pub required_load_kg: f64,
    /// Rig cycles equivalent to the design life
    pub required_cycles: f64,
}

impl PanicBrakeResult {
    /// Label-keyed outputs
    pub fn to_values(&self) -> ResultValues {
        ResultValues::from([
            (REQUIRED_LOAD_KG, self.required_load_kg),
            (REQUIRED_CYCLES, self.required_cycles),
        ])
    }
}

/// Calculate the rig load and cycle count.
///
/// # Errors
///
/// * `FormulaError::DivisionByZero` - `fixture_arm_length_m` or
///   `road_to_rig_factor` is zero
/// * `FormulaError::NonFinite` - an output overflowed
pub fn calculate(input: &PanicBrakeInput) -> Result<PanicBrakeResult, FormulaError> {
    let force = Newtons(input.vehicle_mass_kg * input.max_deceleration_m_s2);
    let torque = NewtonMetres(force.0 * input.tyre_rolling_radius_m);

    if input.fixture_arm_length_m == 0.0 {
        return Err(FormulaError::division_by_zero(REQUIRED_LOAD_KG, &[FIXTURE_ARM_LENGTH]));
    }
    let arm_load: KilogramsForce = torque.force_at_arm(input.fixture_arm_length_m).into();
    let required_load_kg = ensure_finite(
        arm_load.0,
        REQUIRED_LOAD_KG,
        &[VEHICLE_MASS, MAX_DECELERATION, TYRE_ROLLING_RADIUS, FIXTURE_ARM_LENGTH],
    )?;

    let required_cycles = checked_div(
        input.total_life_km,
        input.road_to_rig_factor,
        REQUIRED_CYCLES,
        &[TOTAL_LIFE_KM, ROAD_TO_RIG_FACTOR],
    )?;

    Ok(PanicBrakeResult {
        force,
        torque,
        required_load_kg,
        required_cycles,
    })
}

/// Registry entry point.
pub fn evaluate(values: &InputValues) -> Result<ResultValues, FormulaError> {
    let input = PanicBrakeInput::from_values(values)?;
    calculate(&input).map(|r| r.to_values())
}
