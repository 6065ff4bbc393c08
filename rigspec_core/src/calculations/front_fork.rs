//! # Front Fork Fatigue
//!
//! Estimates the rig cycles a front fork must survive from strain-gauge
//! calibration, the applied load range and the fork material's S-N exponent.
//!
//! ```text
//! M      = L_fork * P                      (max and min)
//! ε      = M * k_cal + c_cal               (max and min)
//! σ      = ε * E                           (max and min)
//! σ_m    = (σ_max + σ_min) / 2
//! σ_a    = (σ_max - σ_min) / 2
//! σ_corr = σ_a / (1 - σ_m / σ_a)
//! D      = σ_corr ^ m
//! N      = (D_target * FoS) / D
//! ```
//!
//! The mean stress correction is undefined for a zero amplitude or when the
//! mean equals the amplitude; both are reported as division by zero.

use serde::{Deserialize, Serialize};

use super::{bound_number, bound_text, checked_div, ensure_finite};
use crate::errors::FormulaError;
use crate::materials::Material;
use crate::units::KgfMillimetres;
use crate::values::{InputValues, ResultValues};

/// Input and output labels
pub mod labels {
    pub const TARGET_DAMAGE: &str = "targetDamage";
    pub const FORK_LENGTH_MM: &str = "forkLengthMm";
    pub const MAX_LOAD_KGF: &str = "maxLoadKgf";
    pub const MIN_LOAD_KGF: &str = "minLoadKgf";
    pub const CALIBRATION_FACTOR: &str = "calibrationFactor";
    pub const CALIBRATION_CONSTANT: &str = "calibrationConstant";
    pub const MATERIAL: &str = "material";
    pub const FACTOR_OF_SAFETY: &str = "factorOfSafety";

    pub const NUMBER_OF_CYCLES: &str = "numberOfCycles";
}

use labels::*;

/// Load-range inputs that drive the stress amplitude
const LOAD_INPUTS: [&str; 5] = [
    FORK_LENGTH_MM,
    MAX_LOAD_KGF,
    MIN_LOAD_KGF,
    CALIBRATION_FACTOR,
    CALIBRATION_CONSTANT,
];

/// Load-range inputs plus the material exponent
const DAMAGE_INPUTS: [&str; 6] = [
    FORK_LENGTH_MM,
    MAX_LOAD_KGF,
    MIN_LOAD_KGF,
    CALIBRATION_FACTOR,
    CALIBRATION_CONSTANT,
    MATERIAL,
];

/// Input parameters for the front fork rig.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrontForkInput {
    /// Accumulated damage the fork must survive
    pub target_damage: f64,
    /// Fork length from axle to crown (mm)
    pub fork_length_mm: f64,
    /// Peak applied load (kgf)
    pub max_load_kgf: f64,
    /// Trough applied load (kgf), negative for reversed loading
    pub min_load_kgf: f64,
    /// Strain per unit bending moment from gauge calibration
    pub calibration_factor: f64,
    /// Strain offset from gauge calibration
    pub calibration_constant: f64,
    /// Fork material
    pub material: Material,
    /// Factor of safety applied to the target damage
    pub factor_of_safety: f64,
}

impl FrontForkInput {
    /// Every input label this formula consumes
    pub const LABELS: [&'static str; 8] = [
        TARGET_DAMAGE,
        FORK_LENGTH_MM,
        MAX_LOAD_KGF,
        MIN_LOAD_KGF,
        CALIBRATION_FACTOR,
        CALIBRATION_CONSTANT,
        MATERIAL,
        FACTOR_OF_SAFETY,
    ];

    /// Bind from a validated label mapping
    pub fn from_values(values: &InputValues) -> Result<Self, FormulaError> {
        let material_name = bound_text(values, MATERIAL)?;
        let material = Material::from_name(material_name).map_err(|_| FormulaError::UnknownMaterial {
            name: material_name.to_string(),
        })?;

        Ok(FrontForkInput {
            target_damage: bound_number(values, TARGET_DAMAGE)?,
            fork_length_mm: bound_number(values, FORK_LENGTH_MM)?,
            max_load_kgf: bound_number(values, MAX_LOAD_KGF)?,
            min_load_kgf: bound_number(values, MIN_LOAD_KGF)?,
            calibration_factor: bound_number(values, CALIBRATION_FACTOR)?,
            calibration_constant: bound_number(values, CALIBRATION_CONSTANT)?,
            material,
            factor_of_safety: bound_number(values, FACTOR_OF_SAFETY)?,
        })
    }
}

/// Results from the front fork calculation, with every intermediate step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrontForkResult {
    pub max_bending_moment: KgfMillimetres,
    pub min_bending_moment: KgfMillimetres,
    pub max_strain: f64,
    pub min_strain: f64,
    pub max_stress: f64,
    pub min_stress: f64,
    pub mean_stress: f64,
    pub amplitude_stress: f64,
    /// Amplitude after mean stress correction
    pub mean_corrected_stress: f64,
    pub damage_per_cycle: f64,
    /// Rig cycles to reach the factored target damage
    pub number_of_cycles: f64,
}

impl FrontForkResult {
    /// Label-keyed outputs
    pub fn to_values(&self) -> ResultValues {
        ResultValues::from([(NUMBER_OF_CYCLES, self.number_of_cycles)])
    }
}

/// Calculate the number of rig cycles.
///
/// # Errors
///
/// * `FormulaError::DivisionByZero` - zero stress amplitude, mean stress
///   equal to the amplitude, or zero damage per cycle
/// * `FormulaError::NonFinite` - an intermediate value overflowed
pub fn calculate(input: &FrontForkInput) -> Result<FrontForkResult, FormulaError> {
    let props = input.material.properties();

    let max_bending_moment = KgfMillimetres(input.fork_length_mm * input.max_load_kgf);
    let min_bending_moment = KgfMillimetres(input.fork_length_mm * input.min_load_kgf);

    let max_strain = max_bending_moment.0 * input.calibration_factor + input.calibration_constant;
    let min_strain = min_bending_moment.0 * input.calibration_factor + input.calibration_constant;

    let max_stress = max_strain * props.youngs_modulus;
    let min_stress = min_strain * props.youngs_modulus;

    let mean_stress = ensure_finite((max_stress + min_stress) / 2.0, "meanStress", &LOAD_INPUTS)?;
    let amplitude_stress = ensure_finite((max_stress - min_stress) / 2.0, "amplitudeStress", &LOAD_INPUTS)?;

    let stress_ratio = checked_div(mean_stress, amplitude_stress, "meanCorrectedStress", &LOAD_INPUTS)?;
    let mean_corrected_stress = checked_div(
        amplitude_stress,
        1.0 - stress_ratio,
        "meanCorrectedStress",
        &LOAD_INPUTS,
    )?;

    // Integer exponent keeps negative bases well-defined
    let exponent = props.fatigue_constant as i32;
    let damage_per_cycle = ensure_finite(
        mean_corrected_stress.powi(exponent),
        "damagePerCycle",
        &DAMAGE_INPUTS,
    )?;

    let number_of_cycles = checked_div(
        input.target_damage * input.factor_of_safety,
        damage_per_cycle,
        NUMBER_OF_CYCLES,
        &[TARGET_DAMAGE, FACTOR_OF_SAFETY, MATERIAL],
    )?;

    Ok(FrontForkResult {
        max_bending_moment,
        min_bending_moment,
        max_strain,
        min_strain,
        max_stress,
        min_stress,
        mean_stress,
        amplitude_stress,
        mean_corrected_stress,
        damage_per_cycle,
        number_of_cycles,
    })
}

/// Registry entry point.
pub fn evaluate(values: &InputValues) -> Result<ResultValues, FormulaError> {
    let input = FrontForkInput::from_values(values)?;
    calculate(&input).map(|r| r.to_values())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_input() -> FrontForkInput {
        FrontForkInput {
            target_damage: 640_582_108_680.192,
            fork_length_mm: 545.0,
            max_load_kgf: 200.0,
            min_load_kgf: -200.0,
            calibration_factor: 0.0068,
            calibration_constant: -1.356,
            material: Material::Steel,
            factor_of_safety: 1.0,
        }
    }

    #[test]
    fn test_intermediate_steps() {
        let result = calculate(&default_input()).unwrap();

        assert_eq!(result.max_bending_moment.0, 109_000.0);
        assert_eq!(result.min_bending_moment.0, -109_000.0);
        assert!((result.max_strain - 739.844).abs() < 1e-9);
        assert!((result.min_strain - -742.556).abs() < 1e-9);
        assert!((result.max_stress - 739.844 * 0.205).abs() < 1e-9);
        assert!((result.mean_stress - -0.27798).abs() < 1e-9);
        assert!((result.amplitude_stress - 151.946).abs() < 1e-9);
    }

    #[test]
    fn test_default_steel_cycles() {
        let result = calculate(&default_input()).unwrap();

        let sigma_a = 151.946_f64;
        let sigma_m = -0.27798_f64;
        let corrected = sigma_a / (1.0 - sigma_m / sigma_a);
        let expected = 640_582_108_680.192 / corrected.powi(3);

        assert!((result.mean_corrected_stress - corrected).abs() < 1e-6);
        assert!((result.number_of_cycles - expected).abs() / expected < 1e-9);
        // Roughly 1.84e5 cycles for the default steel fork
        assert!(result.number_of_cycles > 1.8e5 && result.number_of_cycles < 1.9e5);
    }

    #[test]
    fn test_aluminum_uses_its_own_constants() {
        let mut input = default_input();
        input.material = Material::Aluminum;
        let result = calculate(&input).unwrap();

        let expected_damage = result.mean_corrected_stress.powi(5);
        assert_eq!(result.damage_per_cycle, expected_damage);
        assert!((result.max_stress - result.max_strain * 0.07).abs() < 1e-12);
    }

    #[test]
    fn test_factor_of_safety_scales_cycles() {
        let base = calculate(&default_input()).unwrap();
        let mut input = default_input();
        input.factor_of_safety = 2.0;
        let doubled = calculate(&input).unwrap();
        assert!((doubled.number_of_cycles - 2.0 * base.number_of_cycles).abs() / base.number_of_cycles < 1e-12);
    }

    #[test]
    fn test_zero_amplitude_is_division_by_zero() {
        let mut input = default_input();
        input.min_load_kgf = input.max_load_kgf;
        let err = calculate(&input).unwrap_err();
        assert!(matches!(
            err,
            FormulaError::DivisionByZero { ref quantity, .. } if quantity == "meanCorrectedStress"
        ));
    }

    #[test]
    fn test_mean_equal_to_amplitude_is_division_by_zero() {
        // Zero minimum stress makes mean == amplitude
        let mut input = default_input();
        input.min_load_kgf = 0.0;
        input.calibration_constant = 0.0;
        let err = calculate(&input).unwrap_err();
        assert!(matches!(err, FormulaError::DivisionByZero { .. }));
    }

    #[test]
    fn test_negative_corrected_stress_with_odd_exponent() {
        // Loads swapped: amplitude is negative, cube stays negative
        let mut input = default_input();
        input.max_load_kgf = -200.0;
        input.min_load_kgf = 200.0;
        let result = calculate(&input).unwrap();
        assert!(result.amplitude_stress < 0.0);
        assert!(result.damage_per_cycle < 0.0);
        assert!(result.number_of_cycles.is_finite());
    }

    #[test]
    fn test_from_values_resolves_material() {
        let values = InputValues::new()
            .with(TARGET_DAMAGE, 1.0)
            .with(FORK_LENGTH_MM, 545.0)
            .with(MAX_LOAD_KGF, 200.0)
            .with(MIN_LOAD_KGF, -200.0)
            .with(CALIBRATION_FACTOR, 0.0068)
            .with(CALIBRATION_CONSTANT, -1.356)
            .with(MATERIAL, "Aluminum")
            .with(FACTOR_OF_SAFETY, 1.0);
        let input = FrontForkInput::from_values(&values).unwrap();
        assert_eq!(input.material, Material::Aluminum);

        let bad = values.with(MATERIAL, "Unobtainium");
        assert_eq!(
            FrontForkInput::from_values(&bad).unwrap_err(),
            FormulaError::UnknownMaterial {
                name: "Unobtainium".to_string()
            }
        );
    }
}
