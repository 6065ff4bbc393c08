//! # Unit Types
//!
//! Lightweight newtype wrappers for the force and moment quantities that
//! appear in the rig formulas. They serialize as plain numbers.
//!
//! Rig loads are specified in kilogram-force because that is what the load
//! cells on the fixtures display; the conversion uses [`GRAVITY_M_S2`].
//!
//! ## Example
//!
//! ```rust
//! use rigspec_core::units::{KilogramsForce, Newtons};
//!
//! let load: KilogramsForce = Newtons(981.0).into();
//! assert!((load.0 - 100.0).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

/// Standard gravity used to convert newtons to kilogram-force
pub const GRAVITY_M_S2: f64 = 9.81;

// ============================================================================
// Force Units
// ============================================================================

/// Force in newtons
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Newtons(pub f64);

/// Force in kilogram-force
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KilogramsForce(pub f64);

impl From<Newtons> for KilogramsForce {
    fn from(n: Newtons) -> Self {
        KilogramsForce(n.0 / GRAVITY_M_S2)
    }
}

impl From<KilogramsForce> for Newtons {
    fn from(kgf: KilogramsForce) -> Self {
        Newtons(kgf.0 * GRAVITY_M_S2)
    }
}

// ============================================================================
// Moment Units
// ============================================================================

/// Moment in newton-metres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NewtonMetres(pub f64);

/// Moment in kilogram-force millimetres (fork length in mm times load in kgf)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KgfMillimetres(pub f64);

impl NewtonMetres {
    /// Force needed at the end of a lever arm to react this moment
    pub fn force_at_arm(self, arm_m: f64) -> Newtons {
        Newtons(self.0 / arm_m)
    }
}

// ============================================================================
// Arithmetic Implementations
// ============================================================================

macro_rules! impl_arithmetic {
    ($type:ty) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl $type {
            /// Get the raw f64 value
            pub fn value(self) -> f64 {
                self.0
            }
        }
    };
}

impl_arithmetic!(Newtons);
impl_arithmetic!(KilogramsForce);
impl_arithmetic!(NewtonMetres);
impl_arithmetic!(KgfMillimetres);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newtons_to_kgf() {
        let kgf: KilogramsForce = Newtons(98.1).into();
        assert!((kgf.0 - 10.0).abs() < 1e-12);

        let back: Newtons = kgf.into();
        assert!((back.0 - 98.1).abs() < 1e-12);
    }

    #[test]
    fn test_force_at_arm() {
        let torque = NewtonMetres(735.0);
        assert_eq!(torque.force_at_arm(0.5).0, 1470.0);
    }

    #[test]
    fn test_arithmetic() {
        let a = KgfMillimetres(10.0);
        let b = KgfMillimetres(4.0);
        assert_eq!((a + b).0, 14.0);
        assert_eq!((a - b).0, 6.0);
        assert_eq!((a * 2.0).0, 20.0);
        assert_eq!((a / 2.0).0, 5.0);
    }

    #[test]
    fn test_serialization() {
        let n = Newtons(12.5);
        let json = serde_json::to_string(&n).unwrap();
        assert_eq!(json, "12.5");
    }
}
