//! # Materials Catalog
//!
//! Fatigue-relevant material properties. The catalog is fixed at compile
//! time and never mutated; lookups by name fail explicitly with
//! [`CalcError::MaterialNotFound`].
//!
//! ## Example
//!
//! ```rust
//! use rigspec_core::materials::Material;
//!
//! let steel = Material::from_name("steel").unwrap();
//! let props = steel.properties();
//! assert_eq!(props.fatigue_constant, 3);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Material properties used by the stress-life formulas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialProperties {
    /// Integer exponent of the damage power law
    pub fatigue_constant: u32,
    /// Young's modulus, GPa-scaled (strain in microstrain gives stress in MPa)
    pub youngs_modulus: f64,
}

/// Materials available for fatigue tests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Material {
    Steel,
    Aluminum,
}

impl Material {
    /// All materials in catalog order (used for choice fields)
    pub const ALL: [Material; 2] = [Material::Steel, Material::Aluminum];

    /// Catalog key
    pub fn name(&self) -> &'static str {
        match self {
            Material::Steel => "Steel",
            Material::Aluminum => "Aluminum",
        }
    }

    pub fn properties(&self) -> MaterialProperties {
        match self {
            Material::Steel => MaterialProperties {
                fatigue_constant: 3,
                youngs_modulus: 0.205,
            },
            Material::Aluminum => MaterialProperties {
                fatigue_constant: 5,
                youngs_modulus: 0.07,
            },
        }
    }

    /// Look up a material by catalog key, ignoring case and surrounding whitespace.
    pub fn from_name(name: &str) -> CalcResult<Self> {
        match name.trim().to_lowercase().as_str() {
            "steel" => Ok(Material::Steel),
            "aluminum" => Ok(Material::Aluminum),
            _ => Err(CalcError::material_not_found(name)),
        }
    }

    /// Catalog keys in order, as offered to choice fields
    pub fn names() -> Vec<String> {
        Material::ALL.iter().map(|m| m.name().to_string()).collect()
    }
}

impl std::fmt::Display for Material {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_values() {
        assert_eq!(Material::Steel.properties().fatigue_constant, 3);
        assert_eq!(Material::Steel.properties().youngs_modulus, 0.205);
        assert_eq!(Material::Aluminum.properties().fatigue_constant, 5);
        assert_eq!(Material::Aluminum.properties().youngs_modulus, 0.07);
    }

    #[test]
    fn test_material_parsing() {
        assert_eq!(Material::from_name("Steel").unwrap(), Material::Steel);
        assert_eq!(Material::from_name(" ALUMINUM ").unwrap(), Material::Aluminum);
        // Only catalog keys, matching what choice validation accepts
        assert!(Material::from_name("aluminium").is_err());
    }

    #[test]
    fn test_unknown_material() {
        let err = Material::from_name("Titanium").unwrap_err();
        assert_eq!(err.error_code(), "MATERIAL_NOT_FOUND");
    }

    #[test]
    fn test_names_match_catalog_order() {
        assert_eq!(Material::names(), vec!["Steel".to_string(), "Aluminum".to_string()]);
    }
}
