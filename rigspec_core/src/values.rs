//! # Input and Result Values
//!
//! The label-keyed mappings that flow in and out of the dispatcher.
//! Both serialize as flat JSON objects:
//!
//! ```json
//! { "vehicleMass": 250.0, "material": "Steel" }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single concrete input value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputValue {
    /// Real number for numeric fields
    Number(f64),
    /// Catalog key for choice fields
    Text(String),
}

impl InputValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            InputValue::Number(n) => Some(*n),
            InputValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            InputValue::Number(_) => None,
            InputValue::Text(s) => Some(s),
        }
    }
}

impl std::fmt::Display for InputValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputValue::Number(n) => write!(f, "{}", n),
            InputValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<f64> for InputValue {
    fn from(n: f64) -> Self {
        InputValue::Number(n)
    }
}

impl From<&str> for InputValue {
    fn from(s: &str) -> Self {
        InputValue::Text(s.to_string())
    }
}

impl From<String> for InputValue {
    fn from(s: String) -> Self {
        InputValue::Text(s)
    }
}

/// Label → value mapping supplied for one evaluation.
///
/// ## Example
///
/// ```rust
/// use rigspec_core::values::InputValues;
///
/// let inputs = InputValues::new()
///     .with("vehicleMass", 250.0)
///     .with("material", "Steel");
/// assert_eq!(inputs.number("vehicleMass"), Some(250.0));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputValues(BTreeMap<String, InputValue>);

impl InputValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, label: impl Into<String>, value: impl Into<InputValue>) -> Self {
        self.insert(label, value);
        self
    }

    /// Insert or replace a value, returning the previous one
    pub fn insert(&mut self, label: impl Into<String>, value: impl Into<InputValue>) -> Option<InputValue> {
        self.0.insert(label.into(), value.into())
    }

    pub fn get(&self, label: &str) -> Option<&InputValue> {
        self.0.get(label)
    }

    pub fn number(&self, label: &str) -> Option<f64> {
        self.get(label).and_then(InputValue::as_number)
    }

    pub fn text(&self, label: &str) -> Option<&str> {
        self.get(label).and_then(InputValue::as_text)
    }

    pub fn remove(&mut self, label: &str) -> Option<InputValue> {
        self.0.remove(label)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.0.contains_key(label)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &InputValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Overlay `other` on top of `self`; values in `other` win.
    pub fn merged_with(mut self, other: &InputValues) -> Self {
        for (label, value) in other.iter() {
            self.0.insert(label.to_string(), value.clone());
        }
        self
    }
}

impl FromIterator<(String, InputValue)> for InputValues {
    fn from_iter<T: IntoIterator<Item = (String, InputValue)>>(iter: T) -> Self {
        InputValues(iter.into_iter().collect())
    }
}

/// Output label → value mapping returned by a formula. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultValues(BTreeMap<String, f64>);

impl ResultValues {
    pub fn get(&self, label: &str) -> Option<f64> {
        self.0.get(label).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<const N: usize> From<[(&str, f64); N]> for ResultValues {
    fn from(pairs: [(&str, f64); N]) -> Self {
        ResultValues(pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_values_json_shape() {
        let inputs = InputValues::new()
            .with("vehicleMass", 250.0)
            .with("material", "Aluminum");
        let json = serde_json::to_string(&inputs).unwrap();
        assert_eq!(json, r#"{"material":"Aluminum","vehicleMass":250.0}"#);

        let parsed: InputValues = serde_json::from_str(r#"{"a": 1, "b": "Steel"}"#).unwrap();
        assert_eq!(parsed.number("a"), Some(1.0));
        assert_eq!(parsed.text("b"), Some("Steel"));
        assert_eq!(parsed.number("b"), None);
    }

    #[test]
    fn test_merge_overrides() {
        let base = InputValues::new().with("a", 1.0).with("b", 2.0);
        let overrides = InputValues::new().with("b", 5.0);
        let merged = base.merged_with(&overrides);
        assert_eq!(merged.number("a"), Some(1.0));
        assert_eq!(merged.number("b"), Some(5.0));
    }

    #[test]
    fn test_result_values_from_pairs() {
        let results = ResultValues::from([("requiredCycles", 1000.0), ("requiredLoadKg", 10.0)]);
        assert_eq!(results.get("requiredCycles"), Some(1000.0));
        assert_eq!(results.len(), 2);
        assert_eq!(results.labels().collect::<Vec<_>>(), vec!["requiredCycles", "requiredLoadKg"]);
    }
}
