//! String-keyed parameter maps.
//!
//! Device and discharge settings travel as flat key/value maps, the same way
//! they appear under a section of a study file:
//!
//! ```yaml
//! type: SeriesRC
//! series_resistance: 0.1
//! capacitance: 2.5
//! ```
//!
//! Values are numbers, integers or strings. Typed getters turn missing or
//! mistyped keys into configuration errors.

use crate::error::{CapError, CapResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Integer(i64),
    Number(f64),
    Text(String),
}

impl ParamValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Integer(i) => Some(*i as f64),
            ParamValue::Number(x) => Some(*x),
            ParamValue::Text(_) => None,
        }
    }

    pub fn as_usize(&self) -> Option<usize> {
        match self {
            ParamValue::Integer(i) => usize::try_from(*i).ok(),
            ParamValue::Number(x) if *x >= 0.0 && x.fract() == 0.0 && x.is_finite() => {
                Some(*x as usize)
            }
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Integer(i) => write!(f, "{i}"),
            ParamValue::Number(x) => write!(f, "{x}"),
            ParamValue::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Number(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Integer(i64::from(v))
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Integer(v)
    }
}

impl From<usize> for ParamValue {
    fn from(v: usize) -> Self {
        ParamValue::Integer(v as i64)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Text(v)
    }
}

/// Flat, ordered map of named parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterMap {
    entries: BTreeMap<String, ParamValue>,
}

impl ParameterMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.put(key, value);
        self
    }

    pub fn put(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.entries.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn require(&self, key: &str) -> CapResult<&ParamValue> {
        self.entries
            .get(key)
            .ok_or_else(|| CapError::MissingParameter {
                key: key.to_string(),
            })
    }

    pub fn get_f64(&self, key: &str) -> CapResult<f64> {
        self.require(key)?
            .as_f64()
            .ok_or_else(|| CapError::WrongParameterType {
                key: key.to_string(),
                expected: "number",
            })
    }

    pub fn get_f64_or(&self, key: &str, default: f64) -> CapResult<f64> {
        if self.contains_key(key) {
            self.get_f64(key)
        } else {
            Ok(default)
        }
    }

    pub fn get_usize(&self, key: &str) -> CapResult<usize> {
        self.require(key)?
            .as_usize()
            .ok_or_else(|| CapError::WrongParameterType {
                key: key.to_string(),
                expected: "non-negative integer",
            })
    }

    pub fn get_usize_or(&self, key: &str, default: usize) -> CapResult<usize> {
        if self.contains_key(key) {
            self.get_usize(key)
        } else {
            Ok(default)
        }
    }

    pub fn get_str(&self, key: &str) -> CapResult<&str> {
        self.require(key)?
            .as_str()
            .ok_or_else(|| CapError::WrongParameterType {
                key: key.to_string(),
                expected: "string",
            })
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for ParameterMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = ParameterMap::new();
        for (k, v) in iter {
            map.put(k, v);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_getters() {
        let params = ParameterMap::new()
            .with("type", "SeriesRC")
            .with("capacitance", 2.5)
            .with("steps", 10usize);

        assert_eq!(params.get_str("type").unwrap(), "SeriesRC");
        assert_eq!(params.get_f64("capacitance").unwrap(), 2.5);
        assert_eq!(params.get_usize("steps").unwrap(), 10);
        // integers widen to numbers
        assert_eq!(params.get_f64("steps").unwrap(), 10.0);
    }

    #[test]
    fn missing_and_mistyped_keys() {
        let params = ParameterMap::new().with("type", "SeriesRC");
        assert_eq!(
            params.get_f64("capacitance").unwrap_err(),
            CapError::MissingParameter {
                key: "capacitance".to_string()
            }
        );
        assert!(matches!(
            params.get_f64("type").unwrap_err(),
            CapError::WrongParameterType { .. }
        ));
        assert_eq!(params.get_f64_or("capacitance", 1.0).unwrap(), 1.0);
    }

    #[test]
    fn fractional_number_is_not_a_count() {
        let params = ParameterMap::new().with("steps", 2.5);
        assert!(params.get_usize("steps").is_err());
        let params = ParameterMap::new().with("steps", 4.0);
        assert_eq!(params.get_usize("steps").unwrap(), 4);
    }

    #[test]
    fn yaml_section_deserializes() {
        let yaml = "type: ParallelRC\nseries_resistance: 0.05\ncapacitance: 3\n";
        let params: ParameterMap = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(params.get_str("type").unwrap(), "ParallelRC");
        assert_eq!(params.get_f64("series_resistance").unwrap(), 0.05);
        assert_eq!(params.get_f64("capacitance").unwrap(), 3.0);
    }
}
