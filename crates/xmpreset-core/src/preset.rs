//! Preset document model.
//!
//! A preset is an ordered list of filter descriptors plus some descriptive
//! info. The list order is the execution order of the downstream pipeline,
//! and parameter order within a filter is fixed per filter kind, so both are
//! kept as vectors rather than maps.

use serde::{Deserialize, Serialize};

/// How the downstream pipeline interprets a parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamType {
    #[serde(rename = "CIAttributeTypeScalar")]
    Scalar,
    #[serde(rename = "CIAttributeTypeOffset")]
    Offset,
    #[serde(rename = "CIAttributeTypePosition3")]
    Position3,
    #[serde(rename = "CIAttributeTypeVector")]
    Vector,
}

/// A parameter value: a number or a fixed/arbitrary length vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Scalar(f64),
    Offset([f64; 2]),
    Position3([f64; 3]),
    Vector(Vec<f64>),
}

impl ParamValue {
    /// The type tag matching this value's shape.
    pub fn param_type(&self) -> ParamType {
        match self {
            ParamValue::Scalar(_) => ParamType::Scalar,
            ParamValue::Offset(_) => ParamType::Offset,
            ParamValue::Position3(_) => ParamType::Position3,
            ParamValue::Vector(_) => ParamType::Vector,
        }
    }

    /// The scalar value, if this is a scalar.
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            ParamValue::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    /// All components as a slice.
    #[cfg(test)]
    pub(crate) fn components(&self) -> &[f64] {
        match self {
            ParamValue::Scalar(v) => std::slice::from_ref(v),
            ParamValue::Offset(v) => v,
            ParamValue::Position3(v) => v,
            ParamValue::Vector(v) => v,
        }
    }
}

/// A single named filter parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub key: String,
    pub val: ParamValue,
    #[serde(rename = "type")]
    pub param_type: ParamType,
}

impl Parameter {
    /// Create a parameter whose type tag follows the value's shape.
    pub fn new(key: impl Into<String>, val: ParamValue) -> Self {
        let param_type = val.param_type();
        Self {
            key: key.into(),
            val,
            param_type,
        }
    }
}

/// One filter invocation with its ordered parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterDescriptor {
    pub key: String,
    pub parameters: Vec<Parameter>,
}

impl FilterDescriptor {
    /// Create a filter with no parameters
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            parameters: Vec::new(),
        }
    }

    pub fn scalar(mut self, key: &str, value: f64) -> Self {
        self.parameters
            .push(Parameter::new(key, ParamValue::Scalar(value)));
        self
    }

    pub fn offset(mut self, key: &str, value: [f64; 2]) -> Self {
        self.parameters
            .push(Parameter::new(key, ParamValue::Offset(value)));
        self
    }

    pub fn position3(mut self, key: &str, value: [f64; 3]) -> Self {
        self.parameters
            .push(Parameter::new(key, ParamValue::Position3(value)));
        self
    }

    pub fn vector(mut self, key: &str, value: Vec<f64>) -> Self {
        self.parameters
            .push(Parameter::new(key, ParamValue::Vector(value)));
        self
    }

    /// Look up a parameter value by key.
    pub fn param(&self, key: &str) -> Option<&ParamValue> {
        self.parameters.iter().find(|p| p.key == key).map(|p| &p.val)
    }
}

/// Descriptive preset information.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PresetInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

/// The converted preset document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    /// Output identifier
    pub key: String,
    pub info: PresetInfo,
    /// Filters in execution order
    pub filters: Vec<FilterDescriptor>,
}

impl Preset {
    /// Create an empty preset
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    /// Find the first filter with the given key.
    pub fn filter(&self, key: &str) -> Option<&FilterDescriptor> {
        self.filters.iter().find(|f| f.key == key)
    }

    /// Filter keys in execution order.
    pub fn filter_keys(&self) -> Vec<&str> {
        self.filters.iter().map(|f| f.key.as_str()).collect()
    }

    /// Serialize to JSON, pretty-printed with 2-space indent or compact.
    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}
