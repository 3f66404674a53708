//! Typed access to tool call arguments.

use serde_json::{Map, Value};

use crate::error::ChickError;

/// Name to value map handed to a tool after decoding and coercion.
///
/// Values are JSON scalars: strings, numbers (integer or float) or booleans.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolArguments {
    values: Map<String, Value>,
}

impl ToolArguments {
    pub fn new(values: Map<String, Value>) -> Self {
        Self { values }
    }

    /// Get the raw value map.
    pub fn raw(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Get a raw value by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Get a string argument by key.
    pub fn get_str(&self, key: &str) -> Result<&str, ChickError> {
        self.values
            .get(key)
            .and_then(|v| v.as_str())
            .ok_or_else(|| ChickError::InvalidArgument(format!("Missing string argument: {key}")))
    }

    /// Get an optional string argument.
    pub fn get_str_opt(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(|v| v.as_str())
    }

    /// Get an integer argument.
    pub fn get_i64(&self, key: &str) -> Result<i64, ChickError> {
        self.values
            .get(key)
            .and_then(|v| v.as_i64())
            .ok_or_else(|| ChickError::InvalidArgument(format!("Missing integer argument: {key}")))
    }

    /// Get a float argument. Integers are widened.
    pub fn get_f64(&self, key: &str) -> Result<f64, ChickError> {
        self.values
            .get(key)
            .and_then(|v| v.as_f64())
            .ok_or_else(|| ChickError::InvalidArgument(format!("Missing number argument: {key}")))
    }

    /// Get a boolean argument.
    pub fn get_bool(&self, key: &str) -> Result<bool, ChickError> {
        self.values
            .get(key)
            .and_then(|v| v.as_bool())
            .ok_or_else(|| ChickError::InvalidArgument(format!("Missing boolean argument: {key}")))
    }

    /// Deserialize the arguments into a typed struct.
    pub fn deserialize<T: serde::de::DeserializeOwned>(&self) -> Result<T, ChickError> {
        serde_json::from_value(Value::Object(self.values.clone())).map_err(|e| {
            ChickError::InvalidArgument(format!("Failed to deserialize arguments: {e}"))
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<Map<String, Value>> for ToolArguments {
    fn from(values: Map<String, Value>) -> Self {
        Self::new(values)
    }
}
