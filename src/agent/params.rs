//! Directive parameter decoding and type coercion.
//!
//! The grammar is `key=value` pairs separated by commas, with no quoting or
//! escaping: a value can never contain `,` or `=` (and, because the directive
//! ends at the first `]`, never `]` either).

use serde_json::{Map, Number, Value};
use thiserror::Error;

use crate::tools::types::{ParameterType, ToolParameters};

/// Case-insensitive values that coerce to `true` for boolean parameters.
pub const TRUTHY_VALUES: [&str; 4] = ["true", "1", "yes", "是"];

/// Decoded `key -> text` pairs, in the order they appeared.
pub type RawParameters = Vec<(String, String)>;

/// A parameter segment that could not be split into `key=value`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed parameter '{segment}': expected key=value")]
pub struct DecodeError {
    pub segment: String,
}

/// A value that kept its text form because it did not parse as its declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoercionIssue {
    pub parameter: String,
    pub expected: ParameterType,
    pub value: String,
}

impl std::fmt::Display for CoercionIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "parameter '{}' expected {} but got '{}'",
            self.parameter, self.expected, self.value
        )
    }
}

/// Split a raw directive parameter string into trimmed `key=value` pairs.
///
/// A string without `=` decodes to no parameters. Segments left empty by stray
/// commas are skipped; a non-empty segment without `=` is an error.
pub fn decode_parameters(raw: &str) -> Result<RawParameters, DecodeError> {
    if !raw.contains('=') {
        return Ok(Vec::new());
    }

    raw.split(',')
        .filter(|segment| !segment.trim().is_empty())
        .map(|segment| {
            segment
                .split_once('=')
                .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
                .ok_or_else(|| DecodeError {
                    segment: segment.trim().to_string(),
                })
        })
        .collect()
}

/// Convert decoded text values according to the tool's declared schema.
///
/// Keys without a declaration, and declarations of any other type, stay text.
/// A value that fails to convert also stays text and is reported as a
/// [`CoercionIssue`]; coercion itself never fails.
pub fn coerce_parameters(
    schema: &ToolParameters,
    raw: RawParameters,
) -> (Map<String, Value>, Vec<CoercionIssue>) {
    let mut values = Map::new();
    let mut issues = Vec::new();

    for (key, text) in raw {
        let value = match schema.type_of(&key) {
            Some(ty) => match coerce_value(ty, &text) {
                Some(value) => value,
                None => {
                    issues.push(CoercionIssue {
                        parameter: key.clone(),
                        expected: ty.clone(),
                        value: text.clone(),
                    });
                    Value::String(text)
                }
            },
            None => Value::String(text),
        };
        values.insert(key, value);
    }

    (values, issues)
}

/// Non-finite numbers have no JSON form and stay text.
fn coerce_value(ty: &ParameterType, text: &str) -> Option<Value> {
    match ty {
        ParameterType::Number => text
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number),
        ParameterType::Integer => text.parse::<i64>().ok().map(Value::from),
        ParameterType::Boolean => Some(Value::Bool(is_truthy(text))),
        ParameterType::String | ParameterType::Other(_) => Some(Value::String(text.to_string())),
    }
}

/// Boolean coercion: membership in [`TRUTHY_VALUES`], ignoring case.
pub fn is_truthy(text: &str) -> bool {
    let lowered = text.to_lowercase();
    TRUTHY_VALUES.contains(&lowered.as_str())
}
