//! Tool parameter schema types.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Declared type of a tool parameter.
///
/// Directive parameters always arrive as text; the declared type decides how
/// that text is coerced before the tool sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ParameterType {
    String,
    Number,
    Integer,
    Boolean,
    /// Any other declared type; values are passed through as text.
    #[strum(default)]
    #[serde(untagged)]
    Other(std::string::String),
}

/// One entry of a tool's parameter schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: ParameterType,
    pub description: String,
    #[serde(default)]
    pub required: bool,
}

/// Ordered parameter schema of a tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolParameters {
    params: Vec<ToolParameter>,
}

impl ToolParameters {
    /// A schema with no parameters.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Start building a schema.
    pub fn builder() -> ParameterBuilder {
        ParameterBuilder { params: Vec::new() }
    }

    /// Parameters in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &ToolParameter> {
        self.params.iter()
    }

    /// Look up a parameter by name.
    pub fn get(&self, name: &str) -> Option<&ToolParameter> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Declared type of the named parameter, if declared.
    pub fn type_of(&self, name: &str) -> Option<&ParameterType> {
        self.get(name).map(|p| &p.param_type)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Add `other`'s parameters not yet declared here, as optional.
    pub fn merge_optional(&mut self, other: &ToolParameters) {
        for param in other.iter() {
            if self.get(&param.name).is_none() {
                self.params.push(ToolParameter {
                    required: false,
                    ..param.clone()
                });
            }
        }
    }
}

impl From<Vec<ToolParameter>> for ToolParameters {
    fn from(params: Vec<ToolParameter>) -> Self {
        Self { params }
    }
}

/// Builder for constructing tool parameter schemas.
pub struct ParameterBuilder {
    params: Vec<ToolParameter>,
}

impl ParameterBuilder {
    fn push(
        mut self,
        name: impl Into<String>,
        param_type: ParameterType,
        description: impl Into<String>,
        required: bool,
    ) -> Self {
        self.params.push(ToolParameter {
            name: name.into(),
            param_type,
            description: description.into(),
            required,
        });
        self
    }

    /// Add a string parameter.
    pub fn string(self, name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        self.push(name, ParameterType::String, description, required)
    }

    /// Add a floating point parameter.
    pub fn number(self, name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        self.push(name, ParameterType::Number, description, required)
    }

    /// Add an integer parameter.
    pub fn integer(self, name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        self.push(name, ParameterType::Integer, description, required)
    }

    /// Add a boolean parameter.
    pub fn boolean(self, name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        self.push(name, ParameterType::Boolean, description, required)
    }

    pub fn build(self) -> ToolParameters {
        ToolParameters {
            params: self.params,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_keeps_declaration_order() {
        let params = ToolParameters::builder()
            .integer("a", "first", true)
            .number("b", "second", false)
            .boolean("c", "third", false)
            .build();

        let names: Vec<_> = params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert_eq!(params.type_of("b"), Some(&ParameterType::Number));
        assert_eq!(params.type_of("missing"), None);
    }

    #[test]
    fn unknown_type_names_parse_as_other() {
        assert_eq!("integer".parse::<ParameterType>().unwrap(), ParameterType::Integer);
        assert_eq!(
            "array".parse::<ParameterType>().unwrap(),
            ParameterType::Other("array".into())
        );
    }
}
