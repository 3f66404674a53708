//! Tool-call execution with typed outcomes.

use std::fmt;

use thiserror::Error;
use tracing::{debug, warn};

use super::directive::ToolCall;
use super::params::{coerce_parameters, decode_parameters, CoercionIssue, DecodeError};
use crate::error::ChickError;
use crate::tools::{ToolArguments, ToolRegistry};

/// Why a tool call produced no output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolCallError {
    #[error("tool {0} not found")]
    NotFound(String),

    #[error("tool {tool} failed: {source}")]
    MalformedParameters {
        tool: String,
        #[source]
        source: DecodeError,
    },

    #[error("tool {tool} failed: {message}")]
    Execution { tool: String, message: String },
}

/// Outcome of executing one directive.
#[derive(Debug, Clone)]
pub struct ToolExecution {
    pub call: ToolCall,
    /// Arguments as handed to the tool (empty when the call never reached it).
    pub arguments: ToolArguments,
    /// Values that kept their text form despite a declared type.
    pub coercion_issues: Vec<CoercionIssue>,
    pub outcome: Result<String, ToolCallError>,
}

impl ToolExecution {
    pub fn tool_name(&self) -> &str {
        &self.call.tool_name
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Conversation text fed back to the model.
impl fmt::Display for ToolExecution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Ok(output) => write!(f, "Tool {} result:\n{}", self.call.tool_name, output),
            Err(err) => write!(f, "Error: {err}"),
        }
    }
}

/// Decode, coerce and run one directive against the registry.
///
/// Never fails: lookup, decoding and execution failures are all captured in
/// the returned [`ToolExecution`].
pub async fn execute_tool_call(registry: &ToolRegistry, call: &ToolCall) -> ToolExecution {
    let name = call.tool_name.as_str();
    let failed = |outcome: ToolCallError| ToolExecution {
        call: call.clone(),
        arguments: ToolArguments::default(),
        coercion_issues: Vec::new(),
        outcome: Err(outcome),
    };

    let Some(tool) = registry.get(name) else {
        warn!(tool = name, "tool not found");
        return failed(ToolCallError::NotFound(name.to_string()));
    };

    let raw = match decode_parameters(&call.raw_parameters) {
        Ok(raw) => raw,
        Err(source) => {
            warn!(tool = name, error = %source, "malformed tool parameters");
            return failed(ToolCallError::MalformedParameters {
                tool: name.to_string(),
                source,
            });
        }
    };

    let (values, coercion_issues) = coerce_parameters(tool.parameters(), raw);
    for issue in &coercion_issues {
        warn!(tool = name, %issue, "parameter kept as text");
    }
    let arguments = ToolArguments::new(values);

    debug!(tool = name, args = arguments.len(), "executing tool");
    let outcome = match tool.execute(&arguments).await {
        Ok(output) => Ok(output),
        Err(e) => {
            warn!(tool = name, error = %e, "tool execution failed");
            let message = match e {
                ChickError::ToolExecution { message, .. } => message,
                other => other.to_string(),
            };
            Err(ToolCallError::Execution {
                tool: name.to_string(),
                message,
            })
        }
    };

    ToolExecution {
        call: call.clone(),
        arguments,
        coercion_issues,
        outcome,
    }
}
