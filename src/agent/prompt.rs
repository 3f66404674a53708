//! System prompt assembly.

use crate::tools::registry::{ToolRegistry, NO_TOOLS_AVAILABLE};

/// System prompt used when none is configured.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant.";

const TOOL_USAGE_TEMPLATE: &str = "\
{basic_prompt}

## Available tools
You can use the following tools to help answer the question:
{tools_description}

## Tool call format
When you need a tool, write a directive in exactly this form:
`[TOOL_CALL:{tool_name}:{parameters}]`

### Parameters
1. **Several parameters**: `key=value` pairs separated by commas
   Example: `[TOOL_CALL:calculator_multiply:a=12,b=8]`
   Example: `[TOOL_CALL:filesystem_read_file:path=README.md]`
2. **One parameter**: a single `key=value`
   Example: `[TOOL_CALL:search:query=rust programming]`

### Rules
- Parameter names must match the tool definition exactly
- Write numbers bare, without quotes: `a=12`, not `a=\"12\"`
- Write strings such as file paths directly: `path=README.md`
- Values cannot contain `,`, `=` or `]`; there is no quoting or escaping
- Tool results are inserted into the conversation; continue your answer from them
";

/// The plain system prompt, falling back to [`DEFAULT_SYSTEM_PROMPT`].
pub fn base_prompt(system_prompt: Option<&str>) -> &str {
    system_prompt.unwrap_or(DEFAULT_SYSTEM_PROMPT)
}

/// Build the system turn for a tool-enabled call.
///
/// Without registered tools this is the plain prompt; otherwise the usage
/// instructions and the current catalog are embedded. Rebuilt on every call
/// because registrations can change between calls.
pub fn build_system_prompt(system_prompt: Option<&str>, registry: &ToolRegistry) -> String {
    let basic_prompt = base_prompt(system_prompt);
    let tools_description = registry.describe();
    if tools_description.is_empty() || tools_description == NO_TOOLS_AVAILABLE {
        return basic_prompt.to_string();
    }

    fill_template(basic_prompt, &tools_description)
}

/// Fill both placeholders in one pass. Inserted text is never rescanned.
fn fill_template(basic_prompt: &str, tools_description: &str) -> String {
    const BASIC: &str = "{basic_prompt}";
    const TOOLS: &str = "{tools_description}";

    let mut out = String::with_capacity(
        TOOL_USAGE_TEMPLATE.len() + basic_prompt.len() + tools_description.len(),
    );
    let mut rest = TOOL_USAGE_TEMPLATE;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        rest = &rest[start..];
        let (value, consumed) = if rest.starts_with(BASIC) {
            (basic_prompt, BASIC.len())
        } else if rest.starts_with(TOOLS) {
            (tools_description, TOOLS.len())
        } else {
            ("{", 1)
        };
        out.push_str(value);
        rest = &rest[consumed..];
    }
    out.push_str(rest);
    out
}

/// Synthetic user turn carrying one round of tool results.
pub fn tool_results_turn<I, S>(results: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let joined = results
        .into_iter()
        .map(|r| r.as_ref().to_string())
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("Tool results:\n{joined}\n\nPlease give a complete answer based on these results.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{FnTool, ToolParameters};
    use std::sync::Arc;

    #[test]
    fn no_tools_uses_plain_prompt() {
        let registry = ToolRegistry::new();
        assert_eq!(build_system_prompt(Some("Be terse."), &registry), "Be terse.");
        assert_eq!(build_system_prompt(None, &registry), DEFAULT_SYSTEM_PROMPT);
    }

    #[test]
    fn tools_embed_catalog_and_syntax() {
        let mut registry = ToolRegistry::new();
        registry.register(
            Arc::new(FnTool::new("ping", "Replies pong", ToolParameters::empty(), |_| async {
                Ok("pong".to_string())
            })),
            true,
        );

        let prompt = build_system_prompt(Some("Be terse."), &registry);
        assert!(prompt.starts_with("Be terse.\n"));
        assert!(prompt.contains("- ping: Replies pong"));
        assert!(prompt.contains("[TOOL_CALL:{tool_name}:{parameters}]"));
        assert!(!prompt.contains("{tools_description}"));
    }

    #[test]
    fn placeholders_in_the_system_prompt_stay_literal() {
        let mut registry = ToolRegistry::new();
        registry.register(
            Arc::new(FnTool::new("ping", "Replies pong", ToolParameters::empty(), |_| async {
                Ok("pong".to_string())
            })),
            true,
        );

        let prompt = build_system_prompt(Some("Ignore {tools_description} and {basic_prompt}"), &registry);
        assert_eq!(
            prompt.lines().next(),
            Some("Ignore {tools_description} and {basic_prompt}")
        );
        assert_eq!(prompt.matches("- ping: Replies pong").count(), 1);
    }

    #[test]
    fn results_are_separated_by_blank_lines() {
        let turn = tool_results_turn(["first", "second"]);
        assert_eq!(
            turn,
            "Tool results:\nfirst\n\nsecond\n\nPlease give a complete answer based on these results."
        );
    }
}
