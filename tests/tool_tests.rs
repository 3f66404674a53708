//! Tests for the tool system and the built-in tools.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;

use chick::agent::{execute_tool_call, parse_tool_calls};
use chick::tools::builtin::{all_tools, calculator_toolkit, filesystem_toolkit};
use chick::tools::registry::NO_TOOLS_AVAILABLE;
use chick::tools::*;

fn builtin_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    for tool in all_tools() {
        registry.register(tool, true);
    }
    registry
}

async fn run(registry: &ToolRegistry, directive: &str) -> String {
    let call = parse_tool_calls(directive).remove(0);
    execute_tool_call(registry, &call).await.to_string()
}

#[test]
fn builtins_expand_into_prefixed_tools() {
    let registry = builtin_registry();
    assert_eq!(
        registry.names(),
        [
            "calculator_add",
            "calculator_subtract",
            "calculator_multiply",
            "calculator_divide",
            "filesystem_read_file",
            "filesystem_list_directory",
            "current_time",
        ]
    );
}

#[test]
fn unexpanded_toolkit_registers_as_one_tool() {
    let mut registry = ToolRegistry::new();
    registry.register(calculator_toolkit(), false);
    assert_eq!(registry.names(), ["calculator"]);
    assert!(registry.describe().contains("- calculator: Basic arithmetic on two numbers"));
    assert!(registry.describe().contains("  - action (string, required)"));
}

#[test]
fn empty_registry_describes_sentinel() {
    assert_eq!(ToolRegistry::new().describe(), NO_TOOLS_AVAILABLE);
}

#[test]
fn catalog_lists_parameters() {
    let description = builtin_registry().describe();
    assert!(description.contains("- calculator_add: Add two numbers\n  - a (number, required): Left operand"));
    assert!(description.contains("  - utc (boolean, optional): Report UTC instead of local time"));
}

#[test]
fn schema_round_trips_declared_types() {
    let params: ToolParameters = serde_json::from_value(json!({
        "params": [
            {"name": "q", "type": "string", "description": "query", "required": true},
            {"name": "tags", "type": "array", "description": "labels"}
        ]
    }))
    .unwrap();
    assert_eq!(params.type_of("q"), Some(&ParameterType::String));
    assert_eq!(params.type_of("tags"), Some(&ParameterType::Other("array".into())));
    assert!(!params.get("tags").unwrap().required);
}

#[tokio::test]
async fn calculator_through_directives() {
    let registry = builtin_registry();
    assert_eq!(
        run(&registry, "[TOOL_CALL:calculator_multiply:a=12,b=8]").await,
        "Tool calculator_multiply result:\n96"
    );
    assert_eq!(
        run(&registry, "[TOOL_CALL:calculator_divide:a=7,b=2]").await,
        "Tool calculator_divide result:\n3.5"
    );
    assert_eq!(
        run(&registry, "[TOOL_CALL:calculator_subtract: a = 1 , b = 4 ]").await,
        "Tool calculator_subtract result:\n-3"
    );
}

#[tokio::test]
async fn unexpanded_toolkit_dispatches_on_action() {
    let mut registry = ToolRegistry::new();
    registry.register(calculator_toolkit(), false);
    assert_eq!(
        run(&registry, "[TOOL_CALL:calculator:action=add,a=2,b=2]").await,
        "Tool calculator result:\n4"
    );
    assert!(run(&registry, "[TOOL_CALL:calculator:action=pow,a=2,b=2]")
        .await
        .contains("unknown action 'pow'"));
}

#[tokio::test]
async fn filesystem_tools_read_and_list() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("notes.txt"), "hello chick").unwrap();
    std::fs::create_dir(dir.path().join("sub")).unwrap();

    let mut registry = ToolRegistry::new();
    registry.register(filesystem_toolkit(), true);

    let file = dir.path().join("notes.txt");
    let read = run(
        &registry,
        &format!("[TOOL_CALL:filesystem_read_file:path={}]", file.display()),
    )
    .await;
    assert_eq!(read, "Tool filesystem_read_file result:\nhello chick");

    let listing = run(
        &registry,
        &format!("[TOOL_CALL:filesystem_list_directory:path={}]", dir.path().display()),
    )
    .await;
    assert_eq!(listing, "Tool filesystem_list_directory result:\nnotes.txt\nsub/");
}

#[tokio::test]
async fn missing_file_is_reported_as_failure() {
    let registry = builtin_registry();
    let out = run(&registry, "[TOOL_CALL:filesystem_read_file:path=/definitely/not/here.txt]").await;
    assert!(out.starts_with("Error: tool filesystem_read_file failed: /definitely/not/here.txt"));
}

#[tokio::test]
async fn custom_fn_tool_receives_coerced_booleans() {
    let echo = Arc::new(FnTool::new(
        "echo_flag",
        "Echo a flag",
        ToolParameters::builder().boolean("on", "Flag", true).build(),
        |args| async move { Ok(args.get_bool("on")?.to_string()) },
    ));
    let mut registry = ToolRegistry::new();
    registry.register(echo, true);

    assert_eq!(run(&registry, "[TOOL_CALL:echo_flag:on=是]").await, "Tool echo_flag result:\ntrue");
    assert_eq!(run(&registry, "[TOOL_CALL:echo_flag:on=false]").await, "Tool echo_flag result:\nfalse");
    assert_eq!(run(&registry, "[TOOL_CALL:echo_flag:on=maybe]").await, "Tool echo_flag result:\nfalse");
}

#[test]
fn tool_arguments_accessors() {
    let args = ToolArguments::from(json!({"name": "Alice", "age": 30}).as_object().unwrap().clone());
    assert_eq!(args.get_str("name").unwrap(), "Alice");
    assert_eq!(args.get_i64("age").unwrap(), 30);
    assert!(args.get_str("missing").is_err());
}
