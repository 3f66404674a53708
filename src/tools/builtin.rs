//! Built-in tools for the chat binary.
//!
//! - `calculator` toolkit: `calculator_add`, `calculator_subtract`,
//!   `calculator_multiply`, `calculator_divide`
//! - `filesystem` toolkit: `filesystem_read_file`, `filesystem_list_directory`
//! - `current_time`
//!
//! # Usage
//!
//! ```rust
//! use chick::tools::builtin::all_tools;
//!
//! let tools = all_tools();
//! assert_eq!(tools.len(), 3);
//! ```

use std::sync::Arc;

use crate::error::ChickError;
use crate::tools::tool::{FnTool, Tool, Toolkit};
use crate::tools::types::ToolParameters;

const READ_FILE_MAX_BYTES: usize = 65_536;
const LIST_MAX_ENTRIES: usize = 500;

fn truncate_utf8(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }

    let mut cutoff = max_bytes;
    while cutoff > 0 && !s.is_char_boundary(cutoff) {
        cutoff -= 1;
    }
    &s[..cutoff]
}

/// Format a float without a trailing `.0` for whole numbers.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

fn binary_operands() -> ToolParameters {
    ToolParameters::builder()
        .number("a", "Left operand", true)
        .number("b", "Right operand", true)
        .build()
}

fn binary_op(
    name: &'static str,
    description: &'static str,
    op: fn(f64, f64) -> Result<f64, ChickError>,
) -> FnTool {
    FnTool::new(name, description, binary_operands(), move |args| async move {
        let a = args.get_f64("a")?;
        let b = args.get_f64("b")?;
        Ok(format_number(op(a, b)?))
    })
}

/// Create the `calculator` toolkit.
pub fn calculator_toolkit() -> Arc<dyn Tool> {
    Arc::new(
        Toolkit::new("calculator", "Basic arithmetic on two numbers")
            .with_member(binary_op("add", "Add two numbers", |a, b| Ok(a + b)))
            .with_member(binary_op("subtract", "Subtract b from a", |a, b| Ok(a - b)))
            .with_member(binary_op("multiply", "Multiply two numbers", |a, b| Ok(a * b)))
            .with_member(binary_op("divide", "Divide a by b", |a, b| {
                if b == 0.0 {
                    return Err(ChickError::tool("calculator_divide", "division by zero"));
                }
                Ok(a / b)
            })),
    )
}

/// Create the `filesystem` toolkit.
pub fn filesystem_toolkit() -> Arc<dyn Tool> {
    let read_file = FnTool::new(
        "read_file",
        "Read a file's contents as UTF-8 text",
        ToolParameters::builder()
            .string("path", "Path to the file to read", true)
            .build(),
        |args| async move {
            let path = args.get_str("path")?;
            let content = tokio::fs::read_to_string(path)
                .await
                .map_err(|e| ChickError::tool("filesystem_read_file", format!("{path}: {e}")))?;

            let mut out = truncate_utf8(&content, READ_FILE_MAX_BYTES).to_string();
            if out.len() < content.len() {
                out.push_str("\n... (truncated)");
            }
            Ok(out)
        },
    );

    let list_directory = FnTool::new(
        "list_directory",
        "List the entries of a directory, one per line",
        ToolParameters::builder()
            .string("path", "Directory to list", true)
            .build(),
        |args| async move {
            let path = args.get_str("path")?;
            let fail = |e: std::io::Error| {
                ChickError::tool("filesystem_list_directory", format!("{path}: {e}"))
            };

            let mut reader = tokio::fs::read_dir(path).await.map_err(fail)?;
            let mut entries = Vec::new();
            while let Some(entry) = reader.next_entry().await.map_err(fail)? {
                let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
                let name = entry.file_name().to_string_lossy().into_owned();
                entries.push(if is_dir { format!("{name}/") } else { name });
            }
            entries.sort();

            let total = entries.len();
            entries.truncate(LIST_MAX_ENTRIES);
            let mut out = entries.join("\n");
            if total > LIST_MAX_ENTRIES {
                out.push_str(&format!("\n... ({} more)", total - LIST_MAX_ENTRIES));
            }
            Ok(out)
        },
    );

    Arc::new(
        Toolkit::new("filesystem", "Read-only access to the local filesystem")
            .with_member(read_file)
            .with_member(list_directory),
    )
}

/// Create the `current_time` tool.
pub fn current_time_tool() -> Arc<dyn Tool> {
    Arc::new(FnTool::new(
        "current_time",
        "Current date and time",
        ToolParameters::builder()
            .boolean("utc", "Report UTC instead of local time", false)
            .build(),
        |args| async move {
            let utc = args.get_bool("utc").unwrap_or(false);
            let now = if utc {
                chrono::Utc::now().to_rfc3339()
            } else {
                chrono::Local::now().to_rfc3339()
            };
            Ok(now)
        },
    ))
}

/// All built-in tools. Toolkits expand into their members on registration.
pub fn all_tools() -> Vec<Arc<dyn Tool>> {
    vec![calculator_toolkit(), filesystem_toolkit(), current_time_tool()]
}
