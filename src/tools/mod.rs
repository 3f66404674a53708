//! Tool system: definitions, registry and the bundled tools.

pub mod arguments;
pub mod builtin;
pub mod registry;
pub mod tool;
pub mod types;

pub use arguments::ToolArguments;
pub use registry::ToolRegistry;
pub use tool::{FnTool, Tool, Toolkit};
pub use types::{ParameterType, ToolParameter, ToolParameters};
