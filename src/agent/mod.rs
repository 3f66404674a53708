//! Agent system: the directive-driven tool loop and its building blocks.

pub mod agent;
pub mod conversation;
pub mod directive;
pub mod dispatch;
pub mod params;
pub mod prompt;

pub use agent::{Agent, AgentRun, DEFAULT_MAX_TOOL_ITERATIONS};
pub use conversation::Conversation;
pub use directive::{parse_tool_calls, strip_tool_calls, ToolCall};
pub use dispatch::{execute_tool_call, ToolCallError, ToolExecution};
pub use params::{CoercionIssue, DecodeError};
