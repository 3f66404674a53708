//! Convenience re-exports for common use.

pub use crate::agent::{Agent, AgentRun, ToolExecution};
pub use crate::config::ChickConfig;
pub use crate::error::{ChickError, Result};
pub use crate::models::{LanguageModel, ProviderKey};
pub use crate::provider::{ChatRequest, ChatResponse, ModelClient};
pub use crate::tools::{FnTool, Tool, ToolArguments, ToolParameters, ToolRegistry, Toolkit};
pub use crate::types::{ChatTurn, GenerationSettings, Message, Role, TextStreamDelta, Usage};
