//! Tool trait, closure-based tools and toolkits.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;

use super::arguments::ToolArguments;
use super::types::ToolParameters;
use crate::error::ChickError;

/// Core tool trait. Implement to create custom tools.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (must match what the model writes in a directive).
    fn name(&self) -> &str;

    /// Human-readable description.
    fn description(&self) -> &str;

    /// Ordered parameter schema.
    fn parameters(&self) -> &ToolParameters;

    /// Execute the tool with coerced arguments.
    async fn execute(&self, args: &ToolArguments) -> Result<String, ChickError>;

    /// Sub-tools registered in place of this one when the registry expands
    /// toolkits. Plain tools return an empty list.
    fn expand(&self) -> Vec<Arc<dyn Tool>> {
        Vec::new()
    }
}

type ToolHandler = dyn Fn(ToolArguments) -> Pin<Box<dyn Future<Output = Result<String, ChickError>> + Send>>
    + Send
    + Sync;

/// Closure-based tool for quick tool creation.
pub struct FnTool {
    name: String,
    description: String,
    parameters: ToolParameters,
    handler: Arc<ToolHandler>,
}

impl FnTool {
    /// Create a tool from a closure.
    pub fn new<F, Fut>(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: ToolParameters,
        handler: F,
    ) -> Self
    where
        F: Fn(ToolArguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String, ChickError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            handler: Arc::new(move |args| Box::pin(handler(args))),
        }
    }
}

#[async_trait]
impl Tool for FnTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> &ToolParameters {
        &self.parameters
    }

    async fn execute(&self, args: &ToolArguments) -> Result<String, ChickError> {
        (self.handler)(args.clone()).await
    }
}

impl std::fmt::Debug for FnTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnTool")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}

/// A named group of tools.
///
/// Registered with expansion, each member becomes its own tool named
/// `<toolkit>_<member>`. Registered without expansion, the toolkit is a single
/// tool taking an `action` parameter that selects the member.
pub struct Toolkit {
    name: String,
    description: String,
    parameters: ToolParameters,
    members: Vec<Arc<dyn Tool>>,
}

impl Toolkit {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: ToolParameters::builder()
                .string("action", "Name of the operation to run", true)
                .build(),
            members: Vec::new(),
        }
    }

    /// Add a member tool. Its name is prefixed with the toolkit name and its
    /// parameters join the toolkit's schema as optional.
    pub fn with_member(mut self, member: FnTool) -> Self {
        self.parameters.merge_optional(&member.parameters);
        let prefixed = FnTool {
            name: format!("{}_{}", self.name, member.name),
            ..member
        };
        self.members.push(Arc::new(prefixed));
        self
    }

    /// Member tools with their prefixed names.
    pub fn members(&self) -> &[Arc<dyn Tool>] {
        &self.members
    }
}

#[async_trait]
impl Tool for Toolkit {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> &ToolParameters {
        &self.parameters
    }

    async fn execute(&self, args: &ToolArguments) -> Result<String, ChickError> {
        let action = args.get_str("action")?;
        let full_name = format!("{}_{}", self.name, action);
        let member = self
            .members
            .iter()
            .find(|m| m.name() == full_name)
            .ok_or_else(|| ChickError::tool(&self.name, format!("unknown action '{action}'")))?;
        member.execute(args).await
    }

    fn expand(&self) -> Vec<Arc<dyn Tool>> {
        self.members.clone()
    }
}

impl std::fmt::Debug for Toolkit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Toolkit")
            .field("name", &self.name)
            .field("members", &self.members.iter().map(|m| m.name()).collect::<Vec<_>>())
            .finish()
    }
}
