//! Tool registry: the catalog of tools known to one agent.

use std::fmt::Write as _;
use std::sync::Arc;

use tracing::{debug, warn};

use super::tool::Tool;

/// Catalog text returned when no tool is registered.
pub const NO_TOOLS_AVAILABLE: &str = "No tools available";

/// Name-unique collection of tools, kept in registration order.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool.
    ///
    /// With `auto_expand`, a tool that expands into sub-tools (a toolkit) is
    /// replaced by its members. A tool whose name is already taken replaces
    /// the earlier registration.
    pub fn register(&mut self, tool: Arc<dyn Tool>, auto_expand: bool) {
        if auto_expand {
            let members = tool.expand();
            if !members.is_empty() {
                debug!(toolkit = tool.name(), count = members.len(), "expanding toolkit");
                for member in members {
                    self.insert(member);
                }
                return;
            }
        }
        self.insert(tool);
    }

    fn insert(&mut self, tool: Arc<dyn Tool>) {
        if let Some(slot) = self.tools.iter_mut().find(|t| t.name() == tool.name()) {
            warn!(tool = tool.name(), "tool already registered, replacing");
            *slot = tool;
        } else {
            debug!(tool = tool.name(), "tool registered");
            self.tools.push(tool);
        }
    }

    /// Remove a tool by name, returning it if present.
    pub fn unregister(&mut self, name: &str) -> Option<Arc<dyn Tool>> {
        let idx = self.tools.iter().position(|t| t.name() == name)?;
        Some(self.tools.remove(idx))
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Registered tool names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Human-readable catalog of every tool, or [`NO_TOOLS_AVAILABLE`].
    ///
    /// ```text
    /// - calculator_add: Add two numbers
    ///   - a (integer, required): First addend
    ///   - b (integer, required): Second addend
    /// ```
    pub fn describe(&self) -> String {
        if self.tools.is_empty() {
            return NO_TOOLS_AVAILABLE.to_string();
        }

        let mut out = String::new();
        for tool in &self.tools {
            let _ = writeln!(out, "- {}: {}", tool.name(), tool.description());
            for param in tool.parameters().iter() {
                let requirement = if param.required { "required" } else { "optional" };
                let _ = write!(out, "  - {} ({}, {})", param.name, param.param_type, requirement);
                if !param.description.is_empty() {
                    let _ = write!(out, ": {}", param.description);
                }
                out.push('\n');
            }
        }
        out.truncate(out.trim_end().len());
        out
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}
