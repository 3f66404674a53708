//! CLI entry point for chick.

use clap::{Parser, Subcommand};

use crate::agent::DEFAULT_MAX_TOOL_ITERATIONS;
use crate::config::ChickConfig;

/// Chick agent CLI
#[derive(Parser, Debug)]
#[command(name = "chick", version, about = "Chat with a tool-using model")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Chat with the agent (interactive unless a prompt is given)
    Chat(ChatArgs),
    /// List the built-in tools as the model sees them
    Tools,
}

/// Arguments for the `chat` subcommand.
#[derive(Parser, Debug)]
pub struct ChatArgs {
    /// Model to use (`model` or `provider:model`); overrides config
    #[arg(short, long)]
    pub model: Option<String>,

    /// System prompt
    #[arg(short, long)]
    pub system: Option<String>,

    /// Temperature (0.0 - 2.0)
    #[arg(short, long)]
    pub temperature: Option<f64>,

    /// Max tokens
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Tool rounds per message before a final answer is forced
    #[arg(long, default_value_t = DEFAULT_MAX_TOOL_ITERATIONS)]
    pub max_tool_iterations: usize,

    /// Do not register the built-in tools
    #[arg(long)]
    pub no_tools: bool,

    /// Stream replies (tools are not used while streaming)
    #[arg(long)]
    pub stream: bool,

    /// Agent name
    #[arg(long, default_value = "Chick")]
    pub name: String,

    /// Single prompt to answer, then exit
    pub prompt: Option<String>,
}

impl ChatArgs {
    /// Apply command-line overrides on top of loaded config.
    pub fn apply_to(&self, config: &mut ChickConfig) {
        if let Some(ref model) = self.model {
            config.model = model.clone();
        }
        if let Some(t) = self.temperature {
            config.temperature = t;
        }
        if let Some(max) = self.max_tokens {
            config.max_tokens = Some(max);
        }
    }
}
