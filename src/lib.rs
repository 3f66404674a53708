//! chick: a conversational agent that lets a text-completion model call
//! local tools through in-band `[TOOL_CALL:name:params]` directives.
//!
//! # Quick Start
//!
//! ```no_run
//! use chick::prelude::*;
//! use chick::tools::builtin::calculator_toolkit;
//!
//! # async fn example() -> chick::error::Result<()> {
//! let config = ChickConfig::load()?;
//! let mut agent = Agent::from_config("Chick", &config)?;
//! agent.add_tool(calculator_toolkit(), true);
//! let answer = agent.run("What is 12 times 8?").await?;
//! println!("{answer}");
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod config;
pub mod error;
pub mod models;
pub mod prelude;
pub mod provider;
pub mod tools;
pub mod types;

#[cfg(feature = "cli")]
pub mod cli;
