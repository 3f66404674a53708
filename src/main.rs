//! chick CLI binary entry point.

use std::io::Write;

use clap::Parser;
use futures::StreamExt;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use chick::agent::Agent;
use chick::cli::{ChatArgs, Cli, Commands};
use chick::config::ChickConfig;
use chick::tools::builtin::all_tools;
use chick::tools::ToolRegistry;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ChickConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    init_tracing(&config);

    let result = match cli.command {
        Commands::Chat(args) => handle_chat(args, config).await,
        Commands::Tools => {
            println!("{}", builtin_registry().describe());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(config: &ChickConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_filter()))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn builtin_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    for tool in all_tools() {
        registry.register(tool, true);
    }
    registry
}

async fn handle_chat(
    args: ChatArgs,
    mut config: ChickConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    args.apply_to(&mut config);

    let mut agent = Agent::from_config(args.name.clone(), &config)?
        .with_max_tool_iterations(args.max_tool_iterations);
    if let Some(ref system) = args.system {
        agent = agent.with_system_prompt(system.clone());
    }
    if !args.no_tools {
        agent = agent.with_registry(builtin_registry());
    }

    if let Some(ref prompt) = args.prompt {
        return respond(&mut agent, prompt, args.stream).await;
    }

    eprintln!(
        "{} ({}). Type 'exit' or 'quit' to leave.",
        agent.name(),
        config.language_model()
    );
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("You: ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if matches!(input.to_ascii_lowercase().as_str(), "exit" | "quit") {
            break;
        }

        respond(&mut agent, input, args.stream).await?;
    }
    Ok(())
}

async fn respond(
    agent: &mut Agent,
    input: &str,
    stream: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    print!("{}: ", agent.name());
    if stream {
        let mut chunks = Box::pin(agent.stream_run(input));
        while let Some(chunk) = chunks.next().await {
            print!("{}", chunk?);
            std::io::stdout().flush()?;
        }
        println!();
    } else {
        let run = agent.run_detailed(input).await?;
        for execution in &run.executions {
            let marker = if execution.is_success() { "ok" } else { "failed" };
            eprintln!("  [{}] {}", marker, execution.call.original_span);
        }
        println!("{}", run.answer);
    }
    Ok(())
}
