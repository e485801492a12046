use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use autofix_agents::{
    cli::{execute_command, Commands},
    config::{Config, LogFormat},
    llm::ChatClient,
    server::AppState,
};

/// Detect bugs from failure reports and propose full-file fixes.
#[derive(Parser, Debug)]
#[command(name = "autofix", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };

    // Initialize logging
    init_logging(&config);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        provider = ?config.endpoint.provider,
        deployment = %config.endpoint.deployment,
        "autofix starting..."
    );

    let client = ChatClient::new(&config.endpoint, config.request.clone())
        .context("Failed to initialize model client")?;
    info!(url = %client.url(), "Model client initialized");

    let state = Arc::new(AppState::new(config, Arc::new(client)));

    let result = execute_command(cli.command, state).await;
    if result.is_success() {
        if !result.message.is_empty() {
            println!("{}", result.message);
        }
    } else {
        eprintln!("{}", result.message);
        std::process::exit(result.exit_code);
    }

    Ok(())
}

/// Initialize tracing/logging
fn init_logging(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
