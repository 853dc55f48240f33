//! CLI for topicd
//!
//! Subcommands:
//! - `server`: run the topic broker
//! - `client`: run the interactive terminal client

use std::sync::Arc;

use clap::{Parser, Subcommand};
use topicd::broker::TopicRegistry;
use topicd::config::load_config;
use topicd::transport::{start_server, terminal};
use topicd::utils::logging;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "topicd", about = "Text-line publish/subscribe broker")]
struct Cli {
    /// Log level: error, warn, info, debug or trace
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the topic server
    Server,
    /// Run the interactive client (sends `nickname`, then forwards stdin lines)
    Client {
        /// Server address to connect to (default: the configured listen address)
        #[arg(long)]
        addr: Option<String>,
        /// Nickname announced right after connecting
        #[arg(long, default_value = "guest")]
        nickname: String,
    },
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    logging::init(&cli.log_level);

    match cli.command {
        Command::Server => {
            if let Err(e) = run_server().await {
                error!("Server failed: {}", e);
            }
        }
        Command::Client { addr, nickname } => {
            if let Err(e) = run_client(addr, &nickname).await {
                error!("Client failed: {}", e);
            }
        }
    }
}

async fn run_server() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let addr = config.server.addr();
    let registry = Arc::new(TopicRegistry::new());

    tokio::select! {
        result = start_server(&addr, registry, config) => {
            result?;
            error!("Topic server exited unexpectedly.");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received. Exiting gracefully.");
        }
    }

    Ok(())
}

async fn run_client(addr: Option<String>, nickname: &str) -> Result<(), Box<dyn std::error::Error>> {
    let addr = match addr {
        Some(addr) => addr,
        None => load_config()?.server.addr(),
    };
    terminal::run_client(&addr, nickname).await?;
    Ok(())
}
