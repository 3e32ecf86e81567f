//! kinrelay CLI — entry point.
//!
//! # Commands
//!
//! - `kinrelay gateway` — run the relay with the console channel until Ctrl+C
//! - `kinrelay chat [-u USER]` — talk to the relay directly from a REPL
//! - `kinrelay onboard` — write a default config
//! - `kinrelay status` — show configuration

mod gateway;
mod helpers;
mod onboard;
mod repl;
mod status;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use kinrelay_agent::{ClientFactory, RelayHandler};
use kinrelay_client::{create_client, RelayApi};
use kinrelay_core::config::{get_config_path, load_config, Config};
use kinrelay_core::session::SessionStore;

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// Relay chat messages to a conversational-AI API
#[derive(Parser)]
#[command(name = "kinrelay", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the relay (console channel + relay loop + session sweep)
    Gateway {
        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,

        /// Config file (default: ~/.kinrelay/config.json)
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Chat with the relay from an interactive REPL
    Chat {
        /// User id the REPL speaks as
        #[arg(short, long, default_value = "cli")]
        user: String,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,

        /// Config file (default: ~/.kinrelay/config.json)
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Write a default configuration file
    Onboard,

    /// Show configuration status
    Status {
        /// Config file (default: ~/.kinrelay/config.json)
        #[arg(short, long)]
        config: Option<String>,
    },
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Gateway { logs, config } => {
            init_logging(logs);
            gateway::run(resolve_config_path(config)).await
        }
        Commands::Chat { user, logs, config } => {
            init_logging(logs);
            let path = resolve_config_path(config);
            let config = load_config(Some(&path));
            let handler = build_handler(config, path);
            repl::run(handler, &user).await
        }
        Commands::Onboard => onboard::run(),
        Commands::Status { config } => status::run(&resolve_config_path(config)),
    }
}

fn resolve_config_path(config: Option<String>) -> PathBuf {
    config
        .map(|p| helpers::expand_tilde(&p))
        .unwrap_or_else(get_config_path)
}

/// Client factory backed by the HTTP client.
pub fn http_client_factory() -> ClientFactory {
    Arc::new(|config: &Config| -> Result<Arc<dyn RelayApi>> {
        Ok(Arc::new(create_client(config)?))
    })
}

/// Build a `RelayHandler` with a fresh session store.
pub fn build_handler(config: Config, config_path: PathBuf) -> Arc<RelayHandler> {
    let sessions = Arc::new(SessionStore::new(config.session_timeout));
    Arc::new(RelayHandler::new(
        config,
        Some(config_path),
        sessions,
        http_client_factory(),
    ))
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("kinrelay=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
