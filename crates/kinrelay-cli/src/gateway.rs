//! Gateway command — runs the relay end to end.
//!
//! Startup sequence:
//! 1. Load config
//! 2. Create message bus, session store, relay handler
//! 3. Create relay loop and session sweep
//! 4. Create channel manager, register enabled channels
//! 5. Run everything under one `tokio::select!` until Ctrl+C

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use tracing::{error, info};

use kinrelay_agent::{RelayLoop, SetupState};
use kinrelay_channels::{ChannelManager, ConsoleChannel};
use kinrelay_core::bus::MessageBus;
use kinrelay_core::config::load_config;
use kinrelay_core::sweep::SweepService;

use crate::helpers;

pub async fn run(config_path: PathBuf) -> Result<()> {
    helpers::print_banner();
    println!("  Mode: Gateway");
    println!();

    let config = load_config(Some(&config_path));
    let bus = Arc::new(MessageBus::new(100));

    let handler = crate::build_handler(config.clone(), config_path.clone());
    let sweep = Arc::new(SweepService::new(
        handler.sessions().clone(),
        Some(config.sweep_interval),
    ));
    let relay_loop = RelayLoop::new(bus.clone(), handler.clone());

    let mut channel_manager = ChannelManager::new(bus.clone());
    if config.channels.console.enabled {
        channel_manager.register(Arc::new(ConsoleChannel::new(
            &config.channels.console,
            bus.clone(),
        )));
    }

    info!(
        endpoint = %config.api_endpoint,
        channels = ?channel_manager.channel_names(),
        "gateway starting"
    );

    println!("  Config:    {}", config_path.display());
    println!("  Endpoint:  {}", config.api_endpoint);
    println!(
        "  Sessions:  expire after {}s, swept every {}s",
        config.session_timeout,
        sweep.interval_s()
    );
    println!("  Channels:  {} registered", channel_manager.len());
    if handler.setup_state() != SetupState::Ready {
        println!(
            "  {}",
            "Not configured yet: the first message starts setup.".yellow()
        );
    }
    if channel_manager.is_empty() {
        println!(
            "  {}",
            "No channels enabled; enable one in the config file.".yellow()
        );
    }
    println!();
    println!("  Ctrl+C to stop");
    println!();

    tokio::select! {
        _ = relay_loop.run() => {
            info!("relay loop exited");
        }
        result = channel_manager.start_all() => {
            if let Err(e) = result {
                error!(error = %e, "channel manager error");
            }
        }
        result = sweep.start() => {
            if let Err(e) = result {
                error!(error = %e, "session sweep error");
            }
        }
        _ = tokio::signal::ctrl_c() => {
            println!();
            println!("  Shutting down...");
            info!("received Ctrl+C, shutting down");
            sweep.stop();
            channel_manager.stop_all().await;
        }
    }

    println!("  Gateway stopped. Goodbye!");
    Ok(())
}
