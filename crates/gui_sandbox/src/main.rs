//! Headless sandbox for the chest GUI runtime.
//!
//! Loads `sandbox.toml` (creating it on first run), builds the demo menus and
//! replays a scripted player against them on a fixed tick interval. Stops when
//! the tick budget runs out or on Ctrl-C, closing every open view on the way
//! out.

mod cli;
mod config;
mod demo;
mod host;
mod logging;
mod signals;

use anyhow::{anyhow, Result};
use chest_gui::GuiManager;
use clap::Parser;
use cli::Args;
use config::AppConfig;
use demo::Sandbox;
use host::ConsoleHost;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Configuration comes first so logging can honour it
    let mut config = AppConfig::load_from_file(&args.config).await?;
    if let Some(ticks) = args.ticks {
        config.scheduler.tick_budget = ticks;
    }
    if args.json_logs {
        config.logging.json_format = true;
    }
    config
        .validate()
        .map_err(|e| anyhow!("Configuration validation failed: {}", e))?;

    logging::setup_logging(&config.logging, args.debug)?;
    info!("🔧 Loaded configuration from {}", args.config.display());

    let host = Arc::new(ConsoleHost::new());
    let manager = GuiManager::new(host.clone(), config.gui.clone());
    let mut sandbox = Sandbox::new(manager.clone(), host)?;

    info!(
        "🚀 Running {} ticks every {}ms for player {}",
        config.scheduler.tick_budget,
        config.scheduler.tick_interval_ms,
        sandbox.player()
    );

    tokio::select! {
        result = sandbox.run(config.scheduler.tick_interval_ms, config.scheduler.tick_budget) => result?,
        result = signals::shutdown_signal() => {
            let signal = result?;
            info!("🛑 Shutdown requested ({})", signal);
        }
    }

    manager.close_all();
    sandbox.report();
    info!("✅ Sandbox stopped");
    Ok(())
}
