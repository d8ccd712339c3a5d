//! Command-line argument parsing for the sandbox.

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the GUI sandbox
///
/// Values given here win over the configuration file.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file path
    ///
    /// If the file doesn't exist, a default configuration will be created.
    #[arg(short, long, default_value = "sandbox.toml")]
    pub config: PathBuf,

    /// Number of scheduler ticks to run before shutting down
    #[arg(short, long)]
    pub ticks: Option<u64>,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            config: PathBuf::from("sandbox.toml"),
            ticks: None,
            debug: false,
            json_logs: false,
        }
    }
}
