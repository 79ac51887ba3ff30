//! CLI argument parsing.

use std::path::PathBuf;

use clap::Parser;

/// CLI arguments for the envmon bridge.
#[derive(Parser, Debug, Clone)]
#[command(name = "zenoh-bridge-envmon")]
#[command(about = "Zenoh bridge for switch platform health telemetry")]
pub struct Args {
    /// Path to the JSON5 configuration file.
    #[arg(short, long, default_value = "envmon.json5")]
    pub config: PathBuf,

    /// Override the configured log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Args {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}
