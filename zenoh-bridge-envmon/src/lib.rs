//! Zenoh bridge for switch platform health telemetry.
//!
//! Polls the switch's platform-management tools through `envmon-core` and
//! publishes one metric sample per sensor to Zenoh.
//!
//! # Key Expressions
//!
//! ```text
//! <key_prefix>/<hostname>/envmon_fan/<fan>
//! <key_prefix>/<hostname>/envmon_psu/<psu>
//! <key_prefix>/<hostname>/envmon_temp/<sensor>
//! <key_prefix>/<hostname>/envmon_led/<led>
//! ```

pub mod args;
pub mod config;
pub mod session;
pub mod sink;

use anyhow::Context;

use crate::config::LoggingConfig;

/// Initialize tracing from the logging config; `RUST_LOG` wins when set.
pub fn init_tracing(config: &LoggingConfig) -> anyhow::Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .try_init()
        .context("failed to initialize tracing")
}
