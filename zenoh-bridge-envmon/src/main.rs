//! Zenoh bridge for switch platform health telemetry.
//!
//! Drives an `EnvMonitor` through its configure/init/collect lifecycle:
//! configure once at startup, init once, then one collect tick per poll
//! interval until Ctrl+C.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use envmon_core::{Collector, EnvMonitor};
use zenoh_bridge_envmon::args::Args;
use zenoh_bridge_envmon::config::BridgeConfig;
use zenoh_bridge_envmon::sink::ZenohSink;
use zenoh_bridge_envmon::{init_tracing, session};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = BridgeConfig::load(&args.config)
        .with_context(|| format!("loading config from {}", args.config.display()))?;

    let mut log_config = config.logging.clone();
    if let Some(level) = &args.log_level {
        log_config.level = level.clone();
    }
    init_tracing(&log_config)?;

    let hostname = config.hostname();
    let interval = Duration::from_secs(config.envmon.poll_interval_secs);

    // Configuration errors are fatal here and only here; once the loop is
    // running, a failed cycle just waits for the next tick.
    let mut monitor = EnvMonitor::new(hostname.clone());
    monitor
        .configure(&config.envmon.options)
        .context("rejected plugin options")?;
    monitor.init()?;

    let session = Arc::new(session::connect(&config.zenoh).await?);
    let sink = ZenohSink::new(
        session.clone(),
        config.envmon.key_prefix.clone(),
        config.envmon.format,
    );

    tracing::info!(
        %hostname,
        key_prefix = %config.envmon.key_prefix,
        interval_secs = config.envmon.poll_interval_secs,
        "envmon bridge running"
    );

    let collect_loop = tokio::spawn(async move {
        loop {
            if let Err(error) = monitor.collect(&sink).await {
                tracing::warn!(%error, "collection cycle abandoned");
            }
            tokio::time::sleep(interval).await;
        }
    });

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl+C")?;

    tracing::info!("received shutdown signal");
    collect_loop.abort();

    if let Err(e) = session.close().await {
        tracing::warn!(error = %e, "error closing zenoh session");
    }

    Ok(())
}
