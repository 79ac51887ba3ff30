//! Zenoh session establishment.

use anyhow::Context;
use zenoh::Session;

use crate::config::ZenohConfig;

/// Open a Zenoh session from the bridge configuration.
pub async fn connect(config: &ZenohConfig) -> anyhow::Result<Session> {
    let mut zenoh_config = zenoh::Config::default();

    zenoh_config
        .insert_json5("mode", &format!("\"{}\"", config.mode.as_str()))
        .map_err(|e| anyhow::anyhow!("failed to set zenoh mode: {e}"))?;

    if !config.connect.is_empty() {
        let endpoints =
            serde_json::to_string(&config.connect).context("failed to serialize endpoints")?;
        zenoh_config
            .insert_json5("connect/endpoints", &endpoints)
            .map_err(|e| anyhow::anyhow!("failed to set connect endpoints: {e}"))?;
    }

    if !config.listen.is_empty() {
        let endpoints =
            serde_json::to_string(&config.listen).context("failed to serialize endpoints")?;
        zenoh_config
            .insert_json5("listen/endpoints", &endpoints)
            .map_err(|e| anyhow::anyhow!("failed to set listen endpoints: {e}"))?;
    }

    tracing::info!(
        mode = config.mode.as_str(),
        connect = ?config.connect,
        listen = ?config.listen,
        "connecting to zenoh"
    );

    let session = zenoh::open(zenoh_config)
        .await
        .map_err(|e| anyhow::anyhow!("failed to open zenoh session: {e}"))?;

    tracing::info!(zid = %session.zid(), "connected to zenoh");

    Ok(session)
}
