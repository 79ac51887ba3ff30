//! Zenoh-backed metric sink.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use zenoh::Session;

use envmon_core::{EnvmonError, MetricSample, MetricSink, Result};

/// Payload serialization format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Human-readable, good for debugging.
    #[default]
    Json,

    /// Compact binary, better for high-volume telemetry.
    Cbor,
}

/// Encode a metric sample for the wire.
pub fn encode(sample: &MetricSample, format: Format) -> std::result::Result<Vec<u8>, String> {
    match format {
        Format::Json => serde_json::to_vec(sample).map_err(|e| e.to_string()),
        Format::Cbor => {
            let mut buf = Vec::new();
            ciborium::into_writer(sample, &mut buf).map_err(|e| e.to_string())?;
            Ok(buf)
        }
    }
}

/// Key expression for a sample: `<prefix>/<source>/<kind>/<instance>`.
pub fn build_key(prefix: &str, sample: &MetricSample) -> String {
    format!(
        "{}/{}/{}/{}",
        prefix, sample.source, sample.kind, sample.instance
    )
}

/// Sink that publishes each sample to Zenoh under its own key expression.
#[derive(Clone)]
pub struct ZenohSink {
    session: Arc<Session>,
    key_prefix: String,
    format: Format,
}

impl ZenohSink {
    pub fn new(session: Arc<Session>, key_prefix: impl Into<String>, format: Format) -> Self {
        Self {
            session,
            key_prefix: key_prefix.into(),
            format,
        }
    }

    pub fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    pub fn format(&self) -> Format {
        self.format
    }
}

impl MetricSink for ZenohSink {
    async fn dispatch(&self, sample: &MetricSample) -> Result<()> {
        let key = build_key(&self.key_prefix, sample);
        let payload = encode(sample, self.format).map_err(|e| EnvmonError::sink(&key, e))?;

        self.session
            .put(&key, payload)
            .await
            .map_err(|e| EnvmonError::sink(&key, e))?;

        Ok(())
    }
}
