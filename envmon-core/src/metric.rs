//! The flat metric sample handed to the sink, and the sink contract itself.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Namespace prepended to every metric kind tag.
pub const NAMESPACE: &str = "envmon";

/// One normalized metric, constructed fresh per sensor per cycle and handed
/// straight to the sink, never retained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    /// Unix epoch milliseconds when the sample was built.
    pub timestamp: i64,

    /// Host the sample was collected on.
    pub source: String,

    /// Namespaced metric kind tag, e.g. `envmon_fan`.
    pub kind: String,

    /// Lowercased sensor name, used as the metric instance label.
    pub instance: String,

    /// Ordered metric values; health first, encoded 1/0.
    pub values: Vec<f64>,
}

impl MetricSample {
    /// Build a sample for a sensor kind and instance.
    ///
    /// The kind is namespaced and the instance lowercased here so every
    /// sink sees the same labels regardless of upstream casing.
    pub fn new(source: impl Into<String>, kind: &str, instance: &str, values: Vec<f64>) -> Self {
        Self {
            timestamp: current_timestamp_millis(),
            source: source.into(),
            kind: format!("{NAMESPACE}_{kind}"),
            instance: instance.to_lowercase(),
            values,
        }
    }
}

/// Destination for metric samples.
///
/// Implementations are fire-and-forget per record: the collector logs a
/// dispatch failure and moves on to the next sensor.
#[allow(async_fn_in_trait)]
pub trait MetricSink {
    async fn dispatch(&self, sample: &MetricSample) -> Result<()>;
}

/// Current timestamp in milliseconds since the Unix epoch.
///
/// Returns 0 if system time is before the epoch (should never happen in
/// practice).
pub fn current_timestamp_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_is_namespaced_and_instance_lowercased() {
        let sample = MetricSample::new("switch01", "fan", "Fan1", vec![1.0, 4000.0]);
        assert_eq!(sample.kind, "envmon_fan");
        assert_eq!(sample.instance, "fan1");
        assert_eq!(sample.source, "switch01");
        assert_eq!(sample.values, vec![1.0, 4000.0]);
    }

    #[test]
    fn sample_serializes_to_flat_json() {
        let mut sample = MetricSample::new("switch01", "psu", "PSU1", vec![1.0]);
        sample.timestamp = 1700000000000;
        let json = serde_json::to_value(&sample).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "timestamp": 1700000000000i64,
                "source": "switch01",
                "kind": "envmon_psu",
                "instance": "psu1",
                "values": [1.0],
            })
        );
    }
}
