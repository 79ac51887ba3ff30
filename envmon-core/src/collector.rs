//! The per-tick collection pipeline.
//!
//! [`EnvMonitor`] implements the three-phase host contract: `configure` once
//! at load, `init` once before the first tick, `collect` once per interval.
//! A collect tick refreshes the platform snapshot, maps every sensor record
//! to a metric sample, and dispatches each sample independently.

use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{EnvmonError, Result};
use crate::metric::{MetricSample, MetricSink};
use crate::reader::PlatformReader;

/// Host-facing collection interface.
///
/// The host (whatever scheduler exists around this core) owns the call
/// cadence; the collector owns everything between refresh and dispatch.
#[allow(async_fn_in_trait)]
pub trait Collector {
    /// Called once at load with the plugin option table.
    fn configure(&mut self, options: &HashMap<String, Value>) -> Result<()>;

    /// Called once before the first collect.
    fn init(&mut self) -> Result<()>;

    /// One collection tick. An error means the whole cycle was abandoned
    /// and nothing was dispatched for it.
    async fn collect<S: MetricSink>(&mut self, sink: &S) -> Result<()>;
}

/// Platform health collector for one switch.
#[derive(Debug, Default)]
pub struct EnvMonitor {
    source: String,
    reader: Option<PlatformReader>,
}

impl EnvMonitor {
    /// Collector publishing samples under the given source (hostname) label.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            reader: None,
        }
    }

    /// Collector over an already-built reader, for tests and non-standard
    /// tool locations. Counts as initialized.
    pub fn with_reader(source: impl Into<String>, reader: PlatformReader) -> Self {
        Self {
            source: source.into(),
            reader: Some(reader),
        }
    }

    /// Dispatch one value sequence to the sink.
    ///
    /// An empty sequence or any absent value makes this a no-op: an
    /// incomplete upstream reading must not turn into a bogus metric. Sink
    /// failures are logged and swallowed so the remaining sensors of the
    /// cycle still publish.
    pub async fn dispatch<S: MetricSink>(
        &self,
        sink: &S,
        values: &[Option<f64>],
        kind: &str,
        instance: &str,
    ) {
        let complete: Option<Vec<f64>> = values.iter().copied().collect();
        let Some(values) = complete else {
            debug!(kind, instance, "incomplete reading, not dispatched");
            return;
        };
        if values.is_empty() {
            debug!(kind, instance, "empty reading, not dispatched");
            return;
        }

        let sample = MetricSample::new(&self.source, kind, instance, values);
        if let Err(error) = sink.dispatch(&sample).await {
            warn!(%error, kind, instance, "metric sink rejected sample");
        }
    }
}

impl Collector for EnvMonitor {
    /// Strict allow-nothing option surface: every supplied keyword is
    /// unknown by definition.
    fn configure(&mut self, options: &HashMap<String, Value>) -> Result<()> {
        if let Some(key) = options.keys().next() {
            return Err(EnvmonError::UnknownKeyword { key: key.clone() });
        }
        Ok(())
    }

    /// Construct the reader exactly once; a second init keeps the existing
    /// one (and its snapshot).
    fn init(&mut self) -> Result<()> {
        if self.reader.is_none() {
            self.reader = Some(PlatformReader::new());
        }
        Ok(())
    }

    async fn collect<S: MetricSink>(&mut self, sink: &S) -> Result<()> {
        let reader = self.reader.as_mut().ok_or(EnvmonError::NotInitialized)?;
        reader.refresh().await?;

        let fans = reader.fans();
        let psus = reader.psus();
        let temps = reader.temps();
        let leds = reader.leds();

        for fan in &fans {
            let values = [
                Some(fan.health.as_value()),
                fan.current,
                fan.min,
                fan.max,
                fan.variance,
            ];
            self.dispatch(sink, &values, "fan", &fan.name).await;
        }

        for psu in &psus {
            self.dispatch(sink, &[Some(psu.health.as_value())], "psu", &psu.name)
                .await;
        }

        for temp in &temps {
            let values = [
                Some(temp.health.as_value()),
                temp.current,
                temp.min,
                temp.max,
                temp.crit,
            ];
            self.dispatch(sink, &values, "temp", &temp.name).await;
        }

        for led in &leds {
            self.dispatch(sink, &[Some(led.health.as_value())], "led", &led.name)
                .await;
        }

        debug!(
            fans = fans.len(),
            psus = psus.len(),
            temps = temps.len(),
            leds = leds.len(),
            "collection cycle complete"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Sink that records every dispatched sample.
    #[derive(Default)]
    struct RecordingSink {
        samples: Mutex<Vec<MetricSample>>,
    }

    impl RecordingSink {
        fn samples(&self) -> Vec<MetricSample> {
            self.samples.lock().unwrap().clone()
        }
    }

    impl MetricSink for RecordingSink {
        async fn dispatch(&self, sample: &MetricSample) -> Result<()> {
            self.samples.lock().unwrap().push(sample.clone());
            Ok(())
        }
    }

    /// Sink that always fails.
    struct FailingSink;

    impl MetricSink for FailingSink {
        async fn dispatch(&self, sample: &MetricSample) -> Result<()> {
            Err(EnvmonError::sink(&sample.kind, "backend down"))
        }
    }

    #[test]
    fn configure_rejects_any_keyword() {
        let mut monitor = EnvMonitor::new("switch01");
        let mut options = HashMap::new();
        options.insert("foo".to_string(), Value::Bool(true));

        let err = monitor.configure(&options).unwrap_err();
        assert!(matches!(err, EnvmonError::UnknownKeyword { ref key } if key == "foo"));
        assert_eq!(err.to_string(), "config: unknown keyword `foo`");
    }

    #[test]
    fn configure_accepts_empty_options() {
        let mut monitor = EnvMonitor::new("switch01");
        monitor.configure(&HashMap::new()).unwrap();
    }

    #[tokio::test]
    async fn collect_before_init_fails() {
        let mut monitor = EnvMonitor::new("switch01");
        let sink = RecordingSink::default();
        let err = monitor.collect(&sink).await.unwrap_err();
        assert!(matches!(err, EnvmonError::NotInitialized));
        assert!(sink.samples().is_empty());
    }

    #[tokio::test]
    async fn dispatch_with_absent_value_is_a_no_op() {
        let monitor = EnvMonitor::new("switch01");
        let sink = RecordingSink::default();

        monitor
            .dispatch(&sink, &[Some(1.0), None, Some(8000.0)], "fan", "Fan1")
            .await;

        assert!(sink.samples().is_empty());
    }

    #[tokio::test]
    async fn dispatch_with_empty_values_is_a_no_op() {
        let monitor = EnvMonitor::new("switch01");
        let sink = RecordingSink::default();

        monitor.dispatch(&sink, &[], "psu", "PSU1").await;

        assert!(sink.samples().is_empty());
    }

    #[tokio::test]
    async fn dispatch_publishes_complete_values_in_order() {
        let monitor = EnvMonitor::new("switch01");
        let sink = RecordingSink::default();

        monitor
            .dispatch(
                &sink,
                &[
                    Some(1.0),
                    Some(4000.0),
                    Some(2000.0),
                    Some(8000.0),
                    Some(500.0),
                ],
                "fan",
                "Fan1",
            )
            .await;

        let samples = sink.samples();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].kind, "envmon_fan");
        assert_eq!(samples[0].instance, "fan1");
        assert_eq!(samples[0].source, "switch01");
        assert_eq!(samples[0].values, vec![1.0, 4000.0, 2000.0, 8000.0, 500.0]);
    }

    #[tokio::test]
    async fn dispatch_swallows_sink_errors() {
        let monitor = EnvMonitor::new("switch01");
        // Must not panic or propagate.
        monitor.dispatch(&FailingSink, &[Some(0.0)], "led", "Status").await;
    }
}
