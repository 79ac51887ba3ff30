//! End-to-end collection cycles against fake diagnostic tools.
//!
//! The tools are shell scripts that print fixture JSON (or fail), so these
//! tests exercise the full spawn/parse/project/dispatch pipeline without a
//! real switch.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use envmon_core::{
    Collector, EnvMonitor, EnvmonError, MetricSample, MetricSink, PlatformReader, Result,
};

const SMONCTL_JSON: &str = r#"[
    {"type": "fan", "name": "Fan1", "state": "ok",
     "input": 4000, "min": 2000, "max": 8000, "var": 500},
    {"type": "power", "name": "PSU1", "state": "ok"},
    {"type": "temp", "name": "CPU", "state": "bad",
     "avg": 55, "min": 0, "max": 70, "crit": 90}
]"#;

const LEDMGRD_JSON: &str = r#"[
    {"name": "Status", "color": "green", "good_led_color": "red"}
]"#;

fn write_tool(dir: &Path, name: &str, stdout_json: &str) -> PathBuf {
    let path = dir.join(name);
    let script = format!("#!/bin/sh\ncat <<'EOF'\n{stdout_json}\nEOF\n");
    write_script(&path, &script);
    path
}

fn write_failing_tool(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    write_script(&path, "#!/bin/sh\necho 'sensors unavailable' >&2\nexit 3\n");
    path
}

fn write_script(path: &Path, script: &str) {
    fs::write(path, script).unwrap();
    let mut perms = fs::metadata(path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).unwrap();
}

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

#[tokio::test]
async fn full_cycle_publishes_one_sample_per_sensor() {
    let dir = tempfile::tempdir().unwrap();
    let smonctl = write_tool(dir.path(), "smonctl", SMONCTL_JSON);
    let ledmgrd = write_tool(dir.path(), "ledmgrd", LEDMGRD_JSON);

    let reader = PlatformReader::with_paths(smonctl, ledmgrd);
    let mut monitor = EnvMonitor::with_reader("switch01", reader);
    let sink = RecordingSink::default();

    monitor.collect(&sink).await.unwrap();

    let samples = sink.samples();
    assert_eq!(samples.len(), 4);

    let fan = &samples[0];
    assert_eq!(fan.kind, "envmon_fan");
    assert_eq!(fan.instance, "fan1");
    assert_eq!(fan.values, vec![1.0, 4000.0, 2000.0, 8000.0, 500.0]);

    let psu = &samples[1];
    assert_eq!(psu.kind, "envmon_psu");
    assert_eq!(psu.instance, "psu1");
    assert_eq!(psu.values, vec![1.0]);

    let temp = &samples[2];
    assert_eq!(temp.kind, "envmon_temp");
    assert_eq!(temp.instance, "cpu");
    assert_eq!(temp.values, vec![0.0, 55.0, 0.0, 70.0, 90.0]);

    let led = &samples[3];
    assert_eq!(led.kind, "envmon_led");
    assert_eq!(led.instance, "status");
    assert_eq!(led.values, vec![0.0]);
}

#[tokio::test]
async fn failing_led_tool_abandons_the_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let smonctl = write_tool(dir.path(), "smonctl", SMONCTL_JSON);
    let ledmgrd = write_failing_tool(dir.path(), "ledmgrd");

    let reader = PlatformReader::with_paths(smonctl, ledmgrd);
    let mut monitor = EnvMonitor::with_reader("switch01", reader);
    let sink = RecordingSink::default();

    let err = monitor.collect(&sink).await.unwrap_err();
    assert!(matches!(err, EnvmonError::Execution { .. }));
    // No partial metrics for the tick.
    assert!(sink.samples().is_empty());
}

#[tokio::test]
async fn failed_refresh_keeps_the_previous_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let smonctl = write_tool(dir.path(), "smonctl", SMONCTL_JSON);
    let ledmgrd = write_tool(dir.path(), "ledmgrd", LEDMGRD_JSON);

    let mut reader = PlatformReader::with_paths(&smonctl, &ledmgrd);
    reader.refresh().await.unwrap();
    assert_eq!(reader.fans().len(), 1);

    // The LED tool starts failing; the committed snapshot must survive.
    write_failing_tool(dir.path(), "ledmgrd");
    reader.refresh().await.unwrap_err();

    assert_eq!(reader.fans().len(), 1);
    assert_eq!(reader.leds().len(), 1);
}

#[tokio::test]
async fn malformed_output_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let smonctl = write_tool(dir.path(), "smonctl", "this is not json");
    let ledmgrd = write_tool(dir.path(), "ledmgrd", LEDMGRD_JSON);

    let mut reader = PlatformReader::with_paths(smonctl, ledmgrd);
    let err = reader.refresh().await.unwrap_err();
    assert!(matches!(err, EnvmonError::Parse { .. }));
}

#[tokio::test]
async fn incomplete_reading_is_skipped_but_siblings_publish() {
    let dir = tempfile::tempdir().unwrap();
    // Fan1 reports a null speed; Fan2 is complete.
    let smonctl = write_tool(
        dir.path(),
        "smonctl",
        r#"[
        {"type": "fan", "name": "Fan1", "state": "ok",
         "input": null, "min": 2000, "max": 8000, "var": 500},
        {"type": "fan", "name": "Fan2", "state": "ok",
         "input": 4100, "min": 2000, "max": 8000, "var": 500}
    ]"#,
    );
    let ledmgrd = write_tool(dir.path(), "ledmgrd", "[]");

    let reader = PlatformReader::with_paths(smonctl, ledmgrd);
    let mut monitor = EnvMonitor::with_reader("switch01", reader);
    let sink = RecordingSink::default();

    monitor.collect(&sink).await.unwrap();

    let samples = sink.samples();
    assert_eq!(samples.len(), 1);
    assert_eq!(samples[0].instance, "fan2");
}
