//! Platform tool invocation and snapshot management.
//!
//! A [`PlatformReader`] owns the paths of the two diagnostic tools and the
//! most recent pair of parsed documents. `refresh` fetches and parses both
//! documents before committing either, so a failure on the second tool never
//! leaves the reader in a half-updated state.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::Value;
use tokio::process::Command;
use tracing::debug;

use crate::error::{EnvmonError, Result};
use crate::record::{
    FanRecord, LedRecord, PsuRecord, RawRecord, TempRecord, project_fans, project_leds,
    project_psus, project_temps,
};

/// Default path of the platform sensor monitor.
pub const SMONCTL_PATH: &str = "/usr/sbin/smonctl";

/// Default path of the LED manager.
pub const LEDMGRD_PATH: &str = "/usr/sbin/ledmgrd";

/// Flag both tools take to request JSON output.
const JSON_FLAG: &str = "-j";

/// Bound on a single tool invocation; a hung tool must not stall the
/// collection loop forever.
const TOOL_TIMEOUT: Duration = Duration::from_secs(10);

/// One atomically-committed pair of parsed diagnostic documents.
#[derive(Debug, Clone, Default)]
pub struct PlatformSnapshot {
    smonctl: Vec<RawRecord>,
    ledmgrd: Vec<RawRecord>,
}

impl PlatformSnapshot {
    /// Build a snapshot from already-parsed documents. Used by tests to
    /// exercise the projections against fixtures without spawning anything.
    pub fn from_documents(smonctl: Vec<RawRecord>, ledmgrd: Vec<RawRecord>) -> Self {
        Self { smonctl, ledmgrd }
    }

    pub fn fans(&self) -> Vec<FanRecord> {
        project_fans(&self.smonctl)
    }

    pub fn psus(&self) -> Vec<PsuRecord> {
        project_psus(&self.smonctl)
    }

    pub fn temps(&self) -> Vec<TempRecord> {
        project_temps(&self.smonctl)
    }

    pub fn leds(&self) -> Vec<LedRecord> {
        project_leds(&self.ledmgrd)
    }
}

/// Reader over the two platform diagnostic tools.
#[derive(Debug)]
pub struct PlatformReader {
    smonctl_path: PathBuf,
    ledmgrd_path: PathBuf,
    timeout: Duration,
    snapshot: Option<PlatformSnapshot>,
}

impl Default for PlatformReader {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformReader {
    /// Reader over the tools at their standard install paths.
    pub fn new() -> Self {
        Self::with_paths(SMONCTL_PATH, LEDMGRD_PATH)
    }

    /// Reader over tools at non-standard paths.
    pub fn with_paths(smonctl: impl Into<PathBuf>, ledmgrd: impl Into<PathBuf>) -> Self {
        Self {
            smonctl_path: smonctl.into(),
            ledmgrd_path: ledmgrd.into(),
            timeout: TOOL_TIMEOUT,
            snapshot: None,
        }
    }

    /// Re-run both diagnostic tools and replace the held snapshot.
    ///
    /// Both documents are fetched and parsed before either is committed: if
    /// the second tool fails, the previous snapshot stays intact and the
    /// error is surfaced so the caller can abandon the cycle.
    pub async fn refresh(&mut self) -> Result<()> {
        let smonctl = run_tool(&self.smonctl_path, self.timeout).await?;
        let ledmgrd = run_tool(&self.ledmgrd_path, self.timeout).await?;

        debug!(
            smonctl_records = smonctl.len(),
            ledmgrd_records = ledmgrd.len(),
            "refreshed platform snapshot"
        );

        self.snapshot = Some(PlatformSnapshot { smonctl, ledmgrd });
        Ok(())
    }

    /// The most recently committed snapshot, if any refresh has succeeded.
    pub fn snapshot(&self) -> Option<&PlatformSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn fans(&self) -> Vec<FanRecord> {
        self.snapshot.as_ref().map(PlatformSnapshot::fans).unwrap_or_default()
    }

    pub fn psus(&self) -> Vec<PsuRecord> {
        self.snapshot.as_ref().map(PlatformSnapshot::psus).unwrap_or_default()
    }

    pub fn temps(&self) -> Vec<TempRecord> {
        self.snapshot.as_ref().map(PlatformSnapshot::temps).unwrap_or_default()
    }

    pub fn leds(&self) -> Vec<LedRecord> {
        self.snapshot.as_ref().map(PlatformSnapshot::leds).unwrap_or_default()
    }
}

/// Run one tool with the JSON flag and parse its stdout.
async fn run_tool(path: &Path, timeout: Duration) -> Result<Vec<RawRecord>> {
    let tool = tool_name(path);

    // kill_on_drop so an expired timeout also reaps the child.
    let output = tokio::time::timeout(
        timeout,
        Command::new(path).arg(JSON_FLAG).kill_on_drop(true).output(),
    )
    .await
    .map_err(|_| EnvmonError::execution(tool.as_str(), format!("timed out after {timeout:?}")))?
    .map_err(|e| EnvmonError::execution(tool.as_str(), e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(EnvmonError::execution(
            tool.as_str(),
            format!("exited with {}: {}", output.status, stderr.trim()),
        ));
    }

    parse_document(&tool, &output.stdout)
}

/// Parse a tool's stdout as a JSON array of objects.
fn parse_document(tool: &str, stdout: &[u8]) -> Result<Vec<RawRecord>> {
    let document: Value =
        serde_json::from_slice(stdout).map_err(|e| EnvmonError::parse(tool, e))?;

    let Value::Array(entries) = document else {
        return Err(EnvmonError::parse(tool, "expected a JSON array of objects"));
    };

    entries
        .into_iter()
        .map(|entry| match entry {
            Value::Object(record) => Ok(record),
            other => Err(EnvmonError::parse(
                tool,
                format!("expected an object, got {other}"),
            )),
        })
        .collect()
}

fn tool_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
