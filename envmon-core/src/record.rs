//! Typed sensor records and projections over the raw diagnostic documents.
//!
//! The platform sensor monitor emits one heterogeneous array of objects,
//! discriminated by a `type` field; the LED manager emits an array where
//! every entry is an LED. The projections here partition those documents by
//! kind and map each raw entry to a typed record, skipping (with a warning)
//! any entry that is missing a required field so one malformed sensor never
//! poisons its siblings.

use serde_json::Value;
use tracing::warn;

use crate::error::{EnvmonError, Result};
use crate::health::HealthState;

/// One untyped entry of a raw diagnostic document.
pub type RawRecord = serde_json::Map<String, Value>;

/// A cooling fan reading.
#[derive(Debug, Clone, PartialEq)]
pub struct FanRecord {
    pub name: String,
    pub health: HealthState,
    /// Current speed in RPM; `None` if the tool reported null.
    pub current: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub variance: Option<f64>,
}

/// A power supply reading.
#[derive(Debug, Clone, PartialEq)]
pub struct PsuRecord {
    pub name: String,
    pub health: HealthState,
}

/// A temperature sensor reading.
#[derive(Debug, Clone, PartialEq)]
pub struct TempRecord {
    pub name: String,
    pub health: HealthState,
    /// Current reading, reported upstream as `avg`.
    pub current: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub crit: Option<f64>,
}

/// A status LED reading.
#[derive(Debug, Clone, PartialEq)]
pub struct LedRecord {
    pub name: String,
    pub health: HealthState,
}

impl FanRecord {
    pub fn from_raw(raw: &RawRecord) -> Result<Self> {
        Ok(Self {
            name: required_name(raw, "fan")?,
            health: HealthState::from_state(required_str(raw, "fan", "state")?),
            current: numeric_field(raw, "fan", "input")?,
            min: numeric_field(raw, "fan", "min")?,
            max: numeric_field(raw, "fan", "max")?,
            variance: numeric_field(raw, "fan", "var")?,
        })
    }
}

impl PsuRecord {
    pub fn from_raw(raw: &RawRecord) -> Result<Self> {
        Ok(Self {
            name: required_name(raw, "psu")?,
            health: HealthState::from_state(required_str(raw, "psu", "state")?),
        })
    }
}

impl TempRecord {
    pub fn from_raw(raw: &RawRecord) -> Result<Self> {
        Ok(Self {
            name: required_name(raw, "temp")?,
            health: HealthState::from_state(required_str(raw, "temp", "state")?),
            current: numeric_field(raw, "temp", "avg")?,
            min: numeric_field(raw, "temp", "min")?,
            max: numeric_field(raw, "temp", "max")?,
            crit: numeric_field(raw, "temp", "crit")?,
        })
    }
}

impl LedRecord {
    pub fn from_raw(raw: &RawRecord) -> Result<Self> {
        let color = required_str(raw, "led", "color")?;
        let good_color = required_str(raw, "led", "good_led_color")?;
        Ok(Self {
            health: HealthState::from_led_colors(color, good_color),
            name: required_name(raw, "led")?,
        })
    }
}

/// Project fans out of the platform-tools document.
pub fn project_fans(doc: &[RawRecord]) -> Vec<FanRecord> {
    project(doc, Some("fan"), FanRecord::from_raw)
}

/// Project power supplies out of the platform-tools document.
pub fn project_psus(doc: &[RawRecord]) -> Vec<PsuRecord> {
    project(doc, Some("power"), PsuRecord::from_raw)
}

/// Project temperature sensors out of the platform-tools document.
pub fn project_temps(doc: &[RawRecord]) -> Vec<TempRecord> {
    project(doc, Some("temp"), TempRecord::from_raw)
}

/// Project LEDs out of the LED-manager document. Every entry is an LED;
/// there is no discriminator.
pub fn project_leds(doc: &[RawRecord]) -> Vec<LedRecord> {
    project(doc, None, LedRecord::from_raw)
}

/// Filter a raw document by discriminator and map the survivors to typed
/// records, dropping entries with schema errors.
fn project<T>(
    doc: &[RawRecord],
    discriminator: Option<&str>,
    map: impl Fn(&RawRecord) -> Result<T>,
) -> Vec<T> {
    doc.iter()
        .filter(|raw| match discriminator {
            Some(wanted) => raw.get("type").and_then(Value::as_str) == Some(wanted),
            None => true,
        })
        .filter_map(|raw| match map(raw) {
            Ok(record) => Some(record),
            Err(error) => {
                warn!(%error, "skipping malformed sensor record");
                None
            }
        })
        .collect()
}

fn required_str<'a>(raw: &'a RawRecord, kind: &'static str, field: &'static str) -> Result<&'a str> {
    raw.get(field)
        .and_then(Value::as_str)
        .ok_or(EnvmonError::Schema { kind, field })
}

/// Sensor names are used as metric instance labels and must be non-empty.
fn required_name(raw: &RawRecord, kind: &'static str) -> Result<String> {
    let name = required_str(raw, kind, "name")?;
    if name.is_empty() {
        return Err(EnvmonError::schema(kind, "name"));
    }
    Ok(name.to_string())
}

/// A numeric field must be present; a JSON null is carried as `None` so the
/// dispatch layer can drop the incomplete sample.
fn numeric_field(raw: &RawRecord, kind: &'static str, field: &'static str) -> Result<Option<f64>> {
    match raw.get(field) {
        Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_f64()
            .map(Some)
            .ok_or(EnvmonError::Schema { kind, field }),
        None => Err(EnvmonError::Schema { kind, field }),
    }
}
