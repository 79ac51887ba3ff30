//! Binary health state derived from upstream status text.

use serde::{Deserialize, Serialize};

/// Health of a single sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    Ok,
    NotOk,
}

impl HealthState {
    /// Derive health from an upstream `state` string.
    ///
    /// The platform tools report exactly `"ok"` (lowercase) for a healthy
    /// sensor; any other string, including case variants like `"OK"`, is
    /// unhealthy. The comparison is deliberately case-sensitive.
    pub fn from_state(state: &str) -> Self {
        if state == "ok" {
            HealthState::Ok
        } else {
            HealthState::NotOk
        }
    }

    /// Derive health for a status LED from its observed color and the
    /// known-good color the LED manager reports for it.
    pub fn from_led_colors(color: &str, good_color: &str) -> Self {
        if color == good_color {
            HealthState::Ok
        } else {
            HealthState::NotOk
        }
    }

    /// Encoding used in metric value sequences: 1 for OK, 0 for NOT_OK.
    pub fn as_value(self) -> f64 {
        match self {
            HealthState::Ok => 1.0,
            HealthState::NotOk => 0.0,
        }
    }

    pub fn is_ok(self) -> bool {
        self == HealthState::Ok
    }
}

impl std::fmt::Display for HealthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthState::Ok => write!(f, "ok"),
            HealthState::NotOk => write!(f, "not_ok"),
        }
    }
}
