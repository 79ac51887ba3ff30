//! Switch platform health normalization core.
//!
//! This crate turns the output of a switch's platform-management tools into
//! uniform, typed metric samples:
//!
//! - [`reader`] - invokes the diagnostic tools and holds the parsed snapshot
//! - [`record`] - typed per-kind sensor records and raw-document projections
//! - [`health`] - binary OK/NOT_OK health derivation
//! - [`metric`] - the flat metric sample handed to a [`MetricSink`]
//! - [`collector`] - the per-tick fetch/project/dispatch pipeline
//! - [`error`] - error taxonomy
//!
//! The core has no dependency on any particular host or transport: a host
//! drives an [`EnvMonitor`] through the [`Collector`] interface and supplies
//! its own [`MetricSink`] implementation.

pub mod collector;
pub mod error;
pub mod health;
pub mod metric;
pub mod reader;
pub mod record;

pub use collector::{Collector, EnvMonitor};
pub use error::{EnvmonError, Result};
pub use health::HealthState;
pub use metric::{MetricSample, MetricSink, NAMESPACE, current_timestamp_millis};
pub use reader::{PlatformReader, PlatformSnapshot};
pub use record::{FanRecord, LedRecord, PsuRecord, RawRecord, TempRecord};
