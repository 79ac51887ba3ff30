//! Error types for the platform health core.

use thiserror::Error;

/// Result type alias using [`EnvmonError`].
pub type Result<T> = std::result::Result<T, EnvmonError>;

/// Errors that can occur while collecting platform health telemetry.
#[derive(Debug, Error)]
pub enum EnvmonError {
    /// The plugin option table accepts no keywords at all.
    #[error("config: unknown keyword `{key}`")]
    UnknownKeyword { key: String },

    /// A diagnostic tool could not be started, timed out, or exited non-zero.
    #[error("failed to run {tool}: {message}")]
    Execution { tool: String, message: String },

    /// A diagnostic tool produced output that is not a JSON array of objects.
    #[error("{tool} produced unparseable output: {message}")]
    Parse { tool: String, message: String },

    /// A raw record is missing a required field or carries the wrong type.
    /// Scoped to that record; siblings are unaffected.
    #[error("{kind} record missing or invalid field `{field}`")]
    Schema {
        kind: &'static str,
        field: &'static str,
    },

    /// The metric sink rejected a publish. Scoped to one dispatch call.
    #[error("failed to publish {key}: {message}")]
    Sink { key: String, message: String },

    /// Collect was called before init.
    #[error("collector used before init")]
    NotInitialized,
}

impl EnvmonError {
    /// Create an execution error for a tool.
    pub fn execution(tool: impl Into<String>, message: impl ToString) -> Self {
        Self::Execution {
            tool: tool.into(),
            message: message.to_string(),
        }
    }

    /// Create a parse error for a tool's output.
    pub fn parse(tool: impl Into<String>, message: impl ToString) -> Self {
        Self::Parse {
            tool: tool.into(),
            message: message.to_string(),
        }
    }

    /// Create a schema error for a record field.
    pub fn schema(kind: &'static str, field: &'static str) -> Self {
        Self::Schema { kind, field }
    }

    /// Create a sink error for a metric key.
    pub fn sink(key: impl Into<String>, message: impl ToString) -> Self {
        Self::Sink {
            key: key.into(),
            message: message.to_string(),
        }
    }
}
