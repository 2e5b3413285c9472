//! Error types for the compilation guard

use jac_diagnostics::ErrorRecord;

/// Error surfaced by [`crate::CompilationGuard::handle`] when `throw_on_error` is set
#[derive(Debug, thiserror::Error)]
pub enum GuardError {
    /// The circuit breaker tripped on this report
    #[error("compilation aborted: {}", .record.message)]
    Aborted {
        /// Summary record; the triggering error is in `related`
        record: Box<ErrorRecord>,
    },

    /// Every repair path failed for this error
    #[error("unrecovered error: {0}")]
    Unrecovered(Box<ErrorRecord>),
}

impl GuardError {
    /// The record carried by the error
    #[inline]
    #[must_use]
    pub fn record(&self) -> &ErrorRecord {
        match self {
            Self::Aborted { record } | Self::Unrecovered(record) => record,
        }
    }

    /// Take the record out of the error
    #[inline]
    #[must_use]
    pub fn into_record(self) -> ErrorRecord {
        match self {
            Self::Aborted { record } | Self::Unrecovered(record) => *record,
        }
    }

    /// Check for a circuit-breaker abort
    #[inline]
    #[must_use]
    pub fn is_abort(&self) -> bool {
        matches!(self, Self::Aborted { .. })
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Malformed TOML
    #[error("invalid toml: {0}")]
    Toml(#[from] toml::de::Error),

    /// Malformed JSON
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    /// Value out of range
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Tracing bootstrap errors
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// Bad filter directive
    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    /// A global subscriber is already installed
    #[error("subscriber install failed: {0}")]
    Install(String),
}
