//! Tracing subscriber bootstrap for binaries embedding the guard

use crate::error::TelemetryError;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Output format for [`try_init`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

/// Install a global fmt subscriber
///
/// `RUST_LOG` takes precedence over `default_directive`.
///
/// # Errors
/// Returns [`TelemetryError`] for a bad directive or when a global
/// subscriber is already installed.
pub fn try_init(default_directive: &str, format: LogFormat) -> Result<(), TelemetryError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directive)?,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    let installed = match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| TelemetryError::Install(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_fails() {
        let _ = try_init("debug", LogFormat::Pretty);
        let second = try_init("debug", LogFormat::Json);
        assert!(matches!(second, Err(TelemetryError::Install(_))));
    }
}
