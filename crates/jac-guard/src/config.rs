//! Guard configuration

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Compilation guard configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Total errors after which compilation stops
    pub max_errors_before_stop: u64,
    /// Critical errors after which compilation stops
    pub critical_stop_threshold: u64,
    /// Relax the critical-count and stop-code rules
    pub continue_after_critical_errors: bool,
    /// Surface unrepaired errors and stops as `Err`
    pub throw_on_error: bool,
    /// Log recoverable errors at warning level
    pub downgrade_recoverable: bool,
    /// Group reported errors by code
    pub collect_related: bool,
    /// Try placeholder synthesis before strategies
    pub enable_graceful_degradation: bool,
    /// Dispatch recoverable errors to the strategy registry
    pub attempt_recovery: bool,
    /// Synthesize a generic placeholder when nothing else worked
    pub create_fallback_implementations: bool,
    /// Per-code strategy attempt budget
    pub max_recovery_attempts: u32,
}

impl GuardConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML document
    ///
    /// # Errors
    /// Returns [`ConfigError`] on malformed input or invalid values.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse from a JSON document
    ///
    /// # Errors
    /// Returns [`ConfigError`] on malformed input or invalid values.
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] for a zero error threshold, critical
    /// threshold or attempt budget.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_errors_before_stop == 0 {
            return Err(ConfigError::Invalid(
                "max_errors_before_stop must be at least 1".into(),
            ));
        }
        if self.critical_stop_threshold == 0 {
            return Err(ConfigError::Invalid(
                "critical_stop_threshold must be at least 1".into(),
            ));
        }
        if self.max_recovery_attempts == 0 {
            return Err(ConfigError::Invalid(
                "max_recovery_attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// With max errors before stop
    #[inline]
    #[must_use]
    pub fn with_max_errors(mut self, max: u64) -> Self {
        self.max_errors_before_stop = max;
        self
    }

    /// With critical stop threshold
    #[inline]
    #[must_use]
    pub fn with_critical_threshold(mut self, threshold: u64) -> Self {
        self.critical_stop_threshold = threshold;
        self
    }

    /// With continue-after-critical policy
    #[inline]
    #[must_use]
    pub fn with_continue_after_critical(mut self, enabled: bool) -> Self {
        self.continue_after_critical_errors = enabled;
        self
    }

    /// With throw-on-error policy
    #[inline]
    #[must_use]
    pub fn with_throw_on_error(mut self, enabled: bool) -> Self {
        self.throw_on_error = enabled;
        self
    }

    /// With graceful degradation toggle
    #[inline]
    #[must_use]
    pub fn with_graceful_degradation(mut self, enabled: bool) -> Self {
        self.enable_graceful_degradation = enabled;
        self
    }

    /// With strategy recovery toggle
    #[inline]
    #[must_use]
    pub fn with_recovery(mut self, enabled: bool) -> Self {
        self.attempt_recovery = enabled;
        self
    }

    /// With fallback synthesis toggle
    #[inline]
    #[must_use]
    pub fn with_fallback_implementations(mut self, enabled: bool) -> Self {
        self.create_fallback_implementations = enabled;
        self
    }

    /// With per-code attempt budget
    #[inline]
    #[must_use]
    pub fn with_max_recovery_attempts(mut self, max: u32) -> Self {
        self.max_recovery_attempts = max;
        self
    }

    /// Disable degradation, strategy recovery and fallback synthesis
    #[inline]
    #[must_use]
    pub fn without_repairs(self) -> Self {
        self.with_graceful_degradation(false)
            .with_recovery(false)
            .with_fallback_implementations(false)
    }
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            max_errors_before_stop: 50,
            critical_stop_threshold: 5,
            continue_after_critical_errors: false,
            throw_on_error: false,
            downgrade_recoverable: true,
            collect_related: true,
            enable_graceful_degradation: true,
            attempt_recovery: true,
            create_fallback_implementations: false,
            max_recovery_attempts: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = GuardConfig::new();
        assert_eq!(config.max_errors_before_stop, 50);
        assert_eq!(config.critical_stop_threshold, 5);
        assert_eq!(config.max_recovery_attempts, 3);
        assert!(!config.continue_after_critical_errors);
        assert!(config.enable_graceful_degradation);
        assert!(!config.create_fallback_implementations);
    }

    #[test]
    fn toml_overrides_and_defaults() {
        let config = GuardConfig::from_toml_str(
            r"
            max_errors_before_stop = 10
            throw_on_error = true
            ",
        )
        .unwrap();
        assert_eq!(config.max_errors_before_stop, 10);
        assert!(config.throw_on_error);
        assert!(config.attempt_recovery);
    }

    #[test]
    fn json_round_trip() {
        let config = GuardConfig::new().with_max_errors(7).without_repairs();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(GuardConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn rejects_zero_budget() {
        let err = GuardConfig::from_json_str(r#"{"max_recovery_attempts": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_zero_critical_threshold() {
        let err = GuardConfig::from_toml_str("critical_stop_threshold = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ref m) if m.contains("critical_stop_threshold")));
        assert!(GuardConfig::new().with_critical_threshold(0).validate().is_err());
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = GuardConfig::from_toml_str("max_errors_before_stop = \"many\"").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }
}
