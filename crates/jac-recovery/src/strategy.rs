//! Recovery strategy trait and core types
//!
//! Provides the [`RecoveryStrategy`] trait for pluggable repair logic.

use crate::context::RecoveryContext;
use jac_diagnostics::ErrorRecord;
use serde::{Deserialize, Serialize};

/// Repair logic for one class of failure
///
/// # Contract
/// `recover()` must be a pure function of its inputs: no interior state,
/// no I/O. Returning [`RecoveryResult::Failure`] means "not applicable" and
/// lets the registry move on to the next fallback.
pub trait RecoveryStrategy: Send + Sync + std::fmt::Debug {
    /// Attempt to repair `error`
    ///
    /// # Errors
    /// Returns [`StrategyError`] when the strategy itself malfunctions. The
    /// registry isolates both errors and panics from its callers.
    fn recover(
        &self,
        error: &ErrorRecord,
        ctx: &RecoveryContext<'_>,
    ) -> Result<RecoveryResult, StrategyError>;

    /// Strategy name (for logs and recovery records)
    fn name(&self) -> &str;
}

/// Outcome of a single strategy invocation
#[derive(Debug, Clone, PartialEq)]
pub enum RecoveryResult {
    /// The failure was repaired
    Success {
        /// What was done
        message: String,
        /// Repaired fragment for the code generator
        payload: serde_json::Value,
        /// Also record the original error as a downgraded warning
        downgrade_to_warning: bool,
        /// Repair is incomplete
        partial: bool,
    },

    /// The strategy could not repair the failure
    Failure {
        /// Why not
        message: String,
        /// Error to record instead of the original
        alternative: Option<ErrorRecord>,
    },
}

impl RecoveryResult {
    /// Successful repair
    #[inline]
    #[must_use]
    pub fn success(message: impl Into<String>, payload: serde_json::Value) -> Self {
        Self::Success {
            message: message.into(),
            payload,
            downgrade_to_warning: false,
            partial: false,
        }
    }

    /// Strategy does not apply
    #[inline]
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
            alternative: None,
        }
    }

    /// Mark a success as downgraded to a warning; no-op on failures
    #[inline]
    #[must_use]
    pub fn downgraded(mut self) -> Self {
        if let Self::Success {
            downgrade_to_warning,
            ..
        } = &mut self
        {
            *downgrade_to_warning = true;
        }
        self
    }

    /// Mark a success as partial; no-op on failures
    #[inline]
    #[must_use]
    pub fn partial(mut self) -> Self {
        if let Self::Success { partial, .. } = &mut self {
            *partial = true;
        }
        self
    }

    /// Replace the error recorded for a failure; no-op on successes
    #[inline]
    #[must_use]
    pub fn with_alternative(mut self, error: ErrorRecord) -> Self {
        if let Self::Failure { alternative, .. } = &mut self {
            *alternative = Some(error);
        }
        self
    }

    /// Check for success
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Strategy malfunction
#[derive(Debug, thiserror::Error)]
pub enum StrategyError {
    /// Input the strategy needs is missing from the record
    #[error("missing input: {0}")]
    MissingInput(&'static str),

    /// Payload could not be built
    #[error("payload error: {0}")]
    Payload(#[from] serde_json::Error),

    /// Strategy-specific error
    #[error("{0}")]
    Failed(String),
}

/// A successful repair kept by the registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recovery {
    /// Error code that was repaired
    pub code: String,
    /// Strategy that repaired it
    pub strategy: String,
    /// Strategy message
    pub message: String,
    /// Repaired fragment
    pub payload: serde_json::Value,
    /// Repair is incomplete
    pub partial: bool,
}
