//! Statistics and the end-of-run report

use jac_diagnostics::CompilationError;
use serde::Serialize;

/// Counters exposed by [`crate::CompilationGuard::statistics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GuardStatistics {
    /// Errors accepted for handling
    pub total_errors: u64,
    /// Errors counted as critical
    pub critical_errors: u64,
    /// Strategy attempts across all codes
    pub recovered_errors: u64,
    /// Errors no repair path fixed
    pub unrecovered_errors: u64,
    /// Placeholder artifacts synthesized
    pub fallback_count: usize,
    /// Circuit breaker tripped
    pub stopped: bool,
}

/// What the user sees at the end of a run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunReport {
    /// Counters
    pub statistics: GuardStatistics,
    /// Errors logged by the recovery registry
    pub errors: Vec<CompilationError>,
    /// Repair messages and downgraded errors
    pub warnings: Vec<String>,
    /// Keys of synthesized placeholder artifacts
    pub fallback_keys: Vec<String>,
    /// Run was aborted by the circuit breaker
    pub aborted: bool,
}

impl RunReport {
    /// Check whether the run produced complete output
    #[inline]
    #[must_use]
    pub fn is_clean(&self) -> bool {
        !self.aborted
            && self.statistics.unrecovered_errors == 0
            && self.errors.is_empty()
            && self.fallback_keys.is_empty()
    }
}
