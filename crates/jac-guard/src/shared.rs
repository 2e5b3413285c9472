//! Mutex-serialized guard for pipelines that report from several threads

use crate::error::GuardError;
use crate::guard::{CompilationGuard, ReportedError};
use crate::stats::GuardStatistics;
use jac_recovery::RecoveryContext;
use parking_lot::Mutex;
use std::sync::Arc;

/// Cloneable handle serializing every call behind one lock
#[derive(Debug, Clone)]
pub struct SharedGuard {
    inner: Arc<Mutex<CompilationGuard>>,
}

impl SharedGuard {
    /// Wrap a guard
    #[inline]
    #[must_use]
    pub fn new(guard: CompilationGuard) -> Self {
        Self {
            inner: Arc::new(Mutex::new(guard)),
        }
    }

    /// See [`CompilationGuard::handle`]
    ///
    /// # Errors
    /// Same as [`CompilationGuard::handle`].
    pub fn handle(
        &self,
        reported: impl Into<ReportedError>,
        ctx: &RecoveryContext<'_>,
    ) -> Result<bool, GuardError> {
        self.inner.lock().handle(reported, ctx)
    }

    /// See [`CompilationGuard::can_continue_compilation`]
    #[must_use]
    pub fn can_continue_compilation(&self) -> bool {
        self.inner.lock().can_continue_compilation()
    }

    /// See [`CompilationGuard::stop_compilation`]
    pub fn stop_compilation(&self, reason: impl Into<String>) {
        self.inner.lock().stop_compilation(reason);
    }

    /// See [`CompilationGuard::statistics`]
    #[must_use]
    pub fn statistics(&self) -> GuardStatistics {
        self.inner.lock().statistics()
    }

    /// Run `f` with exclusive access to the guard
    pub fn with_guard<R>(&self, f: impl FnOnce(&mut CompilationGuard) -> R) -> R {
        f(&mut self.inner.lock())
    }

    /// Recover the guard if this is the last handle
    ///
    /// # Errors
    /// Returns `self` unchanged while other handles are alive.
    pub fn try_into_inner(self) -> Result<CompilationGuard, Self> {
        Arc::try_unwrap(self.inner)
            .map(Mutex::into_inner)
            .map_err(|inner| Self { inner })
    }
}

impl From<CompilationGuard> for SharedGuard {
    fn from(guard: CompilationGuard) -> Self {
        Self::new(guard)
    }
}
