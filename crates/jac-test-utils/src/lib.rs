//! Testing utilities for JAC workspace
//!
//! Shared fixtures and instrumented strategies.

#![allow(missing_docs)]

use jac_diagnostics::{ErrorRecord, SourceLocation};
use jac_recovery::{
    CompilationContext, Phase, RecoveryContext, RecoveryResult, RecoveryStrategy, StrategyError,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub fn compilation_context() -> CompilationContext {
    CompilationContext::new("storefront", "dist")
}

pub fn bare_context(phase: Phase, compilation: &CompilationContext) -> RecoveryContext<'_> {
    RecoveryContext::at(phase, compilation)
}

pub fn component_context<'a>(
    compilation: &'a CompilationContext,
    component_id: &str,
) -> RecoveryContext<'a> {
    RecoveryContext::builder(Phase::Generate, compilation)
        .component(component_id)
        .build()
        .unwrap()
}

pub fn route_context<'a>(compilation: &'a CompilationContext, path: &str) -> RecoveryContext<'a> {
    RecoveryContext::builder(Phase::Plan, compilation)
        .route(path)
        .build()
        .unwrap()
}

pub fn api_context<'a>(compilation: &'a CompilationContext, path: &str) -> RecoveryContext<'a> {
    RecoveryContext::builder(Phase::Generate, compilation)
        .api(path)
        .build()
        .unwrap()
}

pub fn component_error(code: &str) -> ErrorRecord {
    ErrorRecord::component(format!("component failed: {code}")).with_code(code)
}

pub fn permission_denied() -> ErrorRecord {
    ErrorRecord::file("cannot write dist/index.html")
        .with_code("PERMISSION_DENIED")
        .with_recoverable(false)
}

pub fn validation_error_at(path: &str) -> ErrorRecord {
    ErrorRecord::validation(format!("invalid value at {path}"))
        .with_location(SourceLocation::path(path))
}

/// Counts invocations and answers with a fixed outcome
#[derive(Debug)]
pub struct CountingStrategy {
    succeed: bool,
    calls: Arc<AtomicUsize>,
}

impl CountingStrategy {
    pub fn succeeding() -> (Self, Arc<AtomicUsize>) {
        Self::with_outcome(true)
    }

    pub fn failing() -> (Self, Arc<AtomicUsize>) {
        Self::with_outcome(false)
    }

    fn with_outcome(succeed: bool) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                succeed,
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }
}

impl RecoveryStrategy for CountingStrategy {
    fn recover(
        &self,
        error: &ErrorRecord,
        _ctx: &RecoveryContext<'_>,
    ) -> Result<RecoveryResult, StrategyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.succeed {
            Ok(RecoveryResult::success(
                format!("counted {}", error.code),
                serde_json::Value::Null,
            ))
        } else {
            Ok(RecoveryResult::failure("counted failure"))
        }
    }

    fn name(&self) -> &str {
        "counting"
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysSucceeds;

impl RecoveryStrategy for AlwaysSucceeds {
    fn recover(
        &self,
        error: &ErrorRecord,
        _ctx: &RecoveryContext<'_>,
    ) -> Result<RecoveryResult, StrategyError> {
        Ok(RecoveryResult::success(
            format!("recovered {}", error.code),
            serde_json::json!({ "code": error.code }),
        ))
    }

    fn name(&self) -> &str {
        "always_succeeds"
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysFails;

impl RecoveryStrategy for AlwaysFails {
    fn recover(
        &self,
        _error: &ErrorRecord,
        _ctx: &RecoveryContext<'_>,
    ) -> Result<RecoveryResult, StrategyError> {
        Ok(RecoveryResult::failure("never applies"))
    }

    fn name(&self) -> &str {
        "always_fails"
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PanickingStrategy;

impl RecoveryStrategy for PanickingStrategy {
    fn recover(
        &self,
        _error: &ErrorRecord,
        _ctx: &RecoveryContext<'_>,
    ) -> Result<RecoveryResult, StrategyError> {
        panic!("misbehaving strategy")
    }

    fn name(&self) -> &str {
        "panicking"
    }
}

/// Declines every error and offers a replacement record
#[derive(Debug, Clone)]
pub struct DecliningStrategy {
    alternative: ErrorRecord,
}

impl DecliningStrategy {
    pub fn with_alternative(alternative: ErrorRecord) -> Self {
        Self { alternative }
    }
}

impl RecoveryStrategy for DecliningStrategy {
    fn recover(
        &self,
        _error: &ErrorRecord,
        _ctx: &RecoveryContext<'_>,
    ) -> Result<RecoveryResult, StrategyError> {
        Ok(RecoveryResult::failure("declined").with_alternative(self.alternative.clone()))
    }

    fn name(&self) -> &str {
        "declining"
    }
}
