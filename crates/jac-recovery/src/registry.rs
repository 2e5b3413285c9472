//! Strategy registry and dispatch
//!
//! Provides [`RecoveryRegistry`], which binds error codes to strategies,
//! keeps ordered fallbacks, enforces per-code attempt budgets and collects
//! the error and warning logs of one compilation run.

use crate::builtin::{
    ApiEndpointStrategy, DowngradeWarningStrategy, DuplicateRouteStrategy, InvalidPropsStrategy,
    MissingComponentStrategy, MissingFieldStrategy, SkipEntityStrategy, TemplateSyntaxStrategy,
    COMPONENT_NOT_FOUND, DUPLICATE_ROUTE, INVALID_API_ENDPOINT, INVALID_PROPS,
    MISSING_REQUIRED_FIELD, TEMPLATE_SYNTAX_ERROR,
};
use crate::context::RecoveryContext;
use crate::strategy::{Recovery, RecoveryResult, RecoveryStrategy};
use indexmap::IndexMap;
use jac_diagnostics::{ErrorKind, ErrorRecord};
use serde::Serialize;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Default per-code attempt budget
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Shared handle to a strategy
pub type StrategyRef = Arc<dyn RecoveryStrategy>;

/// Registry of recovery strategies plus the recovery logs of one run
///
/// Not safe for concurrent mutation; see [`RecoveryRegistry::fork`] and
/// [`RecoveryRegistry::absorb`] for fan-out.
#[derive(Debug, Clone)]
pub struct RecoveryRegistry {
    strategies: IndexMap<String, StrategyRef>,
    fallbacks: Vec<StrategyRef>,
    attempts: IndexMap<String, u32>,
    max_attempts: u32,
    errors: Vec<ErrorRecord>,
    warnings: Vec<String>,
    recoveries: Vec<Recovery>,
}

/// Counts reported by [`RecoveryRegistry::summary`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegistrySummary {
    /// Errors logged
    pub error_count: usize,
    /// Warnings logged
    pub warning_count: usize,
    /// Errors logged, by kind
    pub by_type: BTreeMap<ErrorKind, usize>,
}

enum Outcome {
    Recovered,
    Declined(Option<ErrorRecord>),
    Broken,
}

impl RecoveryRegistry {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            strategies: IndexMap::new(),
            fallbacks: Vec::new(),
            attempts: IndexMap::new(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            errors: Vec::new(),
            warnings: Vec::new(),
            recoveries: Vec::new(),
        }
    }

    /// Create registry with the built-in strategies
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(COMPONENT_NOT_FOUND, Arc::new(MissingComponentStrategy));
        registry.register(INVALID_PROPS, Arc::new(InvalidPropsStrategy));
        registry.register(DUPLICATE_ROUTE, Arc::new(DuplicateRouteStrategy));
        registry.register(TEMPLATE_SYNTAX_ERROR, Arc::new(TemplateSyntaxStrategy));
        registry.register(INVALID_API_ENDPOINT, Arc::new(ApiEndpointStrategy));
        registry.register(MISSING_REQUIRED_FIELD, Arc::new(MissingFieldStrategy));
        registry.register_fallback(Arc::new(DowngradeWarningStrategy));
        registry.register_fallback(Arc::new(SkipEntityStrategy));
        registry
    }

    /// Set the per-code attempt budget
    #[inline]
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Bind `strategy` to `code`, returning the strategy it replaces
    pub fn register(&mut self, code: impl Into<String>, strategy: StrategyRef) -> Option<StrategyRef> {
        self.strategies.insert(code.into(), strategy)
    }

    /// Append a fallback strategy
    pub fn register_fallback(&mut self, strategy: StrategyRef) {
        self.fallbacks.push(strategy);
    }

    /// Remove the strategy bound to `code`
    pub fn unregister(&mut self, code: &str) -> Option<StrategyRef> {
        self.strategies.shift_remove(code)
    }

    /// Check if a strategy is bound to `code`
    #[inline]
    #[must_use]
    pub fn has_strategy(&self, code: &str) -> bool {
        self.strategies.contains_key(code)
    }

    /// Codes with a bound strategy, in registration order
    #[must_use]
    pub fn codes(&self) -> Vec<&str> {
        self.strategies.keys().map(String::as_str).collect()
    }

    /// Number of fallback strategies
    #[inline]
    #[must_use]
    pub fn fallback_count(&self) -> usize {
        self.fallbacks.len()
    }

    /// Per-code attempt budget
    #[inline]
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Change the per-code attempt budget
    #[inline]
    pub fn set_max_attempts(&mut self, max_attempts: u32) {
        self.max_attempts = max_attempts;
    }

    /// Attempts made so far for `code`
    #[inline]
    #[must_use]
    pub fn attempts(&self, code: &str) -> u32 {
        self.attempts.get(code).copied().unwrap_or(0)
    }

    /// Attempts made so far across all codes
    #[must_use]
    pub fn total_attempts(&self) -> u64 {
        self.attempts.values().map(|&n| u64::from(n)).sum()
    }

    /// Try to repair `error`
    ///
    /// # Algorithm
    /// 1. Unrecoverable errors are logged and never reach a strategy.
    /// 2. Codes whose attempt budget is spent are logged with a warning.
    /// 3. The attempt is counted against the code.
    /// 4. The code-specific strategy runs; without one, fallbacks run in
    ///    registration order until one succeeds. Alternatives offered by
    ///    declining fallbacks are logged, and the original error is logged
    ///    once if none succeeds.
    ///
    /// Strategy errors and panics are contained: the error is logged with a
    /// diagnostic warning and `false` is returned.
    pub fn try_recover(&mut self, error: &ErrorRecord, ctx: &RecoveryContext<'_>) -> bool {
        if !error.recoverable {
            self.errors.push(error.clone());
            return false;
        }

        let spent = self.attempts(&error.code);
        if spent >= self.max_attempts {
            self.errors.push(error.clone());
            self.warnings.push(format!(
                "Maximum recovery attempts exceeded for error code {}",
                error.code
            ));
            return false;
        }
        self.attempts.insert(error.code.clone(), spent + 1);

        if let Some(strategy) = self.strategies.get(&error.code).cloned() {
            return match self.execute(&strategy, error, ctx) {
                Outcome::Recovered => true,
                Outcome::Declined(alternative) => {
                    self.errors
                        .push(alternative.unwrap_or_else(|| error.clone()));
                    false
                }
                Outcome::Broken => {
                    self.errors.push(error.clone());
                    false
                }
            };
        }

        let fallbacks = self.fallbacks.clone();
        for strategy in &fallbacks {
            match self.execute(strategy, error, ctx) {
                Outcome::Recovered => return true,
                Outcome::Declined(Some(alternative)) => self.errors.push(alternative),
                Outcome::Declined(None) | Outcome::Broken => {}
            }
        }
        self.errors.push(error.clone());
        false
    }

    /// Try to repair each error independently; returns how many were repaired
    pub fn try_recover_many<'e>(
        &mut self,
        errors: impl IntoIterator<Item = &'e ErrorRecord>,
        ctx: &RecoveryContext<'_>,
    ) -> usize {
        errors
            .into_iter()
            .map(|error| self.try_recover(error, ctx))
            .filter(|&recovered| recovered)
            .count()
    }

    fn execute(
        &mut self,
        strategy: &StrategyRef,
        error: &ErrorRecord,
        ctx: &RecoveryContext<'_>,
    ) -> Outcome {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| strategy.recover(error, ctx)));

        match outcome {
            Ok(Ok(RecoveryResult::Success {
                message,
                payload,
                downgrade_to_warning,
                partial,
            })) => {
                let message = if message.is_empty() {
                    format!("Recovered from {} using {}", error.code, strategy.name())
                } else {
                    message
                };
                self.warnings.push(message.clone());
                if downgrade_to_warning {
                    self.warnings.push(format!("[DOWNGRADED] {}", error.format()));
                }
                self.recoveries.push(Recovery {
                    code: error.code.clone(),
                    strategy: strategy.name().to_string(),
                    message,
                    payload,
                    partial,
                });
                Outcome::Recovered
            }
            Ok(Ok(RecoveryResult::Failure { alternative, .. })) => Outcome::Declined(alternative),
            Ok(Err(e)) => {
                self.warnings.push(format!(
                    "Recovery strategy '{}' failed for {}: {e}",
                    strategy.name(),
                    error.code
                ));
                Outcome::Broken
            }
            Err(payload) => {
                let reason = payload
                    .downcast_ref::<&str>()
                    .map(ToString::to_string)
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                self.warnings.push(format!(
                    "Recovery strategy '{}' panicked for {}: {reason}",
                    strategy.name(),
                    error.code
                ));
                Outcome::Broken
            }
        }
    }

    /// Logged errors, in order
    #[inline]
    #[must_use]
    pub fn errors(&self) -> &[ErrorRecord] {
        &self.errors
    }

    /// Logged warnings, in order
    #[inline]
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Successful repairs, in order
    #[inline]
    #[must_use]
    pub fn recoveries(&self) -> &[Recovery] {
        &self.recoveries
    }

    /// Logged errors of one kind
    #[must_use]
    pub fn errors_by_type(&self, kind: ErrorKind) -> Vec<&ErrorRecord> {
        self.errors.iter().filter(|e| e.kind == kind).collect()
    }

    /// Logged errors with one code
    #[must_use]
    pub fn errors_by_code(&self, code: &str) -> Vec<&ErrorRecord> {
        self.errors.iter().filter(|e| e.code == code).collect()
    }

    /// Check for logged errors
    #[inline]
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Check for logged warnings
    #[inline]
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Error and warning counts
    #[must_use]
    pub fn summary(&self) -> RegistrySummary {
        let mut by_type = BTreeMap::new();
        for error in &self.errors {
            *by_type.entry(error.kind).or_insert(0) += 1;
        }
        RegistrySummary {
            error_count: self.errors.len(),
            warning_count: self.warnings.len(),
            by_type,
        }
    }

    /// Empty the logs and attempt counts; registered strategies stay
    pub fn clear(&mut self) {
        self.errors.clear();
        self.warnings.clear();
        self.recoveries.clear();
        self.attempts.clear();
    }

    /// Registry with the same strategies and budget but empty state
    #[must_use]
    pub fn fork(&self) -> Self {
        Self {
            strategies: self.strategies.clone(),
            fallbacks: self.fallbacks.clone(),
            max_attempts: self.max_attempts,
            ..Self::new()
        }
    }

    /// Merge the state of a forked registry into this one
    ///
    /// Attempt counts are summed; logs are appended after this registry's.
    pub fn absorb(&mut self, other: RecoveryRegistry) {
        for (code, n) in other.attempts {
            *self.attempts.entry(code).or_insert(0) += n;
        }
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        self.recoveries.extend(other.recoveries);
    }
}

impl Default for RecoveryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{CompilationContext, Phase};
    use crate::strategy::StrategyError;
    use jac_diagnostics::Severity;
    use serde_json::Value;

    #[derive(Debug)]
    struct Succeeds;

    impl RecoveryStrategy for Succeeds {
        fn recover(
            &self,
            _error: &ErrorRecord,
            _ctx: &RecoveryContext<'_>,
        ) -> Result<RecoveryResult, StrategyError> {
            Ok(RecoveryResult::success("", Value::Null))
        }

        fn name(&self) -> &str {
            "succeeds"
        }
    }

    #[derive(Debug)]
    struct Declines(Option<ErrorRecord>);

    impl RecoveryStrategy for Declines {
        fn recover(
            &self,
            _error: &ErrorRecord,
            _ctx: &RecoveryContext<'_>,
        ) -> Result<RecoveryResult, StrategyError> {
            let mut result = RecoveryResult::failure("no");
            if let Some(alt) = &self.0 {
                result = result.with_alternative(alt.clone());
            }
            Ok(result)
        }

        fn name(&self) -> &str {
            "declines"
        }
    }

    #[derive(Debug)]
    struct Errors;

    impl RecoveryStrategy for Errors {
        fn recover(
            &self,
            _error: &ErrorRecord,
            _ctx: &RecoveryContext<'_>,
        ) -> Result<RecoveryResult, StrategyError> {
            Err(StrategyError::Failed("broken".into()))
        }

        fn name(&self) -> &str {
            "errors"
        }
    }

    #[derive(Debug)]
    struct Panics;

    impl RecoveryStrategy for Panics {
        fn recover(
            &self,
            _error: &ErrorRecord,
            _ctx: &RecoveryContext<'_>,
        ) -> Result<RecoveryResult, StrategyError> {
            panic!("strategy exploded")
        }

        fn name(&self) -> &str {
            "panics"
        }
    }

    fn comp() -> CompilationContext {
        CompilationContext::new("shop", "dist")
    }

    fn recoverable(code: &str) -> ErrorRecord {
        ErrorRecord::component("boom").with_code(code)
    }

    #[test]
    fn defaults_registered() {
        let registry = RecoveryRegistry::with_defaults();
        assert!(registry.has_strategy(COMPONENT_NOT_FOUND));
        assert!(registry.has_strategy(MISSING_REQUIRED_FIELD));
        assert_eq!(registry.fallback_count(), 2);
        assert_eq!(registry.max_attempts(), DEFAULT_MAX_ATTEMPTS);
    }

    #[test]
    fn unrecoverable_is_logged_once() {
        let c = comp();
        let ctx = RecoveryContext::at(Phase::Plan, &c);
        let mut registry = RecoveryRegistry::new();
        registry.register("X", Arc::new(Succeeds));

        let err = recoverable("X").with_recoverable(false);
        assert!(!registry.try_recover(&err, &ctx));
        assert_eq!(registry.errors(), &[err]);
        assert_eq!(registry.attempts("X"), 0);
        assert!(!registry.has_warnings());
    }

    #[test]
    fn success_uses_default_message() {
        let c = comp();
        let ctx = RecoveryContext::at(Phase::Plan, &c);
        let mut registry = RecoveryRegistry::new();
        registry.register("X", Arc::new(Succeeds));

        assert!(registry.try_recover(&recoverable("X"), &ctx));
        assert_eq!(registry.warnings(), &["Recovered from X using succeeds".to_string()]);
        assert_eq!(registry.recoveries().len(), 1);
        assert_eq!(registry.recoveries()[0].strategy, "succeeds");
    }

    #[test]
    fn downgrade_adds_formatted_warning() {
        let c = comp();
        let ctx = RecoveryContext::builder(Phase::Generate, &c)
            .component("btn1")
            .build()
            .unwrap();
        let mut registry = RecoveryRegistry::with_defaults();

        let err = recoverable(COMPONENT_NOT_FOUND);
        assert!(registry.try_recover(&err, &ctx));
        assert_eq!(registry.warnings().len(), 2);
        assert_eq!(
            registry.warnings()[1],
            format!("[DOWNGRADED] {}", err.format())
        );
    }

    #[test]
    fn budget_is_per_code() {
        let c = comp();
        let ctx = RecoveryContext::at(Phase::Plan, &c);
        let mut registry = RecoveryRegistry::new().with_max_attempts(1);
        registry.register("A", Arc::new(Succeeds));
        registry.register("B", Arc::new(Succeeds));

        assert!(registry.try_recover(&recoverable("A"), &ctx));
        assert!(!registry.try_recover(&recoverable("A"), &ctx));
        assert!(registry.try_recover(&recoverable("B"), &ctx));
        assert!(registry
            .warnings()
            .contains(&"Maximum recovery attempts exceeded for error code A".to_string()));
        assert_eq!(registry.total_attempts(), 2);
    }

    #[test]
    fn failure_logs_alternative() {
        let c = comp();
        let ctx = RecoveryContext::at(Phase::Plan, &c);
        let alt = ErrorRecord::route("replacement");
        let mut registry = RecoveryRegistry::new();
        registry.register("X", Arc::new(Declines(Some(alt.clone()))));

        assert!(!registry.try_recover(&recoverable("X"), &ctx));
        assert_eq!(registry.errors(), &[alt]);
    }

    #[test]
    fn failure_without_alternative_logs_original() {
        let c = comp();
        let ctx = RecoveryContext::at(Phase::Plan, &c);
        let mut registry = RecoveryRegistry::new();
        registry.register("X", Arc::new(Declines(None)));

        let err = recoverable("X");
        assert!(!registry.try_recover(&err, &ctx));
        assert_eq!(registry.errors(), &[err]);
    }

    #[test]
    fn fallbacks_run_in_order_until_success() {
        let c = comp();
        let ctx = RecoveryContext::at(Phase::Plan, &c);
        let mut registry = RecoveryRegistry::new();
        registry.register_fallback(Arc::new(Declines(None)));
        registry.register_fallback(Arc::new(Succeeds));

        assert!(registry.try_recover(&recoverable("UNBOUND"), &ctx));
        assert!(!registry.has_errors());
        assert_eq!(registry.recoveries()[0].strategy, "succeeds");
    }

    #[test]
    fn exhausted_fallbacks_log_error_once() {
        let c = comp();
        let ctx = RecoveryContext::at(Phase::Plan, &c);
        let mut registry = RecoveryRegistry::new();
        registry.register_fallback(Arc::new(Declines(None)));
        registry.register_fallback(Arc::new(Declines(None)));

        let err = recoverable("UNBOUND");
        assert!(!registry.try_recover(&err, &ctx));
        assert_eq!(registry.errors(), &[err]);
    }

    #[test]
    fn declining_fallback_alternative_is_logged() {
        let c = comp();
        let ctx = RecoveryContext::at(Phase::Plan, &c);
        let alt = recoverable("ALT");
        let mut registry = RecoveryRegistry::new();
        registry.register_fallback(Arc::new(Declines(Some(alt.clone()))));
        registry.register_fallback(Arc::new(Declines(None)));

        let err = recoverable("UNBOUND");
        assert!(!registry.try_recover(&err, &ctx));
        assert_eq!(registry.errors(), &[alt, err]);
    }

    #[test]
    fn no_strategies_logs_error() {
        let c = comp();
        let ctx = RecoveryContext::at(Phase::Plan, &c);
        let mut registry = RecoveryRegistry::new();
        assert!(!registry.try_recover(&recoverable("UNBOUND"), &ctx));
        assert_eq!(registry.errors().len(), 1);
        assert_eq!(registry.attempts("UNBOUND"), 1);
    }

    #[test]
    fn strategy_error_is_contained() {
        let c = comp();
        let ctx = RecoveryContext::at(Phase::Plan, &c);
        let mut registry = RecoveryRegistry::new();
        registry.register("X", Arc::new(Errors));

        assert!(!registry.try_recover(&recoverable("X"), &ctx));
        assert_eq!(registry.errors().len(), 1);
        assert!(registry.warnings()[0].contains("'errors' failed for X: broken"));
    }

    #[test]
    fn strategy_panic_is_contained() {
        let c = comp();
        let ctx = RecoveryContext::at(Phase::Plan, &c);
        let mut registry = RecoveryRegistry::new();
        registry.register("X", Arc::new(Panics));

        assert!(!registry.try_recover(&recoverable("X"), &ctx));
        assert_eq!(registry.errors().len(), 1);
        assert!(registry.warnings()[0].contains("panicked for X: strategy exploded"));
    }

    #[test]
    fn try_recover_many_does_not_short_circuit() {
        let c = comp();
        let ctx = RecoveryContext::at(Phase::Plan, &c);
        let mut registry = RecoveryRegistry::new();
        registry.register("OK", Arc::new(Succeeds));

        let batch = vec![
            recoverable("OK"),
            recoverable("NOPE"),
            recoverable("OK").with_recoverable(false),
            recoverable("OK"),
        ];
        assert_eq!(registry.try_recover_many(&batch, &ctx), 2);
        assert_eq!(registry.errors().len(), 2);
        assert_eq!(registry.attempts("OK"), 2);
    }

    #[test]
    fn queries_and_summary() {
        let c = comp();
        let ctx = RecoveryContext::at(Phase::Plan, &c);
        let mut registry = RecoveryRegistry::new();

        registry.try_recover(&ErrorRecord::route("a").with_code("R1"), &ctx);
        registry.try_recover(&ErrorRecord::route("b").with_code("R2"), &ctx);
        registry.try_recover(&ErrorRecord::file("c"), &ctx);

        assert_eq!(registry.errors_by_type(ErrorKind::Route).len(), 2);
        assert_eq!(registry.errors_by_code("FILE_ERROR").len(), 1);

        let summary = registry.summary();
        assert_eq!(summary.error_count, 3);
        assert_eq!(summary.warning_count, 0);
        assert_eq!(summary.by_type.get(&ErrorKind::Route), Some(&2));
        assert_eq!(summary.by_type.get(&ErrorKind::File), Some(&1));
    }

    #[test]
    fn clear_keeps_strategies() {
        let c = comp();
        let ctx = RecoveryContext::at(Phase::Plan, &c);
        let mut registry = RecoveryRegistry::with_defaults().with_max_attempts(1);
        let err = ErrorRecord::configuration("x").with_severity(Severity::Warning);
        registry.try_recover(&err, &ctx);
        registry.try_recover(&err, &ctx);
        assert!(registry.has_errors());

        registry.clear();
        assert!(!registry.has_errors());
        assert!(!registry.has_warnings());
        assert!(registry.recoveries().is_empty());
        assert_eq!(registry.total_attempts(), 0);
        assert!(registry.has_strategy(COMPONENT_NOT_FOUND));
        assert!(registry.try_recover(&err, &ctx));
    }

    #[test]
    fn fork_and_absorb() {
        let c = comp();
        let ctx = RecoveryContext::at(Phase::Plan, &c);
        let mut main = RecoveryRegistry::new().with_max_attempts(5);
        main.register("X", Arc::new(Succeeds));
        main.try_recover(&recoverable("X"), &ctx);

        let mut worker = main.fork();
        assert_eq!(worker.max_attempts(), 5);
        assert_eq!(worker.total_attempts(), 0);
        assert!(worker.try_recover(&recoverable("X"), &ctx));
        worker.try_recover(&recoverable("Y"), &ctx);

        main.absorb(worker);
        assert_eq!(main.attempts("X"), 2);
        assert_eq!(main.attempts("Y"), 1);
        assert_eq!(main.errors().len(), 1);
        assert_eq!(main.recoveries().len(), 2);
    }
}
