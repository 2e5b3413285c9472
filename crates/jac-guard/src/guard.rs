//! Compilation guard
//!
//! Wraps the recovery registry and degradation engine with critical-error
//! detection and the stop-compilation circuit breaker. Every reported
//! failure goes through [`CompilationGuard::handle`] in a fixed order.

use crate::config::GuardConfig;
use crate::error::GuardError;
use crate::events::{EventLevel, EventSink, GuardEvent, TracingSink};
use crate::keys::{FallbackKeySource, SequentialKeys};
use crate::stats::{GuardStatistics, RunReport};
use indexmap::IndexMap;
use jac_diagnostics::{ErrorKind, ErrorRecord, Severity};
use jac_recovery::{GracefulDegradationEngine, RecoveryContext, RecoveryRegistry};
use serde_json::{json, Value};
use std::sync::Arc;

/// Codes that always count as critical
pub const CRITICAL_CODES: [&str; 5] = [
    "PARSE_PHASE_ERROR",
    "DISK_SPACE_ERROR",
    "PERMISSION_DENIED",
    "CIRCULAR_DEPENDENCY",
    "MISSING_REQUIRED_DEPENDENCY",
];

/// Codes that stop compilation unless critical errors are tolerated
pub const STOP_CODES: [&str; 3] = ["PARSE_PHASE_ERROR", "DISK_SPACE_ERROR", "PERMISSION_DENIED"];

/// Code of the record raised when the circuit breaker trips
pub const COMPILATION_STOPPED: &str = "COMPILATION_STOPPED";

/// A failure reported by the pipeline
#[derive(Debug)]
pub enum ReportedError {
    /// Already classified
    Record(ErrorRecord),
    /// Foreign error, wrapped as `General`
    Foreign(anyhow::Error),
}

impl ReportedError {
    fn into_record(self) -> ErrorRecord {
        match self {
            ReportedError::Record(record) => record,
            ReportedError::Foreign(error) => ErrorRecord::from_foreign(error),
        }
    }
}

impl From<ErrorRecord> for ReportedError {
    fn from(record: ErrorRecord) -> Self {
        ReportedError::Record(record)
    }
}

impl From<anyhow::Error> for ReportedError {
    fn from(error: anyhow::Error) -> Self {
        ReportedError::Foreign(error)
    }
}

/// Stateful failure handler for one compilation run
///
/// Owns all mutable recovery state. Not safe for concurrent mutation: use
/// [`CompilationGuard::fork`]/[`CompilationGuard::merge`] or
/// [`crate::SharedGuard`] when work runs in parallel.
#[derive(Debug)]
pub struct CompilationGuard {
    config: GuardConfig,
    error_count: u64,
    critical_count: u64,
    unrecovered_count: u64,
    stopped: bool,
    recovery: RecoveryRegistry,
    degradation: GracefulDegradationEngine,
    fallback_artifacts: IndexMap<String, Value>,
    related_by_code: IndexMap<String, Vec<ErrorRecord>>,
    sink: Arc<dyn EventSink>,
    keys: Arc<dyn FallbackKeySource>,
}

impl CompilationGuard {
    /// Create guard with the built-in strategies
    #[must_use]
    pub fn new(config: GuardConfig) -> Self {
        Self::with_registry(config, RecoveryRegistry::with_defaults())
    }

    /// Create guard around a registry built by the caller
    ///
    /// The registry's attempt budget is replaced by
    /// `config.max_recovery_attempts`.
    #[must_use]
    pub fn with_registry(config: GuardConfig, mut registry: RecoveryRegistry) -> Self {
        registry.set_max_attempts(config.max_recovery_attempts);
        Self {
            config,
            error_count: 0,
            critical_count: 0,
            unrecovered_count: 0,
            stopped: false,
            recovery: registry,
            degradation: GracefulDegradationEngine::new(),
            fallback_artifacts: IndexMap::new(),
            related_by_code: IndexMap::new(),
            sink: Arc::new(TracingSink),
            keys: Arc::new(SequentialKeys::new()),
        }
    }

    /// Send events to `sink`
    #[inline]
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Draw fallback key suffixes from `keys`
    #[inline]
    #[must_use]
    pub fn with_key_source(mut self, keys: Arc<dyn FallbackKeySource>) -> Self {
        self.keys = keys;
        self
    }

    /// Critical errors count toward the stop threshold and log as fatal
    #[must_use]
    pub fn is_critical(error: &ErrorRecord) -> bool {
        let critical_kind = match error.kind {
            ErrorKind::CompilationProcess | ErrorKind::File | ErrorKind::Dependency => true,
            ErrorKind::Validation
            | ErrorKind::Component
            | ErrorKind::Template
            | ErrorKind::Route
            | ErrorKind::Api
            | ErrorKind::Configuration
            | ErrorKind::General => false,
        };
        critical_kind
            || CRITICAL_CODES.contains(&error.code.as_str())
            || (error.severity == Severity::Error && !error.recoverable)
    }

    /// Whether `error`, already counted, trips the circuit breaker
    ///
    /// `continue_after_critical_errors` relaxes both the critical-count
    /// threshold and the stop codes; the total-error threshold always applies.
    #[must_use]
    pub fn should_stop(&self, error: &ErrorRecord) -> bool {
        let tolerate_critical = self.config.continue_after_critical_errors;
        self.error_count >= self.config.max_errors_before_stop
            || (self.critical_count >= self.config.critical_stop_threshold && !tolerate_critical)
            || (STOP_CODES.contains(&error.code.as_str()) && !tolerate_critical)
    }

    /// Handle one reported failure
    ///
    /// Returns `Ok(true)` when the failure was repaired (degraded, recovered
    /// or replaced by a fallback) and `Ok(false)` when it was only recorded
    /// or compilation is stopped.
    ///
    /// # Errors
    /// With `throw_on_error`, returns [`GuardError::Aborted`] when this
    /// report trips the circuit breaker and [`GuardError::Unrecovered`]
    /// when no repair path succeeded for a critical error (or for any error
    /// when critical errors are not tolerated).
    pub fn handle(
        &mut self,
        reported: impl Into<ReportedError>,
        ctx: &RecoveryContext<'_>,
    ) -> Result<bool, GuardError> {
        let error = reported.into().into_record();

        if self.stopped {
            self.emit(&GuardEvent::Rejected { code: error.code });
            return Ok(false);
        }

        self.error_count += 1;
        let critical = Self::is_critical(&error);
        if critical {
            self.critical_count += 1;
        }

        if self.should_stop(&error) {
            self.stopped = true;
            let reason = format!(
                "Compilation stopped after {} errors ({} critical)",
                self.error_count, self.critical_count
            );
            self.emit(&GuardEvent::Stopped {
                reason: reason.clone(),
                total_errors: self.error_count,
                critical_errors: self.critical_count,
            });
            if self.config.throw_on_error {
                let summary = ErrorRecord::compilation_process(reason)
                    .with_code(COMPILATION_STOPPED)
                    .with_recoverable(false)
                    .with_related(error);
                return Err(GuardError::Aborted {
                    record: Box::new(summary),
                });
            }
            return Ok(false);
        }

        let level = if critical {
            EventLevel::Fatal
        } else if self.config.downgrade_recoverable && error.recoverable {
            EventLevel::Warn
        } else {
            EventLevel::Error
        };
        self.emit(&GuardEvent::Reported {
            level,
            kind: error.kind,
            code: error.code.clone(),
            critical,
            text: error.format(),
        });

        if self.config.collect_related {
            self.related_by_code
                .entry(error.code.clone())
                .or_default()
                .push(error.clone());
        }

        if self.config.enable_graceful_degradation {
            if let Some(degraded) = self.degradation.degrade(&error, ctx) {
                self.emit(&GuardEvent::Degraded {
                    key: degraded.key.clone(),
                });
                self.fallback_artifacts.insert(degraded.key, degraded.artifact);
                return Ok(true);
            }
        }

        if self.config.attempt_recovery
            && error.recoverable
            && self.recovery.try_recover(&error, ctx)
        {
            self.emit(&GuardEvent::Recovered {
                code: error.code.clone(),
            });
            return Ok(true);
        }

        if self.config.create_fallback_implementations {
            let key = format!("fallback_{}_{}", error.kind, self.keys.next_id());
            let artifact = json!({
                "kind": error.kind,
                "code": error.code,
                "message": error.message,
                "placeholder": true,
                "component": ctx.current_component_id(),
                "route": ctx.current_route_path(),
                "api": ctx.current_api_path(),
                "file": ctx.current_file(),
            });
            self.emit(&GuardEvent::FallbackCreated { key: key.clone() });
            self.fallback_artifacts.insert(key, artifact);
            return Ok(true);
        }

        self.unrecovered_count += 1;
        if self.config.throw_on_error && (critical || !self.config.continue_after_critical_errors)
        {
            return Err(GuardError::Unrecovered(Box::new(error)));
        }

        self.emit(&GuardEvent::Unrecovered { code: error.code });
        Ok(false)
    }

    /// Force the circuit breaker open
    pub fn stop_compilation(&mut self, reason: impl Into<String>) {
        self.stopped = true;
        self.emit(&GuardEvent::Stopped {
            reason: reason.into(),
            total_errors: self.error_count,
            critical_errors: self.critical_count,
        });
    }

    /// Gate the pipeline checks before starting each unit of work
    #[inline]
    #[must_use]
    pub fn can_continue_compilation(&self) -> bool {
        !self.stopped
    }

    /// Circuit breaker state
    #[inline]
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Errors accepted for handling
    #[inline]
    #[must_use]
    pub fn error_count(&self) -> u64 {
        self.error_count
    }

    /// Errors counted as critical
    #[inline]
    #[must_use]
    pub fn critical_count(&self) -> u64 {
        self.critical_count
    }

    /// Errors accepted for handling that no repair path fixed
    #[inline]
    #[must_use]
    pub fn unrecovered_count(&self) -> u64 {
        self.unrecovered_count
    }

    /// Counters snapshot
    #[must_use]
    pub fn statistics(&self) -> GuardStatistics {
        GuardStatistics {
            total_errors: self.error_count,
            critical_errors: self.critical_count,
            recovered_errors: self.recovery.total_attempts(),
            unrecovered_errors: self.unrecovered_count,
            fallback_count: self.fallback_artifacts.len(),
            stopped: self.stopped,
        }
    }

    /// End-of-run report
    #[must_use]
    pub fn report(&self) -> RunReport {
        RunReport {
            statistics: self.statistics(),
            errors: self
                .recovery
                .errors()
                .iter()
                .map(ErrorRecord::to_compilation_error)
                .collect(),
            warnings: self.recovery.warnings().to_vec(),
            fallback_keys: self.fallback_artifacts.keys().cloned().collect(),
            aborted: self.stopped,
        }
    }

    /// Errors logged by the recovery registry
    #[inline]
    #[must_use]
    pub fn errors(&self) -> &[ErrorRecord] {
        self.recovery.errors()
    }

    /// Warnings logged by the recovery registry
    #[inline]
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        self.recovery.warnings()
    }

    /// Placeholder artifacts by key, in creation order
    #[inline]
    #[must_use]
    pub fn fallback_artifacts(&self) -> &IndexMap<String, Value> {
        &self.fallback_artifacts
    }

    /// One placeholder artifact
    #[inline]
    #[must_use]
    pub fn fallback_artifact(&self, key: &str) -> Option<&Value> {
        self.fallback_artifacts.get(key)
    }

    /// Errors reported with `code`, in order
    #[must_use]
    pub fn related_errors(&self, code: &str) -> &[ErrorRecord] {
        self.related_by_code
            .get(code)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The recovery registry
    #[inline]
    #[must_use]
    pub fn recovery_registry(&self) -> &RecoveryRegistry {
        &self.recovery
    }

    /// The recovery registry, for registering strategies
    #[inline]
    pub fn recovery_registry_mut(&mut self) -> &mut RecoveryRegistry {
        &mut self.recovery
    }

    /// Configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Zero every counter and collection and close the circuit breaker
    ///
    /// Registered strategies, sink and configuration are kept. The key
    /// source is rewound only while no fork shares it.
    pub fn reset(&mut self) {
        self.error_count = 0;
        self.critical_count = 0;
        self.unrecovered_count = 0;
        self.stopped = false;
        self.recovery.clear();
        self.fallback_artifacts.clear();
        self.related_by_code.clear();
        if Arc::strong_count(&self.keys) == 1 {
            self.keys.reset();
        }
        self.emit(&GuardEvent::Reset);
    }

    /// Guard for a parallel worker: same configuration, strategies, sink
    /// and key source, empty state
    #[must_use]
    pub fn fork(&self) -> Self {
        Self {
            config: self.config.clone(),
            error_count: 0,
            critical_count: 0,
            unrecovered_count: 0,
            stopped: false,
            recovery: self.recovery.fork(),
            degradation: self.degradation,
            fallback_artifacts: IndexMap::new(),
            related_by_code: IndexMap::new(),
            sink: Arc::clone(&self.sink),
            keys: Arc::clone(&self.keys),
        }
    }

    /// Fold a finished worker guard into this one
    ///
    /// Counters are summed, logs appended, artifacts and related errors
    /// unioned; a stopped worker stops this guard. Thresholds are not
    /// re-evaluated.
    pub fn merge(&mut self, other: CompilationGuard) {
        self.error_count += other.error_count;
        self.critical_count += other.critical_count;
        self.unrecovered_count += other.unrecovered_count;
        self.stopped |= other.stopped;
        self.recovery.absorb(other.recovery);
        self.fallback_artifacts.extend(other.fallback_artifacts);
        for (code, records) in other.related_by_code {
            self.related_by_code.entry(code).or_default().extend(records);
        }
    }

    fn emit(&self, event: &GuardEvent) {
        self.sink.emit(event);
    }
}

impl Default for CompilationGuard {
    fn default() -> Self {
        Self::new(GuardConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::MemorySink;
    use jac_diagnostics::SourceLocation;
    use jac_recovery::{CompilationContext, Phase};

    fn comp() -> CompilationContext {
        CompilationContext::new("shop", "dist")
    }

    fn guard(config: GuardConfig) -> (CompilationGuard, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let guard = CompilationGuard::new(config).with_sink(sink.clone());
        (guard, sink)
    }

    #[test]
    fn critical_by_kind_code_and_severity() {
        assert!(CompilationGuard::is_critical(&ErrorRecord::file("x")));
        assert!(CompilationGuard::is_critical(&ErrorRecord::dependency("x")));
        assert!(CompilationGuard::is_critical(
            &ErrorRecord::compilation_process("x")
        ));
        assert!(CompilationGuard::is_critical(
            &ErrorRecord::route("x").with_code("CIRCULAR_DEPENDENCY")
        ));
        assert!(CompilationGuard::is_critical(
            &ErrorRecord::component("x").with_recoverable(false)
        ));
        assert!(!CompilationGuard::is_critical(&ErrorRecord::component("x")));
        assert!(!CompilationGuard::is_critical(
            &ErrorRecord::configuration("x")
                .with_recoverable(false)
                .with_severity(Severity::Warning)
        ));
    }

    #[test]
    fn stop_code_stops_immediately() {
        let c = comp();
        let ctx = RecoveryContext::at(Phase::Parse, &c);
        let (mut guard, sink) = guard(GuardConfig::new());

        let err = ErrorRecord::validation("bad json").with_code("PARSE_PHASE_ERROR");
        assert!(!guard.handle(err, &ctx).unwrap());
        assert!(guard.is_stopped());
        assert!(!guard.can_continue_compilation());
        assert_eq!(sink.count_at(EventLevel::Fatal), 1);
    }

    #[test]
    fn continue_after_critical_ignores_stop_codes() {
        let c = comp();
        let ctx = RecoveryContext::at(Phase::Parse, &c);
        let (mut guard, _) = guard(GuardConfig::new().with_continue_after_critical(true));

        for _ in 0..10 {
            let err = ErrorRecord::file("denied").with_code("PERMISSION_DENIED");
            assert!(!guard.handle(err, &ctx).unwrap());
        }
        assert!(!guard.is_stopped());
        assert_eq!(guard.critical_count(), 10);
    }

    #[test]
    fn critical_threshold_stops() {
        let c = comp();
        let ctx = RecoveryContext::at(Phase::Plan, &c);
        let (mut guard, _) = guard(GuardConfig::new().with_critical_threshold(2));

        assert!(!guard.handle(ErrorRecord::dependency("a"), &ctx).unwrap());
        assert!(!guard.is_stopped());
        assert!(!guard.handle(ErrorRecord::dependency("b"), &ctx).unwrap());
        assert!(guard.is_stopped());
    }

    #[test]
    fn throw_on_stop_returns_abort_with_trigger() {
        let c = comp();
        let ctx = RecoveryContext::at(Phase::Plan, &c);
        let (mut guard, _) = guard(GuardConfig::new().with_max_errors(1).with_throw_on_error(true));

        let err = ErrorRecord::component("x");
        let result = guard.handle(err.clone(), &ctx);
        let Err(GuardError::Aborted { record }) = result else {
            panic!("expected abort, got {result:?}");
        };
        assert_eq!(record.kind, ErrorKind::CompilationProcess);
        assert_eq!(record.code, COMPILATION_STOPPED);
        assert_eq!(record.message, "Compilation stopped after 1 errors (0 critical)");
        assert_eq!(record.related, vec![err]);
    }

    #[test]
    fn log_level_selection() {
        let c = comp();
        let ctx = RecoveryContext::at(Phase::Plan, &c);
        let (mut guard, sink) = guard(
            GuardConfig::new()
                .without_repairs()
                .with_continue_after_critical(true),
        );

        guard.handle(ErrorRecord::component("recoverable"), &ctx).unwrap();
        guard
            .handle(
                ErrorRecord::component("not").with_recoverable(false).with_severity(Severity::Warning),
                &ctx,
            )
            .unwrap();
        guard.handle(ErrorRecord::file("critical"), &ctx).unwrap();

        let levels: Vec<_> = sink
            .events()
            .into_iter()
            .filter_map(|e| match e {
                GuardEvent::Reported { level, .. } => Some(level),
                _ => None,
            })
            .collect();
        assert_eq!(levels, vec![EventLevel::Warn, EventLevel::Error, EventLevel::Fatal]);
    }

    #[test]
    fn related_errors_grouped_by_code() {
        let c = comp();
        let ctx = RecoveryContext::at(Phase::Plan, &c);
        let (mut guard, _) = guard(GuardConfig::new().without_repairs());

        guard.handle(ErrorRecord::route("a").with_code("R"), &ctx).unwrap();
        guard.handle(ErrorRecord::route("b").with_code("R"), &ctx).unwrap();
        guard.handle(ErrorRecord::api("c"), &ctx).unwrap();

        assert_eq!(guard.related_errors("R").len(), 2);
        assert_eq!(guard.related_errors("API_ERROR").len(), 1);
        assert!(guard.related_errors("NONE").is_empty());
    }

    #[test]
    fn degradation_before_recovery() {
        let c = comp();
        let ctx = RecoveryContext::builder(Phase::Generate, &c)
            .route("/cart")
            .build()
            .unwrap();
        let (mut guard, _) = guard(GuardConfig::new());

        let err = ErrorRecord::route("dup").with_code("DUPLICATE_ROUTE");
        assert!(guard.handle(err, &ctx).unwrap());
        assert!(guard.fallback_artifact("route_/cart").is_some());
        assert_eq!(guard.recovery_registry().total_attempts(), 0);
    }

    #[test]
    fn recovery_when_degradation_disabled() {
        let c = comp();
        let ctx = RecoveryContext::builder(Phase::Generate, &c)
            .route("/cart")
            .build()
            .unwrap();
        let (mut guard, sink) = guard(GuardConfig::new().with_graceful_degradation(false));

        let err = ErrorRecord::route("dup").with_code("DUPLICATE_ROUTE");
        assert!(guard.handle(err, &ctx).unwrap());
        assert!(guard.fallback_artifacts().is_empty());
        assert_eq!(guard.statistics().recovered_errors, 1);
        assert!(sink
            .events()
            .contains(&GuardEvent::Recovered { code: "DUPLICATE_ROUTE".into() }));
    }

    #[test]
    fn unrecoverable_skips_registry() {
        let c = comp();
        let ctx = RecoveryContext::at(Phase::Plan, &c);
        let (mut guard, _) = guard(GuardConfig::new().with_continue_after_critical(true));

        let err = ErrorRecord::configuration("x").with_recoverable(false);
        assert!(!guard.handle(err, &ctx).unwrap());
        assert_eq!(guard.recovery_registry().total_attempts(), 0);
    }

    #[test]
    fn fallback_implementation_keys_are_sequential() {
        let c = comp();
        let ctx = RecoveryContext::builder(Phase::Generate, &c)
            .file("src/db.ts")
            .build()
            .unwrap();
        let (mut guard, _) = guard(
            GuardConfig::new()
                .with_graceful_degradation(false)
                .with_recovery(false)
                .with_fallback_implementations(true)
                .with_continue_after_critical(true),
        );

        assert!(guard.handle(ErrorRecord::dependency("a"), &ctx).unwrap());
        assert!(guard.handle(ErrorRecord::dependency("b"), &ctx).unwrap());

        let keys: Vec<_> = guard.fallback_artifacts().keys().cloned().collect();
        assert_eq!(keys, vec!["fallback_dependency_1", "fallback_dependency_2"]);
        let artifact = guard.fallback_artifact("fallback_dependency_1").unwrap();
        assert_eq!(artifact["placeholder"], true);
        assert_eq!(artifact["file"], "src/db.ts");
        assert_eq!(artifact["kind"], "dependency");
        assert!(artifact["component"].is_null());
    }

    #[test]
    fn throw_on_unrecovered_critical() {
        let c = comp();
        let ctx = RecoveryContext::at(Phase::Plan, &c);
        let (mut guard, _) = guard(
            GuardConfig::new()
                .with_throw_on_error(true)
                .with_continue_after_critical(true),
        );

        let non_critical = ErrorRecord::component("x");
        assert!(!guard.handle(non_critical, &ctx).unwrap());

        let critical = ErrorRecord::dependency("missing lodash");
        let err = guard.handle(critical.clone(), &ctx).unwrap_err();
        assert!(matches!(err, GuardError::Unrecovered(_)));
        assert_eq!(err.into_record(), critical);
    }

    #[test]
    fn throw_on_any_unrecovered_when_critical_not_tolerated() {
        let c = comp();
        let ctx = RecoveryContext::at(Phase::Plan, &c);
        let (mut guard, _) = guard(GuardConfig::new().with_throw_on_error(true));

        let result = guard.handle(ErrorRecord::component("x"), &ctx);
        assert!(matches!(result, Err(GuardError::Unrecovered(_))));
    }

    #[test]
    fn foreign_errors_become_general() {
        let c = comp();
        let ctx = RecoveryContext::at(Phase::Integrate, &c);
        let (mut guard, _) = guard(GuardConfig::new().with_continue_after_critical(true));

        let foreign = anyhow::anyhow!("socket closed");
        assert!(!guard.handle(foreign, &ctx).unwrap());
        let related = guard.related_errors("GENERAL_ERROR");
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].message, "socket closed");
        assert!(related[0].wrapped.is_some());
        assert_eq!(guard.critical_count(), 1);
    }

    #[test]
    fn stopped_guard_has_no_side_effects() {
        let c = comp();
        let ctx = RecoveryContext::at(Phase::Plan, &c);
        let (mut guard, sink) = guard(GuardConfig::new());
        guard.stop_compilation("user cancelled");
        let before = guard.statistics();
        sink.clear();

        let err = ErrorRecord::validation("x").with_location(SourceLocation::path("metadata"));
        assert!(!guard.handle(err, &ctx).unwrap());
        assert_eq!(guard.statistics(), before);
        assert!(guard.related_errors("VALIDATION_ERROR").is_empty());
        assert_eq!(
            sink.events(),
            vec![GuardEvent::Rejected {
                code: "VALIDATION_ERROR".into()
            }]
        );
    }

    #[test]
    fn manual_stop_bypasses_thresholds() {
        let (mut guard, sink) = guard(GuardConfig::new().with_continue_after_critical(true));
        assert!(guard.can_continue_compilation());
        guard.stop_compilation("disk full");
        assert!(guard.is_stopped());
        assert!(guard.statistics().stopped);
        assert_eq!(sink.count_at(EventLevel::Fatal), 1);
    }

    #[test]
    fn report_collects_outputs() {
        let c = comp();
        let ctx = RecoveryContext::builder(Phase::Generate, &c)
            .component("btn1")
            .build()
            .unwrap();
        let (mut guard, _) = guard(GuardConfig::new().with_continue_after_critical(true));

        guard.handle(ErrorRecord::component("x"), &ctx).unwrap();
        guard.handle(ErrorRecord::file("locked"), &ctx).unwrap();

        let report = guard.report();
        assert_eq!(report.statistics.total_errors, 2);
        assert_eq!(report.statistics.critical_errors, 1);
        assert_eq!(report.fallback_keys, vec!["component_btn1".to_string()]);
        assert!(!report.aborted);
        assert!(!report.is_clean());
    }

    #[test]
    fn unrepaired_critical_error_makes_report_unclean() {
        let c = comp();
        let ctx = RecoveryContext::at(Phase::Integrate, &c);
        let (mut guard, _) = guard(GuardConfig::new().with_continue_after_critical(true));

        assert!(!guard.handle(ErrorRecord::dependency("missing lodash"), &ctx).unwrap());
        assert_eq!(guard.unrecovered_count(), 1);

        let report = guard.report();
        assert!(report.errors.is_empty());
        assert_eq!(report.statistics.unrecovered_errors, 1);
        assert!(!report.is_clean());

        guard.reset();
        assert_eq!(guard.unrecovered_count(), 0);
        assert!(guard.report().is_clean());
    }

    #[test]
    fn thrown_unrecovered_error_is_counted() {
        let c = comp();
        let ctx = RecoveryContext::at(Phase::Plan, &c);
        let (mut guard, _) = guard(GuardConfig::new().with_throw_on_error(true));

        assert!(guard.handle(ErrorRecord::component("x"), &ctx).is_err());
        assert_eq!(guard.statistics().unrecovered_errors, 1);
    }
}
