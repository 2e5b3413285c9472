//! Guard events and sinks
//!
//! The guard never logs directly. Each decision produces a [`GuardEvent`]
//! that is handed to an injected [`EventSink`]; the sink performs the I/O.

use jac_diagnostics::ErrorKind;
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;

/// Event level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventLevel {
    /// Diagnostics
    Debug,
    /// Normal progress
    Info,
    /// Degraded but continuing
    Warn,
    /// Failure
    Error,
    /// Failure that stops or threatens the run
    Fatal,
}

impl EventLevel {
    /// Lowercase name, used as a metrics label
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EventLevel::Debug => "debug",
            EventLevel::Info => "info",
            EventLevel::Warn => "warn",
            EventLevel::Error => "error",
            EventLevel::Fatal => "fatal",
        }
    }
}

impl fmt::Display for EventLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Something the guard decided
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GuardEvent {
    /// A report arrived after the circuit breaker tripped
    Rejected {
        /// Code of the rejected error
        code: String,
    },

    /// The circuit breaker tripped
    Stopped {
        /// Why
        reason: String,
        /// Errors seen so far
        total_errors: u64,
        /// Critical errors seen so far
        critical_errors: u64,
    },

    /// An error was accepted for handling
    Reported {
        /// Level chosen for the record
        level: EventLevel,
        /// Error kind
        kind: ErrorKind,
        /// Error code
        code: String,
        /// Counted as critical
        critical: bool,
        /// Formatted record
        text: String,
    },

    /// A placeholder replaced the failed entity
    Degraded {
        /// Artifact key
        key: String,
    },

    /// A strategy repaired the error
    Recovered {
        /// Error code
        code: String,
    },

    /// A generic placeholder was synthesized
    FallbackCreated {
        /// Artifact key
        key: String,
    },

    /// No repair path succeeded
    Unrecovered {
        /// Error code
        code: String,
    },

    /// Guard state was reset
    Reset,
}

impl GuardEvent {
    /// Level the event is reported at
    #[must_use]
    pub fn level(&self) -> EventLevel {
        match self {
            GuardEvent::Rejected { .. } => EventLevel::Warn,
            GuardEvent::Stopped { .. } => EventLevel::Fatal,
            GuardEvent::Reported { level, .. } => *level,
            GuardEvent::Degraded { .. }
            | GuardEvent::Recovered { .. }
            | GuardEvent::FallbackCreated { .. }
            | GuardEvent::Reset => EventLevel::Info,
            GuardEvent::Unrecovered { .. } => EventLevel::Debug,
        }
    }
}

/// Receiver of guard events
pub trait EventSink: Send + Sync + fmt::Debug {
    /// Consume one event
    fn emit(&self, event: &GuardEvent);
}

/// Forwards events to `tracing` and counts them with `metrics`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &GuardEvent) {
        let level = event.level();
        metrics::counter!("jac_guard_events_total", "level" => level.as_str()).increment(1);

        match event {
            GuardEvent::Rejected { code } => {
                tracing::warn!(code = %code, "compilation stopped, ignoring error");
            }
            GuardEvent::Stopped {
                reason,
                total_errors,
                critical_errors,
            } => {
                tracing::error!(
                    fatal = true,
                    total_errors,
                    critical_errors,
                    "{reason}"
                );
            }
            GuardEvent::Reported {
                level,
                kind,
                code,
                critical,
                text,
            } => match level {
                EventLevel::Fatal => {
                    tracing::error!(fatal = true, kind = %kind, code = %code, critical, "{text}");
                }
                EventLevel::Error => {
                    tracing::error!(kind = %kind, code = %code, critical, "{text}");
                }
                EventLevel::Warn => {
                    tracing::warn!(kind = %kind, code = %code, critical, "{text}");
                }
                EventLevel::Info => {
                    tracing::info!(kind = %kind, code = %code, critical, "{text}");
                }
                EventLevel::Debug => {
                    tracing::debug!(kind = %kind, code = %code, critical, "{text}");
                }
            },
            GuardEvent::Degraded { key } => {
                tracing::info!(key = %key, "gracefully degraded");
            }
            GuardEvent::Recovered { code } => {
                tracing::info!(code = %code, "recovered");
            }
            GuardEvent::FallbackCreated { key } => {
                tracing::info!(key = %key, "created fallback implementation");
            }
            GuardEvent::Unrecovered { code } => {
                tracing::debug!(code = %code, "no recovery path succeeded");
            }
            GuardEvent::Reset => {
                tracing::info!("compilation guard reset");
            }
        }
    }
}

/// Keeps events in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    inner: Mutex<Vec<GuardEvent>>,
}

impl MemorySink {
    /// Create empty sink
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded events
    #[must_use]
    pub fn events(&self) -> Vec<GuardEvent> {
        self.inner.lock().clone()
    }

    /// Number of recorded events
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Check if no events were recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Number of recorded events at `level`
    #[must_use]
    pub fn count_at(&self, level: EventLevel) -> usize {
        self.inner.lock().iter().filter(|e| e.level() == level).count()
    }

    /// Drop recorded events
    pub fn clear(&self) {
        self.inner.lock().clear();
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: &GuardEvent) {
        self.inner.lock().push(event.clone());
    }
}
