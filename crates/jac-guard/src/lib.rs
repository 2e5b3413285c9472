//! JAC Guard
//!
//! Turns compilation failures into a repaired pipeline state, a downgraded
//! warning or a hard stop.
//!
//! - Classifies severity and counts critical errors
//! - Trips a stop-compilation circuit breaker on thresholds and stop codes
//! - Tries graceful degradation, then strategy recovery, then a generic fallback
//! - Reports statistics and the end-of-run summary
//!
//! # Example
//!
//! ```rust
//! use jac_diagnostics::ErrorRecord;
//! use jac_guard::{CompilationGuard, GuardConfig};
//! use jac_recovery::{CompilationContext, Phase, RecoveryContext};
//!
//! let compilation = CompilationContext::new("shop", "dist");
//! let mut guard = CompilationGuard::new(GuardConfig::new());
//!
//! let ctx = RecoveryContext::builder(Phase::Generate, &compilation)
//!     .component("btn1")
//!     .build()
//!     .unwrap();
//! let err = ErrorRecord::component("Unknown component").with_code("COMPONENT_NOT_FOUND");
//!
//! assert!(guard.handle(err, &ctx).unwrap());
//! assert!(guard.fallback_artifact("component_btn1").is_some());
//! assert!(guard.can_continue_compilation());
//! ```

#![warn(unreachable_pub)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod events;
pub mod guard;
pub mod keys;
pub mod shared;
pub mod stats;
pub mod telemetry;

pub use config::GuardConfig;
pub use error::{ConfigError, GuardError, TelemetryError};
pub use events::{EventLevel, EventSink, GuardEvent, MemorySink, TracingSink};
pub use guard::{
    CompilationGuard, ReportedError, COMPILATION_STOPPED, CRITICAL_CODES, STOP_CODES,
};
pub use keys::{FallbackKeySource, SequentialKeys, UlidKeys};
pub use shared::SharedGuard;
pub use stats::{GuardStatistics, RunReport};
pub use telemetry::LogFormat;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for embedding the guard in a pipeline
    pub use crate::{CompilationGuard, GuardConfig, GuardError, SharedGuard};
    pub use jac_diagnostics::{ErrorKind, ErrorRecord, Severity, SourceLocation};
    pub use jac_recovery::{CompilationContext, Phase, RecoveryContext, RecoveryRegistry};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
