//! JAC Recovery
//!
//! Pluggable repair logic for compilation failures.
//!
//! # Core Concepts
//!
//! - [`RecoveryContext`]: Immutable snapshot of where a failure happened
//! - [`RecoveryStrategy`]: Core trait for repair logic
//! - [`RecoveryRegistry`]: Code-to-strategy bindings, fallbacks, attempt budgets and logs
//! - [`GracefulDegradationEngine`]: Placeholder synthesizers that bypass the registry
//!
//! # Example
//!
//! ```rust
//! use jac_diagnostics::ErrorRecord;
//! use jac_recovery::{CompilationContext, Phase, RecoveryContext, RecoveryRegistry};
//!
//! let compilation = CompilationContext::new("shop", "dist");
//! let ctx = RecoveryContext::builder(Phase::Generate, &compilation)
//!     .component("btn1")
//!     .build()
//!     .unwrap();
//!
//! let mut registry = RecoveryRegistry::with_defaults();
//! let err = ErrorRecord::component("Unknown component").with_code("COMPONENT_NOT_FOUND");
//!
//! assert!(registry.try_recover(&err, &ctx));
//! assert!(registry.has_warnings());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod builtin;
mod context;
mod degradation;
mod registry;
mod strategy;

pub use context::{
    CompilationContext, ContextError, Phase, RecoveryContext, RecoveryContextBuilder,
};
pub use degradation::{default_for_path, Degraded, GracefulDegradationEngine};
pub use registry::{RecoveryRegistry, RegistrySummary, StrategyRef, DEFAULT_MAX_ATTEMPTS};
pub use strategy::{Recovery, RecoveryResult, RecoveryStrategy, StrategyError};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
