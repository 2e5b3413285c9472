//! JAC Diagnostics
//!
//! Error taxonomy for the JSON application compiler.
//!
//! # Core Concepts
//!
//! - [`ErrorKind`]: Closed set of failure kinds
//! - [`Severity`]: Reporting level, independent of recoverability
//! - [`ErrorRecord`]: A reported failure with location, hints and related errors
//! - [`CompilationError`]: Flattened record for report writers
//!
//! # Example
//!
//! ```rust
//! use jac_diagnostics::{ErrorRecord, SourceLocation};
//!
//! let err = ErrorRecord::component("Unknown component 'Fancy'")
//!     .with_code("COMPONENT_NOT_FOUND")
//!     .with_location(SourceLocation::path("components[2]"))
//!     .with_suggestion("check the component name");
//!
//! assert!(err.recoverable);
//! assert!(err.format().starts_with("[ERROR] COMPONENT_NOT_FOUND"));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod kind;
mod record;
mod report;

pub use kind::{ErrorKind, Severity};
pub use record::{ErrorRecord, SourceLocation, WrappedError};
pub use report::CompilationError;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
