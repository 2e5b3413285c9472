//! Error kinds and severities
//!
//! The taxonomy is closed: every place that branches on kind matches
//! [`ErrorKind`] exhaustively.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Failure kind reported by the compiler pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Input document failed schema or semantic validation
    Validation,
    /// Component could not be resolved or rendered
    Component,
    /// Package or module dependency problem
    Dependency,
    /// Code template failed to render
    Template,
    /// File system failure
    File,
    /// Route definition problem
    Route,
    /// API endpoint definition problem
    Api,
    /// The compilation process itself failed
    CompilationProcess,
    /// Compiler configuration problem
    Configuration,
    /// Wrapped foreign error
    General,
}

impl ErrorKind {
    /// All kinds, in declaration order
    pub const ALL: [ErrorKind; 10] = [
        ErrorKind::Validation,
        ErrorKind::Component,
        ErrorKind::Dependency,
        ErrorKind::Template,
        ErrorKind::File,
        ErrorKind::Route,
        ErrorKind::Api,
        ErrorKind::CompilationProcess,
        ErrorKind::Configuration,
        ErrorKind::General,
    ];

    /// Code assigned to a record when the reporter gives none
    #[must_use]
    pub fn default_code(self) -> &'static str {
        match self {
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::Component => "COMPONENT_ERROR",
            ErrorKind::Dependency => "DEPENDENCY_ERROR",
            ErrorKind::Template => "TEMPLATE_ERROR",
            ErrorKind::File => "FILE_ERROR",
            ErrorKind::Route => "ROUTE_ERROR",
            ErrorKind::Api => "API_ERROR",
            ErrorKind::CompilationProcess => "COMPILATION_PROCESS_ERROR",
            ErrorKind::Configuration => "CONFIGURATION_ERROR",
            ErrorKind::General => "GENERAL_ERROR",
        }
    }

    /// Whether records of this kind are eligible for repair unless told otherwise
    #[must_use]
    pub fn default_recoverable(self) -> bool {
        match self {
            ErrorKind::Validation
            | ErrorKind::Component
            | ErrorKind::Template
            | ErrorKind::Route
            | ErrorKind::Api
            | ErrorKind::Configuration => true,
            ErrorKind::Dependency
            | ErrorKind::File
            | ErrorKind::CompilationProcess
            | ErrorKind::General => false,
        }
    }

    /// Snake-case name used in keys and logs
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Component => "component",
            ErrorKind::Dependency => "dependency",
            ErrorKind::Template => "template",
            ErrorKind::File => "file",
            ErrorKind::Route => "route",
            ErrorKind::Api => "api",
            ErrorKind::CompilationProcess => "compilation_process",
            ErrorKind::Configuration => "configuration",
            ErrorKind::General => "general",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How loudly a record should be reported
///
/// Independent of recoverability: an `Error` may still be repairable.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational
    Info,
    /// Worth surfacing, output still correct
    Warning,
    /// Output is wrong or missing
    #[default]
    Error,
}

impl Severity {
    /// Prefix used by [`crate::ErrorRecord::format`]
    #[inline]
    #[must_use]
    pub fn prefix(self) -> &'static str {
        match self {
            Severity::Info => "[INFO]",
            Severity::Warning => "[WARNING]",
            Severity::Error => "[ERROR]",
        }
    }
}
