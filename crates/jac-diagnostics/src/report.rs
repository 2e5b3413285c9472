//! Plain reporting record
//!
//! [`CompilationError`] is the flattened, serializable form of an
//! [`ErrorRecord`] handed to report writers.

use crate::kind::{ErrorKind, Severity};
use crate::record::ErrorRecord;
use serde::{Deserialize, Serialize};

/// Flattened compilation error for reporting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilationError {
    /// Failure kind
    pub kind: ErrorKind,
    /// Machine-readable code
    pub code: String,
    /// Summary
    pub message: String,
    /// Reporting level
    pub severity: Severity,
    /// Longer explanation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Source file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    /// Column
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
    /// Document path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// User hints
    #[serde(default)]
    pub suggestions: Vec<String>,
}

impl ErrorRecord {
    /// Flatten into a [`CompilationError`]
    #[must_use]
    pub fn to_compilation_error(&self) -> CompilationError {
        CompilationError::from(self)
    }
}

impl From<&ErrorRecord> for CompilationError {
    fn from(record: &ErrorRecord) -> Self {
        let location = record.location.clone().unwrap_or_default();
        Self {
            kind: record.kind,
            code: record.code.clone(),
            message: record.message.clone(),
            severity: record.severity,
            details: record.details.clone(),
            file: location.file,
            line: location.line,
            column: location.column,
            path: location.path,
            suggestions: record.suggestions.clone(),
        }
    }
}

impl From<ErrorRecord> for CompilationError {
    fn from(record: ErrorRecord) -> Self {
        Self::from(&record)
    }
}
