//! The error record shared by every stage of the compiler

use crate::kind::{ErrorKind, Severity};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};
use std::sync::Arc;

/// Opaque foreign error kept alongside a record
pub type WrappedError = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// Where in the input a failure was detected
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Source file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// 1-based line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    /// 1-based column
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
    /// Dotted path into the input document, e.g. `metadata.name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl SourceLocation {
    /// Location pointing at a file
    #[inline]
    #[must_use]
    pub fn file(file: impl Into<String>) -> Self {
        Self {
            file: Some(file.into()),
            ..Self::default()
        }
    }

    /// Location pointing at a document path
    #[inline]
    #[must_use]
    pub fn path(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Set line and column
    #[inline]
    #[must_use]
    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    /// True when no field is set
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.file.is_none() && self.line.is_none() && self.column.is_none() && self.path.is_none()
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut wrote = false;
        if let Some(file) = &self.file {
            f.write_str(file)?;
            if let Some(line) = self.line {
                write!(f, ":{line}")?;
                if let Some(column) = self.column {
                    write!(f, ":{column}")?;
                }
            }
            wrote = true;
        }
        if let Some(path) = &self.path {
            if wrote {
                write!(f, " ({path})")?;
            } else {
                f.write_str(path)?;
            }
        }
        Ok(())
    }
}

/// A reported compilation failure
///
/// `severity` and `recoverable` are independent axes. `related` owns its
/// children, so the structure is a tree and never a cycle.
#[derive(Clone, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// Failure kind
    pub kind: ErrorKind,
    /// Human-readable summary
    pub message: String,
    /// Longer explanation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Where the failure was detected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
    /// Ordered hints for the user
    #[serde(default)]
    pub suggestions: Vec<String>,
    /// Eligible for automated repair
    pub recoverable: bool,
    /// Machine-readable code; strategies are bound by code
    pub code: String,
    /// Reporting level
    #[serde(default)]
    pub severity: Severity,
    /// Type or name of the entity that failed (component type, route component, API method)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Errors reported together with this one
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<ErrorRecord>,
    /// Foreign error this record was built from
    #[serde(skip)]
    pub wrapped: Option<WrappedError>,
}

impl ErrorRecord {
    /// Create a record with the kind's default code and recoverability
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
            location: None,
            suggestions: Vec::new(),
            recoverable: kind.default_recoverable(),
            code: kind.default_code().to_string(),
            severity: Severity::Error,
            subject: None,
            related: Vec::new(),
            wrapped: None,
        }
    }

    /// Validation failure
    #[inline]
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Component failure
    #[inline]
    #[must_use]
    pub fn component(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Component, message)
    }

    /// Dependency failure
    #[inline]
    #[must_use]
    pub fn dependency(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Dependency, message)
    }

    /// Template failure
    #[inline]
    #[must_use]
    pub fn template(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Template, message)
    }

    /// File system failure
    #[inline]
    #[must_use]
    pub fn file(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::File, message)
    }

    /// Route failure
    #[inline]
    #[must_use]
    pub fn route(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Route, message)
    }

    /// API endpoint failure
    #[inline]
    #[must_use]
    pub fn api(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Api, message)
    }

    /// Compilation process failure
    #[inline]
    #[must_use]
    pub fn compilation_process(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CompilationProcess, message)
    }

    /// Configuration failure
    #[inline]
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Wrap a foreign error as a `General` record
    ///
    /// The message is the error's display text; the error itself is kept
    /// in `wrapped` and exposed through [`std::error::Error::source`].
    #[must_use]
    pub fn from_foreign(error: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>) -> Self {
        let boxed: Box<dyn std::error::Error + Send + Sync + 'static> = error.into();
        let mut record = Self::new(ErrorKind::General, boxed.to_string());
        record.wrapped = Some(Arc::from(boxed));
        record
    }

    /// Set code
    #[inline]
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// Set details
    #[inline]
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Set location
    #[inline]
    #[must_use]
    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Append a suggestion
    #[inline]
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Override recoverability
    #[inline]
    #[must_use]
    pub fn with_recoverable(mut self, recoverable: bool) -> Self {
        self.recoverable = recoverable;
        self
    }

    /// Set severity
    #[inline]
    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Set subject
    #[inline]
    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Attach a related record
    #[inline]
    #[must_use]
    pub fn with_related(mut self, related: ErrorRecord) -> Self {
        self.related.push(related);
        self
    }

    /// Attach the source error
    #[inline]
    #[must_use]
    pub fn with_source(
        mut self,
        source: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    ) -> Self {
        let boxed: Box<dyn std::error::Error + Send + Sync + 'static> = source.into();
        self.wrapped = Some(Arc::from(boxed));
        self
    }

    /// Document path from the location, if any
    #[inline]
    #[must_use]
    pub fn location_path(&self) -> Option<&str> {
        self.location.as_ref().and_then(|l| l.path.as_deref())
    }

    /// Multi-line human-readable rendering
    ///
    /// First line is `<severity prefix> <code>: <message>`; location,
    /// details, suggestions and related count follow when present.
    #[must_use]
    pub fn format(&self) -> String {
        let mut out = format!("{} {}: {}", self.severity.prefix(), self.code, self.message);
        if let Some(location) = self.location.as_ref().filter(|l| !l.is_empty()) {
            let _ = write!(out, "\n  at {location}");
        }
        if let Some(details) = &self.details {
            let _ = write!(out, "\n  details: {details}");
        }
        if !self.suggestions.is_empty() {
            out.push_str("\n  suggestions:");
            for suggestion in &self.suggestions {
                let _ = write!(out, "\n    - {suggestion}");
            }
        }
        if !self.related.is_empty() {
            let _ = write!(out, "\n  related: {}", self.related.len());
        }
        out
    }
}

impl fmt::Debug for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorRecord")
            .field("kind", &self.kind)
            .field("code", &self.code)
            .field("message", &self.message)
            .field("severity", &self.severity)
            .field("recoverable", &self.recoverable)
            .field("details", &self.details)
            .field("location", &self.location)
            .field("suggestions", &self.suggestions)
            .field("subject", &self.subject)
            .field("related", &self.related)
            .field("wrapped", &self.wrapped.as_ref().map(ToString::to_string))
            .finish()
    }
}

impl PartialEq for ErrorRecord {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.message == other.message
            && self.details == other.details
            && self.location == other.location
            && self.suggestions == other.suggestions
            && self.recoverable == other.recoverable
            && self.code == other.code
            && self.severity == other.severity
            && self.subject == other.subject
            && self.related == other.related
            && self.wrapped.as_ref().map(ToString::to_string)
                == other.wrapped.as_ref().map(ToString::to_string)
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ErrorRecord {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.wrapped
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}
