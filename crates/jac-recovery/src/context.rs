//! Recovery context
//!
//! A [`RecoveryContext`] is an immutable snapshot of where in the pipeline a
//! failure happened. Cursor fields are validated once by
//! [`RecoveryContextBuilder::build`]; strategies and synthesizers read them
//! without further checks.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Compiler pipeline phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Reading the input document
    Parse,
    /// Schema and semantic validation
    Validate,
    /// Build planning
    Plan,
    /// Code generation
    Generate,
    /// Wiring generated pieces together
    Integrate,
    /// Output optimization
    Optimize,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Parse => "parse",
            Phase::Validate => "validate",
            Phase::Plan => "plan",
            Phase::Generate => "generate",
            Phase::Integrate => "integrate",
            Phase::Optimize => "optimize",
        };
        f.write_str(name)
    }
}

/// The part of the overall compilation the recovery engine may see
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompilationContext {
    /// Project being compiled
    pub project_name: String,
    /// Output directory of the build
    pub output_dir: PathBuf,
    /// Free-form compiler options
    #[serde(default)]
    pub options: serde_json::Map<String, serde_json::Value>,
}

impl CompilationContext {
    /// Create context for a project
    #[inline]
    #[must_use]
    pub fn new(project_name: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_name: project_name.into(),
            output_dir: output_dir.into(),
            options: serde_json::Map::new(),
        }
    }

    /// Set an option
    #[inline]
    #[must_use]
    pub fn with_option(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.options.insert(key.into(), value);
        self
    }
}

/// Invalid cursor handed to [`RecoveryContextBuilder`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    /// Cursor set to an empty string
    #[error("{field} must not be empty")]
    EmptyCursor {
        /// Cursor name
        field: &'static str,
    },

    /// Cursor carries leading or trailing whitespace
    #[error("{field} has surrounding whitespace: {value:?}")]
    UntrimmedCursor {
        /// Cursor name
        field: &'static str,
        /// Offending value
        value: String,
    },

    /// Route or API cursor not rooted at `/`
    #[error("{field} must start with '/': {value:?}")]
    RelativePath {
        /// Cursor name
        field: &'static str,
        /// Offending value
        value: String,
    },
}

/// Immutable snapshot of the pipeline position at a failure
#[derive(Debug, Clone)]
pub struct RecoveryContext<'a> {
    phase: Phase,
    compilation: &'a CompilationContext,
    current_component_id: Option<String>,
    current_route_path: Option<String>,
    current_api_path: Option<String>,
    current_file: Option<String>,
}

impl<'a> RecoveryContext<'a> {
    /// Start building a context for `phase`
    #[inline]
    #[must_use]
    pub fn builder(phase: Phase, compilation: &'a CompilationContext) -> RecoveryContextBuilder<'a> {
        RecoveryContextBuilder {
            phase,
            compilation,
            current_component_id: None,
            current_route_path: None,
            current_api_path: None,
            current_file: None,
        }
    }

    /// Context with no cursor set
    #[inline]
    #[must_use]
    pub fn at(phase: Phase, compilation: &'a CompilationContext) -> Self {
        Self {
            phase,
            compilation,
            current_component_id: None,
            current_route_path: None,
            current_api_path: None,
            current_file: None,
        }
    }

    /// Pipeline phase
    #[inline]
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Overall compilation
    #[inline]
    #[must_use]
    pub fn compilation(&self) -> &'a CompilationContext {
        self.compilation
    }

    /// Component being compiled
    #[inline]
    #[must_use]
    pub fn current_component_id(&self) -> Option<&str> {
        self.current_component_id.as_deref()
    }

    /// Route being compiled
    #[inline]
    #[must_use]
    pub fn current_route_path(&self) -> Option<&str> {
        self.current_route_path.as_deref()
    }

    /// API endpoint being compiled
    #[inline]
    #[must_use]
    pub fn current_api_path(&self) -> Option<&str> {
        self.current_api_path.as_deref()
    }

    /// File being generated
    #[inline]
    #[must_use]
    pub fn current_file(&self) -> Option<&str> {
        self.current_file.as_deref()
    }

    /// True if any cursor identifies an entity
    #[inline]
    #[must_use]
    pub fn has_cursor(&self) -> bool {
        self.current_component_id.is_some()
            || self.current_route_path.is_some()
            || self.current_api_path.is_some()
            || self.current_file.is_some()
    }
}

/// Builder for [`RecoveryContext`]
#[derive(Debug, Clone)]
#[must_use]
pub struct RecoveryContextBuilder<'a> {
    phase: Phase,
    compilation: &'a CompilationContext,
    current_component_id: Option<String>,
    current_route_path: Option<String>,
    current_api_path: Option<String>,
    current_file: Option<String>,
}

impl<'a> RecoveryContextBuilder<'a> {
    /// Set component cursor
    #[inline]
    pub fn component(mut self, id: impl Into<String>) -> Self {
        self.current_component_id = Some(id.into());
        self
    }

    /// Set route cursor
    #[inline]
    pub fn route(mut self, path: impl Into<String>) -> Self {
        self.current_route_path = Some(path.into());
        self
    }

    /// Set API cursor
    #[inline]
    pub fn api(mut self, path: impl Into<String>) -> Self {
        self.current_api_path = Some(path.into());
        self
    }

    /// Set file cursor
    #[inline]
    pub fn file(mut self, file: impl Into<String>) -> Self {
        self.current_file = Some(file.into());
        self
    }

    /// Validate cursors and freeze the context
    ///
    /// # Errors
    /// Returns [`ContextError`] for empty or whitespace-padded cursors and
    /// for route/API paths not starting with `/`.
    pub fn build(self) -> Result<RecoveryContext<'a>, ContextError> {
        check_cursor("current_component_id", self.current_component_id.as_deref())?;
        check_cursor("current_file", self.current_file.as_deref())?;
        check_rooted("current_route_path", self.current_route_path.as_deref())?;
        check_rooted("current_api_path", self.current_api_path.as_deref())?;

        Ok(RecoveryContext {
            phase: self.phase,
            compilation: self.compilation,
            current_component_id: self.current_component_id,
            current_route_path: self.current_route_path,
            current_api_path: self.current_api_path,
            current_file: self.current_file,
        })
    }
}

fn check_cursor(field: &'static str, value: Option<&str>) -> Result<(), ContextError> {
    let Some(value) = value else {
        return Ok(());
    };
    if value.is_empty() {
        return Err(ContextError::EmptyCursor { field });
    }
    if value.trim() != value {
        return Err(ContextError::UntrimmedCursor {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

fn check_rooted(field: &'static str, value: Option<&str>) -> Result<(), ContextError> {
    check_cursor(field, value)?;
    match value {
        Some(path) if !path.starts_with('/') => Err(ContextError::RelativePath {
            field,
            value: path.to_string(),
        }),
        _ => Ok(()),
    }
}
