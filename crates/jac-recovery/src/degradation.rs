//! Graceful degradation
//!
//! Fabricates placeholder artifacts for failed entities without consulting
//! the strategy registry. One synthesizer per error kind; kinds without a
//! synthesizer never degrade.

use crate::context::{Phase, RecoveryContext};
use jac_diagnostics::{ErrorKind, ErrorRecord};
use serde_json::{json, Value};

/// A fabricated placeholder and the key it is stored under
#[derive(Debug, Clone, PartialEq)]
pub struct Degraded {
    /// Artifact key, e.g. `component_btn1`
    pub key: String,
    /// Placeholder artifact
    pub artifact: Value,
}

impl Degraded {
    fn new(key: String, artifact: Value) -> Self {
        Self { key, artifact }
    }
}

/// Per-kind placeholder synthesizers
#[derive(Debug, Clone, Copy, Default)]
pub struct GracefulDegradationEngine;

impl GracefulDegradationEngine {
    /// Create engine
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Run the synthesizer for `error.kind`
    ///
    /// Returns `None` when the kind has no synthesizer or its precondition
    /// does not hold, so the caller can fall through to strategy recovery.
    #[must_use]
    pub fn degrade(&self, error: &ErrorRecord, ctx: &RecoveryContext<'_>) -> Option<Degraded> {
        match error.kind {
            ErrorKind::Component => Self::component(error, ctx),
            ErrorKind::Template => Self::template(error, ctx),
            ErrorKind::Route => Self::route(error, ctx),
            ErrorKind::Api => Self::api(error, ctx),
            ErrorKind::Validation => Self::validation(error),
            ErrorKind::Dependency
            | ErrorKind::File
            | ErrorKind::CompilationProcess
            | ErrorKind::Configuration
            | ErrorKind::General => None,
        }
    }

    fn component(error: &ErrorRecord, ctx: &RecoveryContext<'_>) -> Option<Degraded> {
        let id = ctx.current_component_id()?;
        let artifact = json!({
            "id": id,
            "type": "ErrorBoundary",
            "props": {
                "original_type": error.subject.as_deref().unwrap_or("unknown"),
                "error_message": error.message,
                "show_error": true,
                "fallback": true,
            },
        });
        Some(Degraded::new(format!("component_{id}"), artifact))
    }

    fn template(error: &ErrorRecord, ctx: &RecoveryContext<'_>) -> Option<Degraded> {
        if ctx.phase() != Phase::Generate {
            return None;
        }
        let file = ctx.current_file().unwrap_or("unknown");
        Some(Degraded::new(
            format!("template_{file}"),
            Value::String(fallback_template(&error.message)),
        ))
    }

    fn route(error: &ErrorRecord, ctx: &RecoveryContext<'_>) -> Option<Degraded> {
        let path = ctx.current_route_path()?;
        let artifact = json!({
            "path": path,
            "component": "ErrorPage",
            "props": {
                "original_component": error.subject.as_deref().unwrap_or("unknown"),
                "error_message": error.message,
                "show_error": true,
            },
        });
        Some(Degraded::new(format!("route_{path}"), artifact))
    }

    fn api(error: &ErrorRecord, ctx: &RecoveryContext<'_>) -> Option<Degraded> {
        let path = ctx.current_api_path()?;
        Some(Degraded::new(
            format!("api_{path}"),
            Value::String(fallback_handler(&error.message)),
        ))
    }

    fn validation(error: &ErrorRecord) -> Option<Degraded> {
        let path = error.location_path()?;
        Some(Degraded::new(
            format!("validation_{path}"),
            default_for_path(path),
        ))
    }
}

/// Default value substituted for an invalid document section
#[must_use]
pub fn default_for_path(path: &str) -> Value {
    if path.contains("metadata") {
        json!({
            "name": "default-app",
            "version": "1.0.0",
            "description": "Generated application",
        })
    } else if path.contains("components") {
        json!([])
    } else if path.contains("routes") {
        json!([{ "path": "/", "component": "DefaultPage" }])
    } else if path.contains("api") {
        json!({ "endpoints": [] })
    } else {
        Value::Null
    }
}

fn single_line(message: &str) -> String {
    message.lines().collect::<Vec<_>>().join(" ")
}

fn fallback_template(message: &str) -> String {
    format!(
        r#"// Fallback template: generation failed
// Error: {}
export default function FallbackComponent() {{
  return (
    <div className="error-fallback">
      <h2>Something went wrong</h2>
      <p>This part of the application could not be generated.</p>
    </div>
  );
}}
"#,
        single_line(message)
    )
}

fn fallback_handler(message: &str) -> String {
    let quoted = Value::String(message.to_string()).to_string();
    format!(
        r#"export default async function handler(req, res) {{
  res.status(503).json({{
    error: 'Service temporarily unavailable',
    message: {quoted},
    fallback: true,
  }});
}}
"#
    )
}
