//! Built-in recovery strategies
//!
//! Code-specific strategies are bound to one error code each; the two
//! fallbacks are tried in order when no code-specific strategy exists.
//! All of them are stateless.

use crate::context::{Phase, RecoveryContext};
use crate::strategy::{RecoveryResult, RecoveryStrategy, StrategyError};
use jac_diagnostics::{ErrorRecord, Severity};
use serde_json::json;

/// Code handled by [`MissingComponentStrategy`]
pub const COMPONENT_NOT_FOUND: &str = "COMPONENT_NOT_FOUND";
/// Code handled by [`InvalidPropsStrategy`]
pub const INVALID_PROPS: &str = "INVALID_PROPS";
/// Code handled by [`DuplicateRouteStrategy`]
pub const DUPLICATE_ROUTE: &str = "DUPLICATE_ROUTE";
/// Code handled by [`TemplateSyntaxStrategy`]
pub const TEMPLATE_SYNTAX_ERROR: &str = "TEMPLATE_SYNTAX_ERROR";
/// Code handled by [`ApiEndpointStrategy`]
pub const INVALID_API_ENDPOINT: &str = "INVALID_API_ENDPOINT";
/// Code handled by [`MissingFieldStrategy`]
pub const MISSING_REQUIRED_FIELD: &str = "MISSING_REQUIRED_FIELD";

/// Replaces an unresolvable component with a plain `div`
#[derive(Debug, Clone, Copy, Default)]
pub struct MissingComponentStrategy;

impl RecoveryStrategy for MissingComponentStrategy {
    fn recover(
        &self,
        error: &ErrorRecord,
        ctx: &RecoveryContext<'_>,
    ) -> Result<RecoveryResult, StrategyError> {
        let Some(id) = ctx.current_component_id() else {
            return Ok(RecoveryResult::failure("no component in context"));
        };
        let missing = error.subject.as_deref().unwrap_or("unknown");
        let payload = json!({
            "id": id,
            "type": "div",
            "props": { "data-missing-component": missing },
        });
        Ok(RecoveryResult::success(
            format!("Replaced missing component '{missing}' in {id} with a placeholder"),
            payload,
        )
        .downgraded())
    }

    fn name(&self) -> &str {
        "missing_component"
    }
}

/// Drops props that failed validation
#[derive(Debug, Clone, Copy, Default)]
pub struct InvalidPropsStrategy;

impl RecoveryStrategy for InvalidPropsStrategy {
    fn recover(
        &self,
        _error: &ErrorRecord,
        ctx: &RecoveryContext<'_>,
    ) -> Result<RecoveryResult, StrategyError> {
        let target = ctx.current_component_id().unwrap_or("unknown");
        Ok(RecoveryResult::success(
            format!("Dropped invalid props on {target}"),
            json!({ "id": target, "props": {} }),
        )
        .partial())
    }

    fn name(&self) -> &str {
        "invalid_props"
    }
}

/// Renames a route that collides with an earlier one
#[derive(Debug, Clone, Copy, Default)]
pub struct DuplicateRouteStrategy;

impl RecoveryStrategy for DuplicateRouteStrategy {
    fn recover(
        &self,
        _error: &ErrorRecord,
        ctx: &RecoveryContext<'_>,
    ) -> Result<RecoveryResult, StrategyError> {
        let Some(path) = ctx.current_route_path() else {
            return Ok(RecoveryResult::failure("no route in context"));
        };
        let renamed = format!("{}-duplicate", path.trim_end_matches('/'));
        Ok(RecoveryResult::success(
            format!("Renamed duplicate route {path} to {renamed}"),
            json!({ "original_path": path, "path": renamed }),
        )
        .partial())
    }

    fn name(&self) -> &str {
        "duplicate_route"
    }
}

/// Falls back to a plain template during generation
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateSyntaxStrategy;

impl RecoveryStrategy for TemplateSyntaxStrategy {
    fn recover(
        &self,
        _error: &ErrorRecord,
        ctx: &RecoveryContext<'_>,
    ) -> Result<RecoveryResult, StrategyError> {
        if ctx.phase() != Phase::Generate {
            return Ok(RecoveryResult::failure(format!(
                "template repair only applies during generate, not {}",
                ctx.phase()
            )));
        }
        let file = ctx.current_file().unwrap_or("unknown");
        Ok(RecoveryResult::success(
            format!("Rendered {file} with the plain template"),
            json!({ "file": file, "template": "plain" }),
        )
        .partial())
    }

    fn name(&self) -> &str {
        "template_syntax"
    }
}

/// Stubs an endpoint whose definition is invalid
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiEndpointStrategy;

impl RecoveryStrategy for ApiEndpointStrategy {
    fn recover(
        &self,
        error: &ErrorRecord,
        ctx: &RecoveryContext<'_>,
    ) -> Result<RecoveryResult, StrategyError> {
        let Some(path) = ctx.current_api_path() else {
            return Ok(RecoveryResult::failure("no api endpoint in context"));
        };
        let method = error.subject.as_deref().unwrap_or("GET");
        Ok(RecoveryResult::success(
            format!("Stubbed {method} {path} with a not-implemented handler"),
            json!({ "path": path, "method": method, "handler": "notImplemented" }),
        )
        .downgraded())
    }

    fn name(&self) -> &str {
        "api_endpoint"
    }
}

/// Fills a missing required field with `null`
#[derive(Debug, Clone, Copy, Default)]
pub struct MissingFieldStrategy;

impl RecoveryStrategy for MissingFieldStrategy {
    fn recover(
        &self,
        error: &ErrorRecord,
        _ctx: &RecoveryContext<'_>,
    ) -> Result<RecoveryResult, StrategyError> {
        let path = error
            .location_path()
            .ok_or(StrategyError::MissingInput("location.path"))?;
        Ok(RecoveryResult::success(
            format!("Defaulted missing field {path} to null"),
            json!({ "path": path, "value": null }),
        )
        .downgraded())
    }

    fn name(&self) -> &str {
        "missing_field"
    }
}

/// Fallback: accepts anything below `Error` severity as a warning
#[derive(Debug, Clone, Copy, Default)]
pub struct DowngradeWarningStrategy;

impl RecoveryStrategy for DowngradeWarningStrategy {
    fn recover(
        &self,
        error: &ErrorRecord,
        _ctx: &RecoveryContext<'_>,
    ) -> Result<RecoveryResult, StrategyError> {
        if error.severity == Severity::Error {
            return Ok(RecoveryResult::failure("error severity cannot be downgraded"));
        }
        Ok(RecoveryResult::success(
            format!("Accepted {} as a warning", error.code),
            serde_json::Value::Null,
        )
        .downgraded())
    }

    fn name(&self) -> &str {
        "downgrade_warning"
    }
}

/// Fallback: skips the entity named by the context cursor
#[derive(Debug, Clone, Copy, Default)]
pub struct SkipEntityStrategy;

impl RecoveryStrategy for SkipEntityStrategy {
    fn recover(
        &self,
        error: &ErrorRecord,
        ctx: &RecoveryContext<'_>,
    ) -> Result<RecoveryResult, StrategyError> {
        let entity = ctx
            .current_component_id()
            .map(|id| ("component", id))
            .or_else(|| ctx.current_route_path().map(|p| ("route", p)))
            .or_else(|| ctx.current_api_path().map(|p| ("api", p)))
            .or_else(|| ctx.current_file().map(|f| ("file", f)));

        let Some((kind, id)) = entity else {
            return Ok(RecoveryResult::failure("nothing to skip"));
        };
        Ok(RecoveryResult::success(
            format!("Skipped {kind} {id} after {}", error.code),
            json!({ "skipped": kind, "id": id }),
        )
        .partial())
    }

    fn name(&self) -> &str {
        "skip_entity"
    }
}
