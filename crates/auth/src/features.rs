//! Plan-tier feature gates over untrusted, nested form schemas.
//!
//! A schema node looks like `{"type": "...", "components": [...], "columns": [{"components": [...]}]}`.
//! The walk is iterative with an explicit stack and a hard nesting limit, so a
//! hostile document cannot exhaust the thread stack.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use formgate_core::{PlanTier, required_tier_for};

/// Deepest component nesting accepted before the schema is rejected outright.
pub const MAX_SCHEMA_DEPTH: usize = 64;

#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum FeatureGateError {
    /// The schema uses a component the caller's plan does not include.
    #[error("feature '{feature}' requires the '{required_tier}' plan")]
    FeatureNotAvailable { feature: String, required_tier: PlanTier },

    #[error("schema nesting exceeds {max_depth} levels")]
    SchemaTooDeep { max_depth: usize },
}

/// Check every component in `schema` against the caller's `tier`.
///
/// Depth-first, pre-order; stops at the first gated component the tier cannot
/// use. A schema without a top-level `components` key is valid. Read-only.
pub fn validate_schema_features(schema: &Value, tier: PlanTier) -> Result<(), FeatureGateError> {
    let Some(components) = schema.get("components") else {
        return Ok(());
    };

    let mut stack: Vec<(&Value, usize)> = Vec::new();
    push_components(&mut stack, components, 1)?;

    while let Some((node, depth)) = stack.pop() {
        if let Some(kind) = node.get("type").and_then(Value::as_str) {
            check_component(kind, tier)?;
        }

        // Pushed in reverse so nested components are visited before columns.
        if let Some(columns) = node.get("columns").and_then(Value::as_array) {
            for column in columns.iter().rev() {
                if let Some(nested) = column.get("components") {
                    push_components(&mut stack, nested, depth + 1)?;
                }
            }
        }
        if let Some(nested) = node.get("components") {
            push_components(&mut stack, nested, depth + 1)?;
        }
    }

    Ok(())
}

fn check_component(kind: &str, tier: PlanTier) -> Result<(), FeatureGateError> {
    match required_tier_for(kind) {
        Some(required) if !tier.satisfies(required) => Err(FeatureGateError::FeatureNotAvailable {
            feature: kind.to_string(),
            required_tier: required,
        }),
        _ => Ok(()),
    }
}

fn push_components<'a>(
    stack: &mut Vec<(&'a Value, usize)>,
    list: &'a Value,
    depth: usize,
) -> Result<(), FeatureGateError> {
    let Some(items) = list.as_array() else {
        return Ok(());
    };
    if items.is_empty() {
        return Ok(());
    }
    if depth > MAX_SCHEMA_DEPTH {
        return Err(FeatureGateError::SchemaTooDeep {
            max_depth: MAX_SCHEMA_DEPTH,
        });
    }
    stack.extend(items.iter().rev().map(|item| (item, depth)));
    Ok(())
}
