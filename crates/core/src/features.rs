//! Feature requirement table: which schema component types need which tier.

use serde::Serialize;

use crate::PlanTier;

/// Minimum tier required to use a schema component type.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureRequirement {
    pub component_type: &'static str,
    pub required_tier: PlanTier,
}

static FEATURE_REQUIREMENTS: &[FeatureRequirement] = &[
    FeatureRequirement {
        component_type: "file",
        required_tier: PlanTier::Pro,
    },
    FeatureRequirement {
        component_type: "signature",
        required_tier: PlanTier::Pro,
    },
];

/// All gated component types.
pub fn gated_features() -> &'static [FeatureRequirement] {
    FEATURE_REQUIREMENTS
}

/// The tier a component type requires, or `None` if it is available on every plan.
pub fn required_tier_for(component_type: &str) -> Option<PlanTier> {
    FEATURE_REQUIREMENTS
        .iter()
        .find(|req| req.component_type == component_type)
        .map(|req| req.required_tier)
}
