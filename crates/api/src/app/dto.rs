use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use formgate_core::{FeatureRequirement, Limits, PlanTier};
use formgate_infra::FormRecord;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateFormRequest {
    pub title: String,
    pub schema: JsonValue,
}

#[derive(Debug, Deserialize)]
pub struct ValidateSchemaRequest {
    pub schema: JsonValue,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct FormResponse {
    pub id: String,
    pub title: String,
    pub schema: JsonValue,
    pub created_at: String,
}

impl From<FormRecord> for FormResponse {
    fn from(value: FormRecord) -> Self {
        Self {
            id: value.id.to_string(),
            title: value.title,
            schema: value.schema,
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub tier: PlanTier,
    pub rank: u8,
    pub limits: Limits,
    pub unlimited: bool,
}

#[derive(Debug, Serialize)]
pub struct PlansResponse {
    pub plans: Vec<PlanResponse>,
    pub gated_features: &'static [FeatureRequirement],
}

impl PlansResponse {
    pub fn current() -> Self {
        Self {
            plans: PlanTier::ALL
                .into_iter()
                .map(|tier| PlanResponse {
                    tier,
                    rank: tier.rank(),
                    limits: tier.limits(),
                    unlimited: tier.limits().is_unlimited(),
                })
                .collect(),
            gated_features: formgate_core::gated_features(),
        }
    }
}
