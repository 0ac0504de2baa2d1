use chrono::{DateTime, Utc};

use formgate_auth::{TierSource, VerifiedAssertion};
use formgate_core::{PlanTier, UserId};

/// Verified identity for a request.
///
/// Inserted into request extensions by the signed-header middleware and
/// immutable from then on. Each request gets its own copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityContext {
    user_id: UserId,
    tier: PlanTier,
    tier_source: TierSource,
    verified_at: DateTime<Utc>,
}

impl IdentityContext {
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn tier(&self) -> PlanTier {
        self.tier
    }

    /// True when the frontend sent no tier and the lowest tier was assumed.
    pub fn tier_defaulted(&self) -> bool {
        self.tier_source == TierSource::Defaulted
    }

    pub fn verified_at(&self) -> DateTime<Utc> {
        self.verified_at
    }
}

impl From<VerifiedAssertion> for IdentityContext {
    fn from(value: VerifiedAssertion) -> Self {
        Self {
            user_id: value.user_id,
            tier: value.tier,
            tier_source: value.tier_source,
            verified_at: value.verified_at,
        }
    }
}
