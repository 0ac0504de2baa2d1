use chrono::{DateTime, Utc};
use serde::Serialize;

use formgate_core::{PlanTier, UserId};

/// How the tier of a verified assertion was established.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TierSource {
    /// The frontend signed an explicit `X-Plan-Tier` value.
    Asserted,
    /// No tier header was present; the lowest tier was assumed.
    Defaulted,
}

/// Identity and entitlement established by a successful signature check.
///
/// Ephemeral: lives for one request and is never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifiedAssertion {
    pub user_id: UserId,
    pub tier: PlanTier,
    pub tier_source: TierSource,
    pub verified_at: DateTime<Utc>,
}

impl VerifiedAssertion {
    pub fn tier_defaulted(&self) -> bool {
        self.tier_source == TierSource::Defaulted
    }
}
