//! Plan tier registry: the ordered subscription tiers and their usage limits.
//!
//! The registry is a compile-time table. It is shared by reference and never
//! mutated, so lookups need no synchronization.

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Subscription tier, totally ordered from cheapest to most capable.
///
/// The derived `Ord` follows declaration order and agrees with [`PlanTier::rank`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    Free,
    Pro,
    Business,
    Growth,
    Enterprise,
}

/// A tier name that is not part of the registry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown plan tier '{0}'")]
pub struct UnknownPlanTier(pub String);

impl PlanTier {
    /// Every tier, lowest rank first.
    pub const ALL: [PlanTier; 5] = [
        PlanTier::Free,
        PlanTier::Pro,
        PlanTier::Business,
        PlanTier::Growth,
        PlanTier::Enterprise,
    ];

    /// The tier assumed when a request does not assert one.
    pub const fn lowest() -> Self {
        PlanTier::Free
    }

    pub const fn rank(self) -> u8 {
        match self {
            PlanTier::Free => 0,
            PlanTier::Pro => 1,
            PlanTier::Business => 2,
            PlanTier::Growth => 3,
            PlanTier::Enterprise => 4,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            PlanTier::Free => "free",
            PlanTier::Pro => "pro",
            PlanTier::Business => "business",
            PlanTier::Growth => "growth",
            PlanTier::Enterprise => "enterprise",
        }
    }

    /// Whether this tier unlocks everything `required` unlocks.
    pub const fn satisfies(self, required: PlanTier) -> bool {
        self.rank() >= required.rank()
    }

    pub const fn limits(self) -> Limits {
        match self {
            PlanTier::Free => Limits::new(3, 100),
            PlanTier::Pro => Limits::new(20, 1_000),
            PlanTier::Business => Limits::new(50, 5_000),
            PlanTier::Growth => Limits::new(200, 25_000),
            PlanTier::Enterprise => Limits::UNLIMITED,
        }
    }
}

impl Default for PlanTier {
    fn default() -> Self {
        Self::lowest()
    }
}

impl core::fmt::Display for PlanTier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanTier {
    type Err = UnknownPlanTier;

    /// Exact, case-sensitive match against the registry names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PlanTier::ALL
            .into_iter()
            .find(|tier| tier.as_str() == s)
            .ok_or_else(|| UnknownPlanTier(s.to_string()))
    }
}

/// String-level access check: `true` iff `user_tier` ranks at or above
/// `required_tier`. Unrecognised names on either side deny access.
pub fn has_access(user_tier: &str, required_tier: &str) -> bool {
    match (user_tier.parse::<PlanTier>(), required_tier.parse::<PlanTier>()) {
        (Ok(user), Ok(required)) => user.satisfies(required),
        _ => false,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Usage limits
// ─────────────────────────────────────────────────────────────────────────────

/// Usage limits for a tier. Both fields zero means unlimited.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    pub max_forms: u32,
    pub max_submissions_per_month: u32,
}

/// A usage limit was reached for the caller's tier.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
#[error("{resource} limit of {limit} reached on plan '{tier}'")]
pub struct QuotaExceeded {
    pub resource: &'static str,
    pub limit: u32,
    pub tier: PlanTier,
}

impl Limits {
    pub const UNLIMITED: Limits = Limits::new(0, 0);

    pub const fn new(max_forms: u32, max_submissions_per_month: u32) -> Self {
        Self {
            max_forms,
            max_submissions_per_month,
        }
    }

    pub const fn is_unlimited(&self) -> bool {
        self.max_forms == 0 && self.max_submissions_per_month == 0
    }

    /// Whether an owner currently holding `current` forms may create one more.
    pub fn allows_another_form(&self, tier: PlanTier, current: u32) -> Result<(), QuotaExceeded> {
        check_quota(self.is_unlimited(), self.max_forms, current, "forms", tier)
    }

    /// Whether a form that received `current_month` submissions may accept another.
    pub fn allows_another_submission(&self, tier: PlanTier, current_month: u32) -> Result<(), QuotaExceeded> {
        check_quota(
            self.is_unlimited(),
            self.max_submissions_per_month,
            current_month,
            "monthly submissions",
            tier,
        )
    }
}

fn check_quota(
    unlimited: bool,
    limit: u32,
    current: u32,
    resource: &'static str,
    tier: PlanTier,
) -> Result<(), QuotaExceeded> {
    if unlimited || current < limit {
        Ok(())
    } else {
        Err(QuotaExceeded { resource, limit, tier })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_only_registry_names() {
        for tier in PlanTier::ALL {
            assert_eq!(tier.as_str().parse::<PlanTier>().unwrap(), tier);
        }
        assert!("Pro".parse::<PlanTier>().is_err());
        assert!("platinum".parse::<PlanTier>().is_err());
        assert!("".parse::<PlanTier>().is_err());
    }

    #[test]
    fn rank_order_matches_declaration_order() {
        for pair in PlanTier::ALL.windows(2) {
            assert!(pair[0].rank() < pair[1].rank());
            assert!(pair[0] < pair[1]);
        }
        assert_eq!(PlanTier::lowest(), PlanTier::Free);
    }

    #[test]
    fn has_access_fails_closed_on_unknown_names() {
        assert!(has_access("pro", "pro"));
        assert!(has_access("enterprise", "pro"));
        assert!(!has_access("free", "pro"));
        assert!(!has_access("platinum", "free"));
        assert!(!has_access("enterprise", "platinum"));
    }

    #[test]
    fn serde_uses_lowercase_names() {
        assert_eq!(serde_json::to_string(&PlanTier::Business).unwrap(), "\"business\"");
        let tier: PlanTier = serde_json::from_str("\"growth\"").unwrap();
        assert_eq!(tier, PlanTier::Growth);
    }

    #[test]
    fn only_enterprise_is_unlimited() {
        for tier in PlanTier::ALL {
            assert_eq!(tier.limits().is_unlimited(), tier == PlanTier::Enterprise);
        }
    }

    #[test]
    fn form_quota_is_enforced_at_the_limit() {
        let limits = PlanTier::Free.limits();
        assert!(limits.allows_another_form(PlanTier::Free, 2).is_ok());

        let err = limits.allows_another_form(PlanTier::Free, 3).unwrap_err();
        assert_eq!(err.limit, 3);
        assert_eq!(err.tier, PlanTier::Free);
        assert_eq!(err.resource, "forms");

        let unlimited = PlanTier::Enterprise.limits();
        assert!(unlimited.allows_another_form(PlanTier::Enterprise, u32::MAX).is_ok());
        assert!(unlimited.allows_another_submission(PlanTier::Enterprise, u32::MAX).is_ok());
    }

    #[test]
    fn submission_quota_is_enforced() {
        let limits = PlanTier::Pro.limits();
        assert!(limits.allows_another_submission(PlanTier::Pro, 999).is_ok());
        assert!(limits.allows_another_submission(PlanTier::Pro, 1_000).is_err());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn any_tier() -> impl Strategy<Value = PlanTier> {
            prop::sample::select(PlanTier::ALL.to_vec())
        }

        proptest! {
            /// Property: every tier grants access to itself.
            #[test]
            fn has_access_is_reflexive(tier in any_tier()) {
                prop_assert!(has_access(tier.as_str(), tier.as_str()));
            }

            /// Property: raising the user's tier never revokes access.
            #[test]
            fn has_access_is_monotonic(a in any_tier(), b in any_tier(), required in any_tier()) {
                let (low, high) = if a <= b { (a, b) } else { (b, a) };
                if has_access(low.as_str(), required.as_str()) {
                    prop_assert!(has_access(high.as_str(), required.as_str()));
                }
            }

            /// Property: names outside the registry never grant or receive access.
            #[test]
            fn unknown_names_fail_closed(name in "[a-z]{1,12}", tier in any_tier()) {
                prop_assume!(name.parse::<PlanTier>().is_err());
                prop_assert!(!has_access(&name, tier.as_str()));
                prop_assert!(!has_access(tier.as_str(), &name));
            }
        }
    }
}
