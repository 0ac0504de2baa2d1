//! `formgate-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, the plan tier registry and the feature requirement table.

pub mod error;
pub mod features;
pub mod id;
pub mod plan;

pub use error::{DomainError, DomainResult};
pub use features::{FeatureRequirement, gated_features, required_tier_for};
pub use id::{FormId, UserId};
pub use plan::{Limits, PlanTier, QuotaExceeded, UnknownPlanTier, has_access};
