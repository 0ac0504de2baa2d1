//! `formgate-auth`: pure cross-service trust boundary (zero-trust).
//!
//! Verifies signed identity assertions from the trusted frontend, provisions
//! shadow identities on first use and gates schema features by plan tier.
//! This crate is intentionally decoupled from HTTP and storage.

pub mod assertion;
pub mod features;
pub mod shadow;
pub mod signature;

pub use assertion::{TierSource, VerifiedAssertion};
pub use features::{FeatureGateError, MAX_SCHEMA_DEPTH, validate_schema_features};
pub use shadow::{
    IdentityRepository, IdentitySyncer, Provisioning, RepositoryError, ShadowIdentity, SyncError,
};
pub use signature::{
    AuthFailure, SignedHeaders, VerifierConfig, canonical_payload, constant_time_eq, sign, verify,
    verify_at,
};
