//! Shadow identities: minimal local user records for externally asserted users.
//!
//! A shadow identity exists only so that records owned by this service can
//! reference the user. It can never log in, and this module never updates or
//! deletes one once created.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use formgate_core::UserId;

/// Storage width of the email column.
pub const EMAIL_COLUMN_LIMIT: usize = 255;

/// Stored in place of a password hash. No hash scheme encodes to a value
/// starting with `!`, so no password verifier can ever accept it.
pub const UNUSABLE_PASSWORD_HASH: &str = "!shadow:no-login";

pub const SHADOW_EMAIL_DOMAIN: &str = "shadow.formgate.invalid";
pub const SHADOW_PROVENANCE: &str = "external_assertion";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShadowIdentity {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub provenance: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl ShadowIdentity {
    /// Build the record created on first reference to `id`.
    pub fn provision(id: UserId, now: DateTime<Utc>) -> Self {
        let email = placeholder_email(&id);
        Self {
            id,
            email,
            password_hash: UNUSABLE_PASSWORD_HASH.to_string(),
            first_name: "Shadow".to_string(),
            last_name: "User".to_string(),
            provenance: SHADOW_PROVENANCE.to_string(),
            is_active: true,
            created_at: now,
        }
    }
}

/// Deterministic placeholder email, truncated to the column limit on a char boundary.
pub fn placeholder_email(id: &UserId) -> String {
    let mut email = format!("{id}@{SHADOW_EMAIL_DOMAIN}");
    if email.len() > EMAIL_COLUMN_LIMIT {
        let mut cut = EMAIL_COLUMN_LIMIT;
        while !email.is_char_boundary(cut) {
            cut -= 1;
        }
        email.truncate(cut);
    }
    email
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository collaborator
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// Expected on first reference; drives provisioning.
    #[error("identity not found")]
    NotFound,

    #[error("identity already exists: {0}")]
    UniqueViolation(String),

    #[error("storage failure: {0}")]
    Storage(String),
}

/// Identity lookup/create interface supplied by the storage layer.
///
/// `create` must be atomic with respect to the identity key: of any number of
/// concurrent creates for one id, at most one may succeed.
#[async_trait]
pub trait IdentityRepository: Send + Sync {
    async fn get_by_id(&self, id: &UserId) -> Result<ShadowIdentity, RepositoryError>;

    async fn create(&self, identity: &ShadowIdentity) -> Result<(), RepositoryError>;
}

#[async_trait]
impl<R> IdentityRepository for std::sync::Arc<R>
where
    R: IdentityRepository + ?Sized,
{
    async fn get_by_id(&self, id: &UserId) -> Result<ShadowIdentity, RepositoryError> {
        (**self).get_by_id(id).await
    }

    async fn create(&self, identity: &ShadowIdentity) -> Result<(), RepositoryError> {
        (**self).create(identity).await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Syncer
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Repository failure, propagated verbatim.
    #[error(transparent)]
    Storage(#[from] RepositoryError),
}

/// What `ensure_identity` had to do.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Provisioning {
    /// The identity was already present; nothing was written.
    Existing,
    /// This call created the identity.
    Created,
    /// Our create lost a race; a concurrent caller's record is now visible.
    CreatedConcurrently,
}

/// Guarantees a local identity exists for an externally verified user.
///
/// No internal lock: the repository's uniqueness constraint is the point of
/// serialization, and a failed create is resolved by one follow-up lookup.
#[derive(Debug, Clone)]
pub struct IdentitySyncer<R> {
    repo: R,
}

impl<R> IdentitySyncer<R>
where
    R: IdentityRepository,
{
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub async fn ensure_identity(&self, user_id: &str) -> Result<Provisioning, SyncError> {
        let id = UserId::parse(user_id).map_err(|e| SyncError::InvalidInput(e.to_string()))?;

        match self.repo.get_by_id(&id).await {
            Ok(_) => return Ok(Provisioning::Existing),
            Err(RepositoryError::NotFound) => {}
            Err(e) => return Err(e.into()),
        }

        let identity = ShadowIdentity::provision(id.clone(), Utc::now());
        let create_err = match self.repo.create(&identity).await {
            Ok(()) => {
                tracing::info!(user_id = %id, "provisioned shadow identity");
                return Ok(Provisioning::Created);
            }
            Err(e) => e,
        };

        match self.repo.get_by_id(&id).await {
            Ok(_) => {
                tracing::debug!(user_id = %id, error = %create_err, "shadow identity created concurrently");
                Ok(Provisioning::CreatedConcurrently)
            }
            Err(retry_err) => {
                tracing::warn!(
                    user_id = %id,
                    error = %create_err,
                    retry_error = %retry_err,
                    "shadow identity provisioning failed"
                );
                Err(create_err.into())
            }
        }
    }
}
