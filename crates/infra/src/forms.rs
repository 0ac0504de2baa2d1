//! Owner-scoped form definition storage.
//!
//! Every stored form foreign-keys to a shadow identity, so callers must run
//! `IdentitySyncer::ensure_identity` for the owner before inserting.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

use formgate_core::{FormId, PlanTier, QuotaExceeded, UserId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormRecord {
    pub id: FormId,
    pub owner_id: UserId,
    pub title: String,
    pub schema: JsonValue,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormStoreError {
    #[error(transparent)]
    Quota(#[from] QuotaExceeded),

    #[error("storage failure: {0}")]
    Storage(String),
}

/// Owner-isolated form store abstraction.
pub trait FormStore: Send + Sync {
    /// Store `record` if its owner is still below the form quota of `tier`.
    ///
    /// The count and the write must be one atomic step per owner.
    fn insert_within_quota(&self, record: FormRecord, tier: PlanTier) -> Result<(), FormStoreError>;

    fn list_by_owner(&self, owner_id: &UserId) -> Result<Vec<FormRecord>, FormStoreError>;
}

impl<S> FormStore for Arc<S>
where
    S: FormStore + ?Sized,
{
    fn insert_within_quota(&self, record: FormRecord, tier: PlanTier) -> Result<(), FormStoreError> {
        (**self).insert_within_quota(record, tier)
    }

    fn list_by_owner(&self, owner_id: &UserId) -> Result<Vec<FormRecord>, FormStoreError> {
        (**self).list_by_owner(owner_id)
    }
}

/// In-memory form store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryFormStore {
    inner: RwLock<HashMap<UserId, Vec<FormRecord>>>,
}

impl InMemoryFormStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> FormStoreError {
    FormStoreError::Storage("form store lock poisoned".to_string())
}

impl FormStore for InMemoryFormStore {
    fn insert_within_quota(&self, record: FormRecord, tier: PlanTier) -> Result<(), FormStoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        let owned = map.entry(record.owner_id.clone()).or_default();
        let current = u32::try_from(owned.len()).unwrap_or(u32::MAX);
        tier.limits().allows_another_form(tier, current)?;
        owned.push(record);
        Ok(())
    }

    fn list_by_owner(&self, owner_id: &UserId) -> Result<Vec<FormRecord>, FormStoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(owner_id).cloned().unwrap_or_default())
    }
}
