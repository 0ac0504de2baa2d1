use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use formgate_auth::{IdentityRepository, RepositoryError, ShadowIdentity};
use formgate_core::UserId;

/// In-memory identity store.
///
/// Intended for tests/dev. The existence check and insert happen under one
/// write lock, so concurrent creates for the same id cannot both succeed.
#[derive(Debug, Default)]
pub struct InMemoryIdentityRepository {
    rows: RwLock<HashMap<UserId, ShadowIdentity>>,
}

impl InMemoryIdentityRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.read().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl IdentityRepository for InMemoryIdentityRepository {
    async fn get_by_id(&self, id: &UserId) -> Result<ShadowIdentity, RepositoryError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| RepositoryError::Storage("identity store lock poisoned".to_string()))?;
        rows.get(id).cloned().ok_or(RepositoryError::NotFound)
    }

    async fn create(&self, identity: &ShadowIdentity) -> Result<(), RepositoryError> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| RepositoryError::Storage("identity store lock poisoned".to_string()))?;
        if rows.contains_key(&identity.id) {
            return Err(RepositoryError::UniqueViolation(format!(
                "identity '{}' already exists",
                identity.id
            )));
        }
        rows.insert(identity.id.clone(), identity.clone());
        Ok(())
    }
}
