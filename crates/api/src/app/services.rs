use std::sync::Arc;

use anyhow::Context;
use sqlx::PgPool;

use formgate_auth::{IdentityRepository, IdentitySyncer};
use formgate_infra::{FormStore, InMemoryFormStore, InMemoryIdentityRepository, PostgresIdentityRepository};

/// Shared handles used by request handlers.
#[derive(Clone)]
pub struct AppServices {
    pub syncer: Arc<IdentitySyncer<Arc<dyn IdentityRepository>>>,
    pub forms: Arc<dyn FormStore>,
}

impl AppServices {
    pub fn new(identities: Arc<dyn IdentityRepository>, forms: Arc<dyn FormStore>) -> Self {
        Self {
            syncer: Arc::new(IdentitySyncer::new(identities)),
            forms,
        }
    }

    /// In-memory wiring (dev/test).
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryIdentityRepository::new()),
            Arc::new(InMemoryFormStore::new()),
        )
    }
}

/// Postgres identities when a database URL is configured, in-memory otherwise.
pub async fn build_services(database_url: Option<&str>) -> anyhow::Result<AppServices> {
    let Some(url) = database_url else {
        tracing::warn!("DATABASE_URL not set; using in-memory identity store");
        return Ok(AppServices::in_memory());
    };

    let pool = PgPool::connect(url).await.context("failed to connect to Postgres")?;
    let repo = PostgresIdentityRepository::new(pool);
    repo.ensure_schema()
        .await
        .context("failed to prepare shadow_identities table")?;

    tracing::info!("using Postgres identity store");
    Ok(AppServices::new(Arc::new(repo), Arc::new(InMemoryFormStore::new())))
}
