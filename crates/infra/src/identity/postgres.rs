//! Postgres-backed identity repository.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | RepositoryError |
//! |------------|----------------------|-----------------|
//! | Database (unique violation) | `23505` | `UniqueViolation` |
//! | Database (other) | Any other | `Storage` |
//! | Other (pool closed, network, decode) | N/A | `Storage` |
//!
//! A missing row is reported as `NotFound` from `fetch_optional`, never from an error.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::instrument;

use formgate_auth::{IdentityRepository, RepositoryError, ShadowIdentity};
use formgate_core::UserId;

/// Table definition. The primary key on `id` is what serializes concurrent
/// first-use creates.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS shadow_identities (
    id            TEXT PRIMARY KEY,
    email         VARCHAR(255) NOT NULL,
    password_hash TEXT NOT NULL,
    first_name    TEXT NOT NULL,
    last_name     TEXT NOT NULL,
    provenance    TEXT NOT NULL,
    is_active     BOOLEAN NOT NULL DEFAULT TRUE,
    created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

/// Postgres-backed identity repository.
///
/// Uses the SQLx connection pool, which is `Send + Sync`.
#[derive(Debug, Clone)]
pub struct PostgresIdentityRepository {
    pool: Arc<PgPool>,
}

impl PostgresIdentityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    /// Create the backing table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        sqlx::query(SCHEMA_SQL)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }
}

#[derive(Debug)]
struct IdentityRow {
    id: String,
    email: String,
    password_hash: String,
    first_name: String,
    last_name: String,
    provenance: String,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl IdentityRow {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            provenance: row.try_get("provenance")?,
            is_active: row.try_get("is_active")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl TryFrom<IdentityRow> for ShadowIdentity {
    type Error = RepositoryError;

    fn try_from(row: IdentityRow) -> Result<Self, Self::Error> {
        let id = UserId::parse(row.id).map_err(|e| RepositoryError::Storage(format!("corrupt identity row: {e}")))?;
        Ok(ShadowIdentity {
            id,
            email: row.email,
            password_hash: row.password_hash,
            first_name: row.first_name,
            last_name: row.last_name,
            provenance: row.provenance,
            is_active: row.is_active,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl IdentityRepository for PostgresIdentityRepository {
    #[instrument(skip(self), fields(operation = "get_identity"))]
    async fn get_by_id(&self, id: &UserId) -> Result<ShadowIdentity, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, email, password_hash, first_name, last_name, provenance, is_active, created_at
            FROM shadow_identities
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_identity", e))?
        .ok_or(RepositoryError::NotFound)?;

        IdentityRow::from_row(&row)
            .map_err(|e| map_sqlx_error("decode_identity", e))?
            .try_into()
    }

    #[instrument(skip(self, identity), fields(operation = "create_identity", user_id = %identity.id))]
    async fn create(&self, identity: &ShadowIdentity) -> Result<(), RepositoryError> {
        // Plain INSERT: a conflicting row must surface as an error, never be merged.
        sqlx::query(
            r#"
            INSERT INTO shadow_identities (
                id,
                email,
                password_hash,
                first_name,
                last_name,
                provenance,
                is_active,
                created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(identity.id.as_str())
        .bind(&identity.email)
        .bind(&identity.password_hash)
        .bind(&identity.first_name)
        .bind(&identity.last_name)
        .bind(&identity.provenance)
        .bind(identity.is_active)
        .bind(identity.created_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_identity", e))?;

        Ok(())
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> RepositoryError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code() {
                Some(code) if code.as_ref() == "23505" => RepositoryError::UniqueViolation(msg),
                _ => RepositoryError::Storage(msg),
            }
        }
        sqlx::Error::PoolClosed => RepositoryError::Storage(format!("connection pool closed in {operation}")),
        _ => RepositoryError::Storage(format!("sqlx error in {operation}: {err}")),
    }
}
