//! Credential persistence.
//!
//! A single [`CredentialStore`] capability with interchangeable adapters:
//! [`MemoryCredentialStore`] for development and tests, [`PgCredentialStore`]
//! for PostgreSQL. [`open_store`] picks one from configuration at startup.

pub mod memory;
pub mod postgres;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;
use tracing::info;

use crate::config::{CoreConfig, StorageBackend};
use crate::models::auth::{Credential, NewCredential};

pub use memory::MemoryCredentialStore;
pub use postgres::PgCredentialStore;

/// Credential store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint (username or email) rejected the write.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Lookup and creation of credentials.
///
/// Implementations must enforce username and email uniqueness atomically in
/// `create`; the caller's existence check is advisory only.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Find the credential whose username equals `username` or whose email
    /// equals `email`.
    async fn find_by_identifier(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<Credential>, StoreError>;

    /// Find a credential by id.
    async fn find_by_id(&self, id: i64) -> Result<Option<Credential>, StoreError>;

    /// Persist a new credential, assigning its id and timestamps.
    async fn create(&self, credential: NewCredential) -> Result<Credential, StoreError>;
}

/// Maximum time to wait for a pooled PostgreSQL connection.
const PG_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

/// Open the credential store selected by `config`.
///
/// For PostgreSQL this connects, runs embedded migrations, and returns the
/// pooled adapter.
pub async fn open_store(config: &CoreConfig) -> Result<Arc<dyn CredentialStore>, StoreError> {
    match &config.storage {
        StorageBackend::Memory => {
            info!("using in-memory credential store");
            Ok(Arc::new(MemoryCredentialStore::new()))
        }
        StorageBackend::Postgres(settings) => {
            info!(
                host = %settings.host,
                database = %settings.database,
                max_connections = settings.max_connections,
                "connecting to PostgreSQL credential store"
            );
            let pool = PgPoolOptions::new()
                .max_connections(settings.max_connections)
                .acquire_timeout(PG_ACQUIRE_TIMEOUT)
                .connect_with(settings.connect_options()?)
                .await?;

            info!("running database migrations");
            crate::migrate::migrate(&pool).await?;

            Ok(Arc::new(PgCredentialStore::new(pool)))
        }
    }
}
