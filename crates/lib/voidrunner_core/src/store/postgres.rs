//! PostgreSQL credential store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::{CredentialStore, StoreError};
use crate::models::auth::{Credential, NewCredential};

/// Row shape shared by every credential query.
type CredentialRow = (
    i64,
    String,
    String,
    String,
    Option<String>,
    Option<String>,
    DateTime<Utc>,
    DateTime<Utc>,
);

const CREDENTIAL_COLUMNS: &str =
    "id, username, email, password_hash, first_name, last_name, created_at, updated_at";

fn into_credential(row: CredentialRow) -> Credential {
    let (id, username, email, password_hash, first_name, last_name, created_at, updated_at) = row;
    Credential {
        id,
        username,
        email,
        password_hash,
        first_name,
        last_name,
        created_at,
        updated_at,
    }
}

/// Credential store backed by the `users` table.
#[derive(Debug, Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_identifier(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<Credential>, StoreError> {
        let row = sqlx::query_as::<_, CredentialRow>(&format!(
            "SELECT {CREDENTIAL_COLUMNS} FROM users \
             WHERE username = $1 OR email = $2 \
             ORDER BY id LIMIT 1"
        ))
        .bind(username)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(into_credential))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Credential>, StoreError> {
        let row = sqlx::query_as::<_, CredentialRow>(&format!(
            "SELECT {CREDENTIAL_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(into_credential))
    }

    async fn create(&self, new: NewCredential) -> Result<Credential, StoreError> {
        let row = sqlx::query_as::<_, CredentialRow>(&format!(
            "INSERT INTO users (username, email, password_hash, first_name, last_name) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {CREDENTIAL_COLUMNS}"
        ))
        .bind(&new.username)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.first_name)
        .bind(&new.last_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Conflict(db.constraint().unwrap_or("users").to_string())
            }
            other => StoreError::Sql(other),
        })?;
        Ok(into_credential(row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uuid::token_id;

    fn new_credential(username: &str, email: &str) -> NewCredential {
        NewCredential {
            username: username.into(),
            email: email.into(),
            password_hash: "$2b$10$hash".into(),
            first_name: Some("Ada".into()),
            last_name: None,
        }
    }

    async fn store() -> PgCredentialStore {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let pool = PgPool::connect(&url).await.expect("connect");
        crate::migrate::migrate(&pool).await.expect("migrate");
        PgCredentialStore::new(pool)
    }

    #[test]
    fn row_maps_to_credential_in_column_order() {
        let now = Utc::now();
        let credential = into_credential((
            42,
            "alice".into(),
            "alice@x.com".into(),
            "$2b$10$hash".into(),
            Some("Alice".into()),
            None,
            now,
            now,
        ));
        assert_eq!(credential.id, 42);
        assert_eq!(credential.username, "alice");
        assert_eq!(credential.email, "alice@x.com");
        assert_eq!(credential.password_hash, "$2b$10$hash");
        assert_eq!(credential.first_name.as_deref(), Some("Alice"));
        assert_eq!(credential.last_name, None);
        assert_eq!(credential.created_at, now);
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn create_then_find_round_trips_columns() {
        let store = store().await;
        let tag = token_id();
        let username = format!("u-{tag}");
        let email = format!("{tag}@x.com");

        let created = store
            .create(new_credential(&username, &email))
            .await
            .unwrap();
        assert_eq!(created.username, username);
        assert_eq!(created.first_name.as_deref(), Some("Ada"));

        let by_id = store.find_by_id(created.id).await.unwrap();
        let by_email = store.find_by_identifier("nobody", &email).await.unwrap();
        assert_eq!(by_id, Some(created.clone()));
        assert_eq!(by_email, Some(created));
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn unique_violation_is_conflict() {
        let store = store().await;
        let tag = token_id();
        let username = format!("u-{tag}");
        let email = format!("{tag}@x.com");
        store
            .create(new_credential(&username, &email))
            .await
            .unwrap();

        let dup_name = store
            .create(new_credential(&username, &format!("other-{tag}@x.com")))
            .await;
        let dup_email = store
            .create(new_credential(&format!("other-{tag}"), &email))
            .await;

        assert!(matches!(dup_name, Err(StoreError::Conflict(_))));
        assert!(matches!(dup_email, Err(StoreError::Conflict(_))));
    }
}
