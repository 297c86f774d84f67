//! In-memory credential store.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use chrono::Utc;

use super::{CredentialStore, StoreError};
use crate::models::auth::{Credential, NewCredential};

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    by_id: BTreeMap<i64, Credential>,
}

/// Process-local credential store. Ids are assigned sequentially from 1.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    inner: RwLock<Inner>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored credentials.
    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .by_id
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_identifier(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<Credential>, StoreError> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Ok(inner
            .by_id
            .values()
            .find(|c| c.username == username || c.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Credential>, StoreError> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Ok(inner.by_id.get(&id).cloned())
    }

    async fn create(&self, new: NewCredential) -> Result<Credential, StoreError> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);

        // Re-checked under the write lock so concurrent registrations of the
        // same identity cannot both succeed.
        if let Some(existing) = inner
            .by_id
            .values()
            .find(|c| c.username == new.username || c.email == new.email)
        {
            let field = if existing.username == new.username {
                "username"
            } else {
                "email"
            };
            return Err(StoreError::Conflict(format!("{field} already taken")));
        }

        inner.next_id += 1;
        let now = Utc::now();
        let credential = Credential {
            id: inner.next_id,
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
            first_name: new.first_name,
            last_name: new.last_name,
            created_at: now,
            updated_at: now,
        };
        inner.by_id.insert(credential.id, credential.clone());
        Ok(credential)
    }
}
