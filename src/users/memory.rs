//! In-memory user store.
//!
//! Backs the test suites and keeps the uniqueness contract testable
//! without a database: every write holds the single mutex, so the
//! duplicate check and the write are one atomic step, exactly the role
//! the unique constraints play in the Postgres store.

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::store::{NewUser, StoreError, UniqueField, UserRecord, UserStore};

#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<Vec<UserRecord>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn conflict(users: &[UserRecord], user: &NewUser, exclude: Option<Uuid>) -> Option<UniqueField> {
        for existing in users {
            if Some(existing.id) == exclude {
                continue;
            }
            if existing.username == user.username {
                return Some(UniqueField::Username);
            }
            if existing.email == user.email {
                return Some(UniqueField::Email);
            }
        }
        None
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn list(&self) -> anyhow::Result<Vec<UserRecord>> {
        Ok(self.users.lock().await.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<UserRecord>> {
        let users = self.users.lock().await;
        Ok(users.iter().find(|user| user.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<UserRecord>> {
        let users = self.users.lock().await;
        Ok(users.iter().find(|user| user.username == username).cloned())
    }

    async fn count_conflicts(
        &self,
        field: UniqueField,
        value: &str,
        exclude: Option<Uuid>,
    ) -> anyhow::Result<u64> {
        let users = self.users.lock().await;
        let count = users
            .iter()
            .filter(|user| Some(user.id) != exclude)
            .filter(|user| match field {
                UniqueField::Username => user.username == value,
                UniqueField::Email => user.email == value,
            })
            .count();
        Ok(count as u64)
    }

    async fn insert(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let mut users = self.users.lock().await;
        if let Some(field) = Self::conflict(&users, &user, None) {
            return Err(StoreError::Duplicate(field));
        }
        let record = UserRecord {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
        };
        users.push(record.clone());
        Ok(record)
    }

    async fn replace(&self, id: Uuid, user: NewUser) -> Result<Option<UserRecord>, StoreError> {
        let mut users = self.users.lock().await;
        if !users.iter().any(|existing| existing.id == id) {
            return Ok(None);
        }
        if let Some(field) = Self::conflict(&users, &user, Some(id)) {
            return Err(StoreError::Duplicate(field));
        }
        let record = UserRecord {
            id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
        };
        for existing in users.iter_mut() {
            if existing.id == id {
                *existing = record.clone();
            }
        }
        Ok(Some(record))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut users = self.users.lock().await;
        let before = users.len();
        users.retain(|user| user.id != id);
        Ok(users.len() < before)
    }
}
