//! Storage contract for the user collection.

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

/// A persisted user. The password is stored only as an Argon2id PHC
/// string; the plaintext never reaches the store.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserRecord {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Fields to persist for an insert or a full replace. The id is assigned
/// by the store on insert and never supplied by the caller.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// The two globally-unique fields of a user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Username,
    Email,
}

impl UniqueField {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Email => "email",
        }
    }
}

impl fmt::Display for UniqueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    /// The store's own uniqueness constraint rejected the write. This is
    /// the authoritative signal; the application-level conflict check is
    /// only a fast path.
    #[error("duplicate {0}")]
    Duplicate(UniqueField),

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Filter-based persistence for user records.
///
/// Writes must enforce username/email uniqueness atomically; concurrent
/// inserts of the same value may both pass `count_conflicts`, so the
/// store itself is the serialization point and reports `Duplicate`.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn list(&self) -> anyhow::Result<Vec<UserRecord>>;

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<UserRecord>>;

    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<UserRecord>>;

    /// Count records holding `value` in `field`, excluding at most one
    /// record by id. A single count query; callers only care about zero
    /// versus non-zero.
    async fn count_conflicts(
        &self,
        field: UniqueField,
        value: &str,
        exclude: Option<Uuid>,
    ) -> anyhow::Result<u64>;

    async fn insert(&self, user: NewUser) -> Result<UserRecord, StoreError>;

    /// Full replace of username/email/password hash. `Ok(None)` when the
    /// id does not resolve.
    async fn replace(&self, id: Uuid, user: NewUser) -> Result<Option<UserRecord>, StoreError>;

    /// Returns `false` when the id did not resolve.
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
}
