//! User directory: CRUD orchestration over the user store.

pub mod memory;
pub mod pg;
pub mod store;
pub mod validate;

use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::password;
use store::{NewUser, StoreError, UniqueField, UserRecord, UserStore};
use validate::{UserInput, ValidationError};

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{field} already exists")]
    Conflict { field: UniqueField },

    #[error("user not found")]
    NotFound,

    #[error(transparent)]
    Store(anyhow::Error),
}

impl From<StoreError> for DirectoryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(field) => Self::Conflict { field },
            StoreError::Backend(err) => Self::Store(err),
        }
    }
}

/// CRUD over the user collection, enforcing shape validation and the
/// username/email uniqueness invariants on every write.
pub struct UserDirectory {
    store: Arc<dyn UserStore>,
}

impl UserDirectory {
    #[must_use]
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// # Errors
    /// Returns `DirectoryError::Store` on store failure.
    pub async fn list(&self) -> Result<Vec<UserRecord>, DirectoryError> {
        self.store.list().await.map_err(DirectoryError::Store)
    }

    /// # Errors
    /// Returns `DirectoryError::NotFound` when the id does not resolve.
    pub async fn get(&self, id: Uuid) -> Result<UserRecord, DirectoryError> {
        self.store
            .find_by_id(id)
            .await
            .map_err(DirectoryError::Store)?
            .ok_or(DirectoryError::NotFound)
    }

    /// Create a user: validate, check conflicts, hash, insert.
    ///
    /// The conflict checks are a fast path; the store's own uniqueness
    /// enforcement has the final word and is reported identically.
    ///
    /// # Errors
    /// `Validation` before any store access, `Conflict{field}` when the
    /// username or email is taken, `Store` on backend failure.
    pub async fn create(
        &self,
        username: &str,
        email: &str,
        plaintext_password: &str,
    ) -> Result<UserRecord, DirectoryError> {
        let input = UserInput::new(username, email, plaintext_password)?;
        self.ensure_unique(&input, None).await?;

        let password_hash =
            password::hash(&input.password).map_err(|e| DirectoryError::Store(e.into()))?;

        let record = self
            .store
            .insert(NewUser {
                username: input.username,
                email: input.email,
                password_hash,
            })
            .await?;

        Ok(record)
    }

    /// Full replace of an existing user. Uniqueness checks exclude the
    /// record itself, so re-submitting the current username or email is
    /// not a conflict. The password is always re-hashed.
    ///
    /// # Errors
    /// Same as [`Self::create`], plus `NotFound` when the id does not
    /// resolve.
    pub async fn update(
        &self,
        id: Uuid,
        username: &str,
        email: &str,
        plaintext_password: &str,
    ) -> Result<UserRecord, DirectoryError> {
        let input = UserInput::new(username, email, plaintext_password)?;
        self.ensure_unique(&input, Some(id)).await?;

        let password_hash =
            password::hash(&input.password).map_err(|e| DirectoryError::Store(e.into()))?;

        let replaced = self
            .store
            .replace(
                id,
                NewUser {
                    username: input.username,
                    email: input.email,
                    password_hash,
                },
            )
            .await?;

        replaced.ok_or(DirectoryError::NotFound)
    }

    /// # Errors
    /// Returns `DirectoryError::NotFound` when the id does not resolve.
    pub async fn delete(&self, id: Uuid) -> Result<(), DirectoryError> {
        let removed = self
            .store
            .delete(id)
            .await
            .map_err(DirectoryError::Store)?;

        if removed {
            Ok(())
        } else {
            Err(DirectoryError::NotFound)
        }
    }

    async fn ensure_unique(
        &self,
        input: &UserInput,
        exclude: Option<Uuid>,
    ) -> Result<(), DirectoryError> {
        for field in [UniqueField::Username, UniqueField::Email] {
            let value = match field {
                UniqueField::Username => &input.username,
                UniqueField::Email => &input.email,
            };
            let conflicts = self
                .store
                .count_conflicts(field, value, exclude)
                .await
                .map_err(DirectoryError::Store)?;
            if conflicts > 0 {
                return Err(DirectoryError::Conflict { field });
            }
        }
        Ok(())
    }
}
