//! Postgres-backed user store.
//!
//! The `users_username_key` / `users_email_key` unique constraints in
//! `sql/schema.sql` are the authoritative uniqueness check; a concurrent
//! writer that slips past `count_conflicts` is stopped here and surfaced
//! as `StoreError::Duplicate`.

use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

use super::store::{NewUser, StoreError, UniqueField, UserRecord, UserStore};

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn record_from_row(row: &PgRow) -> UserRecord {
    UserRecord {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
    }
}

fn query_span(operation: &str, statement: &str) -> tracing::Span {
    tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = operation,
        db.statement = statement
    )
}

/// Map a unique-constraint violation (SQLSTATE 23505) back to the field
/// whose constraint fired.
fn duplicate_field(err: &sqlx::Error) -> Option<UniqueField> {
    let sqlx::Error::Database(db_err) = err else {
        return None;
    };
    if db_err.code().as_deref() != Some("23505") {
        return None;
    }
    match db_err.constraint() {
        Some("users_username_key") => Some(UniqueField::Username),
        Some("users_email_key") => Some(UniqueField::Email),
        // 23505 on an unknown constraint still means a duplicate; blame
        // the username rather than report a server fault.
        _ => Some(UniqueField::Username),
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn list(&self) -> anyhow::Result<Vec<UserRecord>> {
        let query = "SELECT id, username, email, password_hash FROM users ORDER BY created_at";
        let rows = sqlx::query(query)
            .fetch_all(&self.pool)
            .instrument(query_span("SELECT", query))
            .await
            .context("failed to list users")?;

        Ok(rows.iter().map(record_from_row).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<UserRecord>> {
        let query = "SELECT id, username, email, password_hash FROM users WHERE id = $1";
        let row = sqlx::query(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(query_span("SELECT", query))
            .await
            .context("failed to fetch user by id")?;

        Ok(row.as_ref().map(record_from_row))
    }

    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<UserRecord>> {
        let query = "SELECT id, username, email, password_hash FROM users WHERE username = $1";
        let row = sqlx::query(query)
            .bind(username)
            .fetch_optional(&self.pool)
            .instrument(query_span("SELECT", query))
            .await
            .context("failed to fetch user by username")?;

        Ok(row.as_ref().map(record_from_row))
    }

    async fn count_conflicts(
        &self,
        field: UniqueField,
        value: &str,
        exclude: Option<Uuid>,
    ) -> anyhow::Result<u64> {
        let query = match field {
            UniqueField::Username => {
                "SELECT COUNT(*) AS conflicts FROM users \
                 WHERE username = $1 AND ($2::uuid IS NULL OR id <> $2)"
            }
            UniqueField::Email => {
                "SELECT COUNT(*) AS conflicts FROM users \
                 WHERE email = $1 AND ($2::uuid IS NULL OR id <> $2)"
            }
        };
        let row = sqlx::query(query)
            .bind(value)
            .bind(exclude)
            .fetch_one(&self.pool)
            .instrument(query_span("SELECT", query))
            .await
            .context("failed to count uniqueness conflicts")?;

        let conflicts: i64 = row.get("conflicts");
        Ok(conflicts.unsigned_abs())
    }

    async fn insert(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let query = "INSERT INTO users (username, email, password_hash) \
                     VALUES ($1, $2, $3) \
                     RETURNING id, username, email, password_hash";
        let row = sqlx::query(query)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .fetch_one(&self.pool)
            .instrument(query_span("INSERT", query))
            .await;

        match row {
            Ok(row) => Ok(record_from_row(&row)),
            Err(err) => match duplicate_field(&err) {
                Some(field) => Err(StoreError::Duplicate(field)),
                None => Err(StoreError::Backend(
                    anyhow::Error::new(err).context("failed to insert user"),
                )),
            },
        }
    }

    async fn replace(&self, id: Uuid, user: NewUser) -> Result<Option<UserRecord>, StoreError> {
        let query = "UPDATE users \
                     SET username = $1, email = $2, password_hash = $3, updated_at = NOW() \
                     WHERE id = $4 \
                     RETURNING id, username, email, password_hash";
        let row = sqlx::query(query)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(query_span("UPDATE", query))
            .await;

        match row {
            Ok(row) => Ok(row.as_ref().map(record_from_row)),
            Err(err) => match duplicate_field(&err) {
                Some(field) => Err(StoreError::Duplicate(field)),
                None => Err(StoreError::Backend(
                    anyhow::Error::new(err).context("failed to replace user"),
                )),
            },
        }
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let query = "DELETE FROM users WHERE id = $1";
        let result = sqlx::query(query)
            .bind(id)
            .execute(&self.pool)
            .instrument(query_span("DELETE", query))
            .await
            .context("failed to delete user")?;

        Ok(result.rows_affected() > 0)
    }
}
