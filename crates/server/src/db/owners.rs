//! Owner repository.
//!
//! Mirrors the customer repository over the disjoint owner namespace. The
//! two tables share no ids (UUIDv4), which is what lets a bare token subject
//! resolve unambiguously.

use sqlx::PgPool;

use tiffinbox_core::{Email, OwnerId};

use super::RepositoryError;
use crate::models::Owner;

const OWNER_COLUMNS: &str = "id, name, email, password_hash, current_refresh_token, created_at";

/// Repository for owner rows.
pub struct OwnerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OwnerRepository<'a> {
    /// Create a new owner repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an owner by id. A miss is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: OwnerId) -> Result<Option<Owner>, RepositoryError> {
        let query = format!("SELECT {OWNER_COLUMNS} FROM owner WHERE id = $1");
        let owner = sqlx::query_as::<_, Owner>(&query)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(owner)
    }

    /// Get an owner by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<Owner>, RepositoryError> {
        let query = format!("SELECT {OWNER_COLUMNS} FROM owner WHERE email = $1");
        let owner = sqlx::query_as::<_, Owner>(&query)
            .bind(email)
            .fetch_optional(self.pool)
            .await?;
        Ok(owner)
    }

    /// Create a new owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists,
    /// `RepositoryError::Database` otherwise.
    pub async fn create(
        &self,
        name: &str,
        email: &Email,
        password_hash: &str,
    ) -> Result<Owner, RepositoryError> {
        let query = format!(
            "INSERT INTO owner (id, name, email, password_hash) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {OWNER_COLUMNS}"
        );
        let owner = sqlx::query_as::<_, Owner>(&query)
            .bind(OwnerId::generate())
            .bind(name)
            .bind(email)
            .bind(password_hash)
            .fetch_one(self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_unique_violation()
                {
                    return RepositoryError::Conflict("email already exists".to_owned());
                }
                RepositoryError::Database(e)
            })?;
        Ok(owner)
    }

    /// Overwrite the live refresh token (rotation).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn store_refresh_token(
        &self,
        id: OwnerId,
        token: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE owner SET current_refresh_token = $2 WHERE id = $1")
            .bind(id)
            .bind(token)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Atomically swap `old_token` for `new_token`; `false` means the stored
    /// token no longer matches (replay of a stale token).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn rotate_refresh_token(
        &self,
        id: OwnerId,
        old_token: &str,
        new_token: &str,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE owner SET current_refresh_token = $3 \
             WHERE id = $1 AND current_refresh_token = $2",
        )
        .bind(id)
        .bind(old_token)
        .bind(new_token)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Clear the live refresh token (logout).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn clear_refresh_token(&self, id: OwnerId) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE owner SET current_refresh_token = NULL WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(())
    }
}
