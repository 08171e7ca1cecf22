//! Customer repository.
//!
//! Refresh-token rotation lives here: `rotate_refresh_token` is a single
//! compare-and-swap UPDATE, so redemption of a stale token can never race a
//! concurrent redemption into two successes.

use sqlx::PgPool;

use tiffinbox_core::{CustomerId, Email};

use super::RepositoryError;
use crate::models::Customer;

const CUSTOMER_COLUMNS: &str =
    "id, username, email, phone_number, password_hash, current_refresh_token, created_at";

/// Repository for customer rows.
pub struct CustomerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CustomerRepository<'a> {
    /// Create a new customer repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a customer by id.
    ///
    /// Absence is expected control flow (the resolver probes this namespace
    /// first), so a miss is `Ok(None)`, never an error.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let query = format!("SELECT {CUSTOMER_COLUMNS} FROM customer WHERE id = $1");
        let customer = sqlx::query_as::<_, Customer>(&query)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(customer)
    }

    /// Get a customer by email or phone number (either identifier logs in).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email_or_phone(
        &self,
        identifier: &str,
    ) -> Result<Option<Customer>, RepositoryError> {
        let query =
            format!("SELECT {CUSTOMER_COLUMNS} FROM customer WHERE email = $1 OR phone_number = $1");
        let customer = sqlx::query_as::<_, Customer>(&query)
            .bind(identifier)
            .fetch_optional(self.pool)
            .await?;
        Ok(customer)
    }

    /// Create a new customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email or phone number is
    /// already registered, `RepositoryError::Database` otherwise.
    pub async fn create(
        &self,
        username: &str,
        email: &Email,
        phone_number: &str,
        password_hash: &str,
    ) -> Result<Customer, RepositoryError> {
        let query = format!(
            "INSERT INTO customer (id, username, email, phone_number, password_hash) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {CUSTOMER_COLUMNS}"
        );
        let customer = sqlx::query_as::<_, Customer>(&query)
            .bind(CustomerId::generate())
            .bind(username)
            .bind(email)
            .bind(phone_number)
            .bind(password_hash)
            .fetch_one(self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_unique_violation()
                {
                    return RepositoryError::Conflict(
                        "email or phone number already exists".to_owned(),
                    );
                }
                RepositoryError::Database(e)
            })?;
        Ok(customer)
    }

    /// Overwrite the live refresh token. This is the rotation mechanism: the
    /// previous token becomes permanently invalid, even if it was never used.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn store_refresh_token(
        &self,
        id: CustomerId,
        token: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE customer SET current_refresh_token = $2 WHERE id = $1")
            .bind(id)
            .bind(token)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Atomically swap `old_token` for `new_token`.
    ///
    /// Returns `false` when the stored token no longer matches `old_token`,
    /// which is how a replayed (already redeemed) refresh token is detected.
    /// The compare and the swap are one UPDATE statement, so two concurrent
    /// redemptions of the same token cannot both succeed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn rotate_refresh_token(
        &self,
        id: CustomerId,
        old_token: &str,
        new_token: &str,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE customer SET current_refresh_token = $3 \
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
    pub async fn clear_refresh_token(&self, id: CustomerId) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE customer SET current_refresh_token = NULL WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(())
    }
}
