//! Cart repository - the authoritative per-customer cart.
//!
//! The cart is a set of `(customer_id, product_id, qty)` rows, at most one
//! per product. Increments are a single upsert statement, so concurrent adds
//! for the same customer both land; there is no whole-cart read-modify-write
//! anywhere in this module.

use sqlx::PgPool;

use tiffinbox_core::{CartLine, CustomerId, Price, ProductId};

use super::RepositoryError;

/// Row shape for a resolved cart line (joined to product attributes).
#[derive(Debug, sqlx::FromRow)]
struct ResolvedLineRow {
    product_id: ProductId,
    name: String,
    price: Price,
    image_url: String,
    kind: String,
    qty: i32,
}

impl From<ResolvedLineRow> for CartLine {
    fn from(row: ResolvedLineRow) -> Self {
        Self {
            product_id: row.product_id,
            name: row.name,
            price: row.price,
            image_url: row.image_url,
            kind: row.kind,
            qty: u32::try_from(row.qty).unwrap_or(1),
        }
    }
}

/// Repository for cart rows.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Apply the signed `qty_delta` to the customer's line for `product_id`.
    ///
    /// A positive delta is an atomic upsert: an existing line is incremented,
    /// a missing one is created with the delta. A negative delta lowers an
    /// existing line, floored at quantity 1; a negative delta on a missing
    /// line is a no-op (decrementing never creates cart rows).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist
    /// (foreign key violation), `RepositoryError::Database` otherwise.
    pub async fn add_item(
        &self,
        customer_id: CustomerId,
        product_id: ProductId,
        qty_delta: i32,
    ) -> Result<(), RepositoryError> {
        if qty_delta < 0 {
            sqlx::query(
                "UPDATE cart_line SET qty = GREATEST(qty + $3, 1) \
                 WHERE customer_id = $1 AND product_id = $2",
            )
            .bind(customer_id)
            .bind(product_id)
            .bind(qty_delta)
            .execute(self.pool)
            .await?;
            return Ok(());
        }

        sqlx::query(
            "INSERT INTO cart_line (customer_id, product_id, qty) \
             VALUES ($1, $2, GREATEST($3, 1)) \
             ON CONFLICT (customer_id, product_id) \
             DO UPDATE SET qty = cart_line.qty + $3",
        )
        .bind(customer_id)
        .bind(product_id)
        .bind(qty_delta)
        .execute(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::NotFound;
            }
            RepositoryError::Database(e)
        })?;
        Ok(())
    }

    /// Get the customer's cart with product attributes resolved.
    ///
    /// An absent cart is an empty list, not an error.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_cart(&self, customer_id: CustomerId) -> Result<Vec<CartLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, ResolvedLineRow>(
            "SELECT p.id AS product_id, p.name, p.price, p.image_url, p.kind, c.qty \
             FROM cart_line c \
             JOIN product p ON p.id = c.product_id \
             WHERE c.customer_id = $1",
        )
        .bind(customer_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(CartLine::from).collect())
    }

    /// Whether the customer has any cart rows at all.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn has_cart(&self, customer_id: CustomerId) -> Result<bool, RepositoryError> {
        let exists: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM cart_line WHERE customer_id = $1)")
                .bind(customer_id)
                .fetch_one(self.pool)
                .await?;
        Ok(exists.0)
    }

    /// Delete the customer's line for `product_id`.
    ///
    /// Deleting a line that is already absent is a no-op - removal is
    /// idempotent. (Whether the customer has a cart at all is the route's
    /// concern, via [`Self::has_cart`].)
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn remove_item(
        &self,
        customer_id: CustomerId,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM cart_line WHERE customer_id = $1 AND product_id = $2")
            .bind(customer_id)
            .bind(product_id)
            .execute(self.pool)
            .await?;
        Ok(())
    }
}
