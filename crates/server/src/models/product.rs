//! Product domain type.
//!
//! Product CRUD is a collaborator, not part of this core; the table exists
//! because cart reads join product attributes into every line.

use chrono::{DateTime, Utc};
use serde::Serialize;

use tiffinbox_core::{OwnerId, Price, ProductId};

/// A product row.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    pub owner_id: OwnerId,
    pub name: String,
    pub price: Price,
    pub image_url: String,
    /// Kind label, e.g. "veg" / "non_veg".
    pub kind: String,
    pub created_at: DateTime<Utc>,
}
