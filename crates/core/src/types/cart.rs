//! Cart wire types shared by the server and the client engine.

use serde::{Deserialize, Serialize};

use crate::types::id::ProductId;
use crate::types::price::Price;

/// A cart line with its product attributes resolved.
///
/// This is the shape the server returns from every cart endpoint and the
/// shape the client keeps in both its reactive store and its durable cache.
/// Product attributes are joined at read time; the authoritative cart row
/// only stores `(customer, product, qty)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Product this line refers to. At most one line per product per cart.
    pub product_id: ProductId,
    /// Product name at resolution time.
    pub name: String,
    /// Unit price at resolution time.
    pub price: Price,
    /// Product image URL.
    pub image_url: String,
    /// Product kind label (e.g. "veg", "non_veg").
    pub kind: String,
    /// Quantity, always >= 1.
    pub qty: u32,
}

/// A cart mutation attempted while unauthenticated, parked until login.
///
/// Single slot per browser session: a later unauthenticated add overwrites
/// the slot, and the slot is consumed at most once after a successful login.
/// Carries the full product payload so the client can render it without a
/// server round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingCartAction {
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    pub image_url: String,
    pub kind: String,
    pub qty: u32,
}

impl PendingCartAction {
    /// The cart line this action would produce once applied.
    #[must_use]
    pub fn into_line(self) -> CartLine {
        CartLine {
            product_id: self.product_id,
            name: self.name,
            price: self.price,
            image_url: self.image_url,
            kind: self.kind,
            qty: self.qty,
        }
    }
}
