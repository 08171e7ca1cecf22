//! Cart routes - customer-only, always responding with the full resolved
//! cart so clients can replace their local copy wholesale.

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use tiffinbox_core::ProductId;

use crate::db::carts::CartRepository;
use crate::db::products::ProductRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireCustomer;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddRequest {
    pub product_id: ProductId,
    /// Signed quantity delta (not the new total). Defaults to 1; negative
    /// deltas lower an existing line, floored at quantity 1.
    #[serde(default = "default_qty")]
    pub qty: i32,
}

const fn default_qty() -> i32 {
    1
}

/// POST /cart/add
///
/// Applies the `qty` delta to the line (upsert), then returns the whole
/// resolved cart.
#[tracing::instrument(skip_all)]
pub async fn add(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
    Json(req): Json<AddRequest>,
) -> Result<impl IntoResponse> {
    if req.qty == 0 {
        return Err(AppError::Validation("qty must be nonzero".to_owned()));
    }

    if ProductRepository::new(state.pool())
        .get_by_id(req.product_id)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound("product does not exist".to_owned()));
    }

    let carts = CartRepository::new(state.pool());
    carts
        .add_item(customer.id, req.product_id, req.qty)
        .await
        .map_err(|e| match e {
            // The product can disappear between the check and the insert.
            crate::db::RepositoryError::NotFound => {
                AppError::NotFound("product does not exist".to_owned())
            }
            other => other.into(),
        })?;

    let lines = carts.get_cart(customer.id).await?;
    tracing::debug!(customer_id = %customer.id, product_id = %req.product_id, qty = req.qty, "cart item added");
    Ok(Json(json!({ "cart": lines })))
}

/// GET /cart/
#[tracing::instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
) -> Result<impl IntoResponse> {
    let lines = CartRepository::new(state.pool()).get_cart(customer.id).await?;
    Ok(Json(json!({ "cart": lines })))
}

/// DELETE /cart/{product_id}
///
/// 404 when the customer has no cart at all; removing a product that is not
/// in an existing cart is a success (idempotent delete).
#[tracing::instrument(skip_all)]
pub async fn remove(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
    Path(product_id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    let carts = CartRepository::new(state.pool());

    if !carts.has_cart(customer.id).await? {
        return Err(AppError::NotFound("cart not found".to_owned()));
    }

    carts.remove_item(customer.id, product_id).await?;
    let lines = carts.get_cart(customer.id).await?;
    tracing::debug!(customer_id = %customer.id, product_id = %product_id, "cart item removed");
    Ok(Json(json!({ "cart": lines })))
}
