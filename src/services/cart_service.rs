//! Cart engine: one cart per user, one line item per (cart, product).
//!
//! Totals are never stored. [`cart_total`] derives them from the line items
//! on every read, so adds, removals and clears cannot leave them stale.

use uuid::Uuid;

use crate::{
    dto::cart::{AddToCartRequest, RemoveFromCartRequest},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Cart, CartItem, Removal},
    response::MessageResponse,
    state::AppState,
};

/// Quantity of a line item after adding `requested` units to it.
/// A new line item starts at the requested quantity. A sum past `i32::MAX`
/// is rejected and the line keeps its current quantity.
pub fn merge_quantity(existing: Option<i32>, requested: i32) -> AppResult<i32> {
    match existing {
        Some(current) => current.checked_add(requested).ok_or_else(|| {
            AppError::BadRequest(format!(
                "cart item quantity cannot exceed {}",
                i32::MAX
            ))
        }),
        None => Ok(requested),
    }
}

/// Quantity left after taking one unit out; `None` means delete the row.
pub fn quantity_after_removal(current: i32) -> Option<i32> {
    if current <= 1 { None } else { Some(current - 1) }
}

pub fn cart_total(items: &[CartItem]) -> i64 {
    items
        .iter()
        .map(|item| item.price.saturating_mul(i64::from(item.quantity)))
        .fold(0i64, i64::saturating_add)
}

pub async fn add_to_cart(
    state: &AppState,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<MessageResponse> {
    if payload.quantity < 1 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }

    let product = state
        .products
        .find_by_id(payload.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("product not found".to_string()))?;

    let line = state
        .carts
        .add_item(user.user_id, &product, payload.quantity)
        .await?;

    tracing::info!(
        user_id = %user.user_id,
        product_id = %product.id,
        added = payload.quantity,
        quantity = line.quantity,
        "cart item merged"
    );

    Ok(MessageResponse::new("user's cart products added successfully"))
}

pub async fn get_cart(state: &AppState, user: &AuthUser) -> AppResult<Cart> {
    let cart = state.carts.find_or_create(user.user_id).await?;
    let items = state.carts.items(cart.id).await?;
    let total = cart_total(&items);

    Ok(Cart {
        id: cart.id,
        user_id: cart.user_id,
        items,
        total,
    })
}

pub async fn remove_from_cart(
    state: &AppState,
    user: &AuthUser,
    payload: RemoveFromCartRequest,
) -> AppResult<MessageResponse> {
    let removal = remove_unit(state, user.user_id, payload.product_id).await?;

    match removal {
        Removal::Deleted => tracing::info!(
            user_id = %user.user_id,
            product_id = %payload.product_id,
            "cart item deleted"
        ),
        Removal::Decremented { quantity } => tracing::info!(
            user_id = %user.user_id,
            product_id = %payload.product_id,
            quantity,
            "cart item decremented"
        ),
    }

    Ok(MessageResponse::new("item deleted successfully"))
}

async fn remove_unit(state: &AppState, user_id: Uuid, product_id: Uuid) -> AppResult<Removal> {
    state
        .carts
        .remove_unit(user_id, product_id)
        .await?
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("cart item not found")))
}

pub async fn clear_cart(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<MessageResponse> {
    if !state.carts.delete_for_user(user.user_id).await? {
        return Err(AppError::Internal(anyhow::anyhow!(
            "user's cart not found"
        )));
    }

    tracing::info!(user_id = %user.user_id, "cart cleared");
    Ok(MessageResponse::new("user's cart deleted successfully"))
}
