use axum::{
    Json, Router,
    extract::State,
    routing::{delete, get, post, put},
};

use crate::{
    dto::cart::{AddToCartRequest, RemoveFromCartRequest},
    error::{AppResult, ErrorBody},
    extract::AppJson,
    middleware::auth::AuthUser,
    models::Cart,
    response::MessageResponse,
    services::cart_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/add_product", post(add_to_cart))
        .route("/get_cart", get(get_cart))
        .route("/remove_product", put(remove_from_cart))
        .route("/clean_cart", delete(clean_cart))
}

#[utoipa::path(
    post,
    path = "/api/cart/add_product",
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Product merged into the cart", body = MessageResponse),
        (status = 400, description = "Bad request", body = ErrorBody),
        (status = 404, description = "Product not found", body = ErrorBody),
        (status = 500, description = "Internal error", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<AddToCartRequest>,
) -> AppResult<Json<MessageResponse>> {
    let resp = cart_service::add_to_cart(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/cart/get_cart",
    responses(
        (status = 200, description = "Current user's cart with derived total", body = Cart),
        (status = 500, description = "Internal error", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn get_cart(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<Cart>> {
    let resp = cart_service::get_cart(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/cart/remove_product",
    request_body = RemoveFromCartRequest,
    responses(
        (status = 200, description = "One unit removed", body = MessageResponse),
        (status = 500, description = "Item not in cart or internal error", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<RemoveFromCartRequest>,
) -> AppResult<Json<MessageResponse>> {
    let resp = cart_service::remove_from_cart(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/cart/clean_cart",
    responses(
        (status = 200, description = "Cart deleted", body = MessageResponse),
        (status = 500, description = "No cart or internal error", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn clean_cart(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<MessageResponse>> {
    let resp = cart_service::clear_cart(&state, &user).await?;
    Ok(Json(resp))
}
