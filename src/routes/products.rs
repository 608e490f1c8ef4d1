use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::products::{CreateProductRequest, ProductList},
    error::{AppResult, ErrorBody},
    extract::AppJson,
    models::Product,
    response::ApiResponse,
    services::product_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/post", post(create_product))
        .route("/get_all", get(list_products))
}

#[utoipa::path(
    post,
    path = "/api/products/post",
    request_body = CreateProductRequest,
    responses(
        (status = 200, description = "Product created", body = ApiResponse<Product>),
        (status = 400, description = "Malformed product", body = ErrorBody)
    ),
    security(()),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateProductRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = product_service::create_product(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/get_all",
    responses(
        (status = 200, description = "Every product in the catalog", body = ProductList),
        (status = 500, description = "Internal error", body = ErrorBody)
    ),
    security(()),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
) -> AppResult<Json<ProductList>> {
    let resp = product_service::list_products(&state).await?;
    Ok(Json(resp))
}
