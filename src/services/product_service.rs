use crate::{
    dto::products::{CreateProductRequest, ProductList},
    error::AppResult,
    models::{NewProduct, Product},
    response::ApiResponse,
    state::AppState,
};

pub async fn create_product(
    state: &AppState,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    let product = state
        .products
        .create(NewProduct {
            title: payload.title,
            description: payload.description,
            price: payload.price,
            image: payload.image,
            category: payload.category,
        })
        .await?;

    tracing::info!(product_id = %product.id, price = product.price, "product created");
    Ok(ApiResponse::success(
        "product created successfully",
        product,
    ))
}

pub async fn list_products(state: &AppState) -> AppResult<ProductList> {
    let items = state.products.list().await?;
    Ok(ProductList { items })
}
