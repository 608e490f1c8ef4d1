#![allow(dead_code)]

use storefront_api::{
    middleware::auth::AuthUser,
    models::{NewProduct, Product},
    services::auth_service::AuthGateway,
    state::AppState,
};

pub const TEST_SECRET: &str = "integration-test-secret";

pub fn gateway() -> AuthGateway {
    AuthGateway::new(TEST_SECRET, chrono::Duration::minutes(15))
}

pub fn memory_state() -> AppState {
    AppState::in_memory(gateway())
}

pub async fn create_user(state: &AppState, email: &str) -> AuthUser {
    let user = state
        .users
        .create(email, "not-a-real-hash")
        .await
        .expect("create user");
    AuthUser { user_id: user.id }
}

pub async fn create_product(state: &AppState, title: &str, price: i64) -> Product {
    state
        .products
        .create(NewProduct {
            title: title.to_string(),
            description: Some(format!("{title} for testing")),
            price,
            image: None,
            category: Some("electronics".into()),
        })
        .await
        .expect("create product")
}
