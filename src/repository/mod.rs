//! Data-access ports for the storefront.
//!
//! Services only ever talk to these traits. [`postgres::PostgresRepository`]
//! is the production backend; [`memory::MemoryRepository`] keeps everything
//! in process and backs the test suite.

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        CartItem, CartLine, CartRef, Feedback, NewFeedback, NewProduct, Product, Removal, User,
    },
};

pub mod memory;
pub mod postgres;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user. A taken email is reported as `AppError::BadRequest`.
    async fn create(&self, email: &str, password_hash: &str) -> AppResult<User>;
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create(&self, product: NewProduct) -> AppResult<Product>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Product>>;
    /// Every product, newest first.
    async fn list(&self) -> AppResult<Vec<Product>>;
}

#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Atomic find-or-create of the user's single cart.
    async fn find_or_create(&self, user_id: Uuid) -> AppResult<CartRef>;

    /// Merge `quantity` units of `product` into the user's cart, creating the
    /// cart and the line item as needed. Runs as one transaction that holds
    /// the cart row for its whole duration.
    async fn add_item(&self, user_id: Uuid, product: &Product, quantity: i32)
    -> AppResult<CartLine>;

    /// Line items of a cart joined with their products, oldest first.
    async fn items(&self, cart_id: Uuid) -> AppResult<Vec<CartItem>>;

    /// Take one unit of `product_id` out of the user's cart.
    /// `None` when the user has no cart or the product is not in it.
    async fn remove_unit(&self, user_id: Uuid, product_id: Uuid) -> AppResult<Option<Removal>>;

    /// Delete the user's cart and its line items. `false` when there was none.
    async fn delete_for_user(&self, user_id: Uuid) -> AppResult<bool>;
}

#[async_trait]
pub trait FeedbackRepository: Send + Sync {
    async fn create(&self, feedback: NewFeedback) -> AppResult<Feedback>;
    /// All feedback for a product, newest first.
    async fn list_for_product(&self, product_id: Uuid) -> AppResult<Vec<Feedback>>;
    /// Mean rating, `None` when the product has no feedback.
    async fn average_rating(&self, product_id: Uuid) -> AppResult<Option<f64>>;
    async fn latest_for_user(&self, user_id: Uuid, product_id: Uuid)
    -> AppResult<Option<Feedback>>;
}
