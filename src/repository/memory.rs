use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        CartItem, CartLine, CartRef, Feedback, NewFeedback, NewProduct, Product, Removal, User,
    },
    repository::{CartRepository, FeedbackRepository, ProductRepository, UserRepository},
    services::{
        cart_service::{merge_quantity, quantity_after_removal},
        feedback_service::mean_rating,
    },
};

#[derive(Default)]
struct MemoryStore {
    users: Vec<User>,
    products: Vec<Product>,
    carts: Vec<CartRef>,
    lines: Vec<CartLine>,
    feedbacks: Vec<Feedback>,
}

impl MemoryStore {
    fn product(&self, id: Uuid) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    fn cart_for(&self, user_id: Uuid) -> Option<CartRef> {
        self.carts.iter().find(|c| c.user_id == user_id).copied()
    }

    fn cart_or_insert(&mut self, user_id: Uuid) -> CartRef {
        if let Some(cart) = self.cart_for(user_id) {
            return cart;
        }
        let cart = CartRef {
            id: Uuid::new_v4(),
            user_id,
        };
        self.carts.push(cart);
        cart
    }
}

/// Process-local storage. Every mutation runs under a single write guard,
/// which gives the same per-cart serialization the Postgres backend gets
/// from row locks.
#[derive(Default)]
pub struct MemoryRepository {
    store: RwLock<MemoryStore>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryRepository {
    async fn create(&self, email: &str, password_hash: &str) -> AppResult<User> {
        let mut store = self.store.write().await;
        if store.users.iter().any(|u| u.email == email) {
            return Err(AppError::BadRequest("Email is already taken".into()));
        }
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        store.users.push(user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let store = self.store.read().await;
        Ok(store.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let store = self.store.read().await;
        Ok(store.users.iter().find(|u| u.id == id).cloned())
    }
}

#[async_trait]
impl ProductRepository for MemoryRepository {
    async fn create(&self, product: NewProduct) -> AppResult<Product> {
        let product = Product {
            id: Uuid::new_v4(),
            title: product.title,
            description: product.description,
            price: product.price,
            image: product.image,
            category: product.category,
            created_at: Utc::now(),
        };
        self.store.write().await.products.push(product.clone());
        Ok(product)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Product>> {
        let store = self.store.read().await;
        Ok(store.product(id).cloned())
    }

    async fn list(&self) -> AppResult<Vec<Product>> {
        let store = self.store.read().await;
        Ok(store.products.iter().rev().cloned().collect())
    }
}

#[async_trait]
impl CartRepository for MemoryRepository {
    async fn find_or_create(&self, user_id: Uuid) -> AppResult<CartRef> {
        Ok(self.store.write().await.cart_or_insert(user_id))
    }

    async fn add_item(
        &self,
        user_id: Uuid,
        product: &Product,
        quantity: i32,
    ) -> AppResult<CartLine> {
        let mut store = self.store.write().await;
        let cart = store.cart_or_insert(user_id);

        let existing = store
            .lines
            .iter_mut()
            .find(|l| l.cart_id == cart.id && l.product_id == product.id);
        if let Some(line) = existing {
            line.quantity = merge_quantity(Some(line.quantity), quantity)?;
            return Ok(line.clone());
        }

        let line = CartLine {
            id: Uuid::new_v4(),
            cart_id: cart.id,
            product_id: product.id,
            quantity: merge_quantity(None, quantity)?,
            price: product.price,
        };
        store.lines.push(line.clone());
        Ok(line)
    }

    async fn items(&self, cart_id: Uuid) -> AppResult<Vec<CartItem>> {
        let store = self.store.read().await;
        let items = store
            .lines
            .iter()
            .filter(|l| l.cart_id == cart_id)
            .filter_map(|line| {
                store.product(line.product_id).map(|product| CartItem {
                    id: line.id,
                    product_id: line.product_id,
                    product: product.clone(),
                    quantity: line.quantity,
                    price: line.price,
                })
            })
            .collect();
        Ok(items)
    }

    async fn remove_unit(&self, user_id: Uuid, product_id: Uuid) -> AppResult<Option<Removal>> {
        let mut store = self.store.write().await;
        let Some(cart) = store.cart_for(user_id) else {
            return Ok(None);
        };
        let Some(index) = store
            .lines
            .iter()
            .position(|l| l.cart_id == cart.id && l.product_id == product_id)
        else {
            return Ok(None);
        };

        let removal = match quantity_after_removal(store.lines[index].quantity) {
            None => {
                store.lines.remove(index);
                Removal::Deleted
            }
            Some(quantity) => {
                store.lines[index].quantity = quantity;
                Removal::Decremented { quantity }
            }
        };
        Ok(Some(removal))
    }

    async fn delete_for_user(&self, user_id: Uuid) -> AppResult<bool> {
        let mut store = self.store.write().await;
        let Some(cart) = store.cart_for(user_id) else {
            return Ok(false);
        };
        store.carts.retain(|c| c.id != cart.id);
        store.lines.retain(|l| l.cart_id != cart.id);
        Ok(true)
    }
}

#[async_trait]
impl FeedbackRepository for MemoryRepository {
    async fn create(&self, feedback: NewFeedback) -> AppResult<Feedback> {
        let feedback = Feedback {
            id: Uuid::new_v4(),
            product_id: feedback.product_id,
            user_id: feedback.user_id,
            rating: feedback.rating,
            comment: feedback.comment,
            created_at: Utc::now(),
        };
        self.store.write().await.feedbacks.push(feedback.clone());
        Ok(feedback)
    }

    async fn list_for_product(&self, product_id: Uuid) -> AppResult<Vec<Feedback>> {
        let store = self.store.read().await;
        Ok(store
            .feedbacks
            .iter()
            .rev()
            .filter(|f| f.product_id == product_id)
            .cloned()
            .collect())
    }

    async fn average_rating(&self, product_id: Uuid) -> AppResult<Option<f64>> {
        let store = self.store.read().await;
        let ratings: Vec<f64> = store
            .feedbacks
            .iter()
            .filter(|f| f.product_id == product_id)
            .map(|f| f.rating)
            .collect();
        Ok(mean_rating(&ratings))
    }

    async fn latest_for_user(
        &self,
        user_id: Uuid,
        product_id: Uuid,
    ) -> AppResult<Option<Feedback>> {
        let store = self.store.read().await;
        Ok(store
            .feedbacks
            .iter()
            .rev()
            .find(|f| f.product_id == product_id && f.user_id == Some(user_id))
            .cloned())
    }
}
