use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbBackend, DbErr, EntityTrait,
    FromQueryResult, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, Statement,
    TransactionTrait, Value, ActiveValue::NotSet, sea_query::OnConflict,
};
use uuid::Uuid;

use crate::{
    db::OrmConn,
    entity::{
        CartItems, Carts, Feedbacks, Products, Users, cart_items, carts, feedbacks, products,
        users,
    },
    error::{AppError, AppResult},
    models::{
        CartItem, CartLine, CartRef, Feedback, NewFeedback, NewProduct, Product, Removal, User,
    },
    repository::{CartRepository, FeedbackRepository, ProductRepository, UserRepository},
    services::cart_service::{merge_quantity, quantity_after_removal},
};

/// SeaORM-backed implementation of every repository port.
#[derive(Clone)]
pub struct PostgresRepository {
    orm: OrmConn,
}

impl PostgresRepository {
    pub fn new(orm: OrmConn) -> Self {
        Self { orm }
    }
}

#[async_trait]
impl UserRepository for PostgresRepository {
    async fn create(&self, email: &str, password_hash: &str) -> AppResult<User> {
        let active = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email.to_string()),
            password_hash: Set(password_hash.to_string()),
            created_at: NotSet,
        };
        match active.insert(&self.orm).await {
            Ok(model) => Ok(user_from_entity(model)),
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Err(AppError::BadRequest("Email is already taken".into()))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = Users::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.orm)
            .await?;
        Ok(user.map(user_from_entity))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let user = Users::find_by_id(id).one(&self.orm).await?;
        Ok(user.map(user_from_entity))
    }
}

#[async_trait]
impl ProductRepository for PostgresRepository {
    async fn create(&self, product: NewProduct) -> AppResult<Product> {
        let active = products::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(product.title),
            description: Set(product.description),
            price: Set(product.price),
            image: Set(product.image),
            category: Set(product.category),
            created_at: NotSet,
        };
        let model = active.insert(&self.orm).await?;
        Ok(product_from_entity(model))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Product>> {
        let product = Products::find_by_id(id).one(&self.orm).await?;
        Ok(product.map(product_from_entity))
    }

    async fn list(&self) -> AppResult<Vec<Product>> {
        let items = Products::find()
            .order_by_desc(products::Column::CreatedAt)
            .all(&self.orm)
            .await?
            .into_iter()
            .map(product_from_entity)
            .collect();
        Ok(items)
    }
}

/// `INSERT .. ON CONFLICT (user_id) DO UPDATE .. RETURNING *`.
///
/// The no-op update makes Postgres return the existing row and hold its lock
/// until the surrounding transaction ends.
async fn upsert_cart<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> Result<carts::Model, DbErr> {
    let active = carts::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        created_at: NotSet,
    };
    Carts::insert(active)
        .on_conflict(
            OnConflict::column(carts::Column::UserId)
                .update_column(carts::Column::UserId)
                .to_owned(),
        )
        .exec_with_returning(conn)
        .await
}

#[async_trait]
impl CartRepository for PostgresRepository {
    async fn find_or_create(&self, user_id: Uuid) -> AppResult<CartRef> {
        let existing = Carts::find()
            .filter(carts::Column::UserId.eq(user_id))
            .one(&self.orm)
            .await?;
        let cart = match existing {
            Some(cart) => cart,
            None => upsert_cart(&self.orm, user_id).await?,
        };
        Ok(CartRef {
            id: cart.id,
            user_id: cart.user_id,
        })
    }

    async fn add_item(
        &self,
        user_id: Uuid,
        product: &Product,
        quantity: i32,
    ) -> AppResult<CartLine> {
        let txn = self.orm.begin().await?;
        let cart = upsert_cart(&txn, user_id).await?;

        let existing = CartItems::find()
            .filter(cart_items::Column::CartId.eq(cart.id))
            .filter(cart_items::Column::ProductId.eq(product.id))
            .one(&txn)
            .await?;

        let line = match existing {
            Some(item) => {
                let merged = merge_quantity(Some(item.quantity), quantity)?;
                let mut active: cart_items::ActiveModel = item.into();
                active.quantity = Set(merged);
                active.update(&txn).await?
            }
            None => {
                cart_items::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    cart_id: Set(cart.id),
                    product_id: Set(product.id),
                    quantity: Set(merge_quantity(None, quantity)?),
                    price: Set(product.price),
                    created_at: NotSet,
                }
                .insert(&txn)
                .await?
            }
        };

        txn.commit().await?;
        Ok(line_from_entity(line))
    }

    async fn items(&self, cart_id: Uuid) -> AppResult<Vec<CartItem>> {
        let rows = CartItems::find()
            .filter(cart_items::Column::CartId.eq(cart_id))
            .order_by_asc(cart_items::Column::CreatedAt)
            .find_also_related(Products)
            .all(&self.orm)
            .await?;

        let items = rows
            .into_iter()
            .filter_map(|(item, product)| {
                product.map(|product| CartItem {
                    id: item.id,
                    product_id: item.product_id,
                    product: product_from_entity(product),
                    quantity: item.quantity,
                    price: item.price,
                })
            })
            .collect();
        Ok(items)
    }

    async fn remove_unit(&self, user_id: Uuid, product_id: Uuid) -> AppResult<Option<Removal>> {
        let txn = self.orm.begin().await?;

        let cart = Carts::find()
            .filter(carts::Column::UserId.eq(user_id))
            .lock_exclusive()
            .one(&txn)
            .await?;
        let Some(cart) = cart else {
            return Ok(None);
        };

        let item = CartItems::find()
            .filter(cart_items::Column::CartId.eq(cart.id))
            .filter(cart_items::Column::ProductId.eq(product_id))
            .one(&txn)
            .await?;
        let Some(item) = item else {
            return Ok(None);
        };

        let removal = match quantity_after_removal(item.quantity) {
            None => {
                CartItems::delete_by_id(item.id).exec(&txn).await?;
                Removal::Deleted
            }
            Some(quantity) => {
                let mut active: cart_items::ActiveModel = item.into();
                active.quantity = Set(quantity);
                active.update(&txn).await?;
                Removal::Decremented { quantity }
            }
        };

        txn.commit().await?;
        Ok(Some(removal))
    }

    async fn delete_for_user(&self, user_id: Uuid) -> AppResult<bool> {
        let result = Carts::delete_many()
            .filter(carts::Column::UserId.eq(user_id))
            .exec(&self.orm)
            .await?;
        Ok(result.rows_affected > 0)
    }
}

#[derive(Debug, FromQueryResult)]
struct RatingRow {
    rating: Option<f64>,
}

#[async_trait]
impl FeedbackRepository for PostgresRepository {
    async fn create(&self, feedback: NewFeedback) -> AppResult<Feedback> {
        let active = feedbacks::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(feedback.product_id),
            user_id: Set(feedback.user_id),
            rating: Set(feedback.rating),
            comment: Set(feedback.comment),
            created_at: NotSet,
        };
        let model = active.insert(&self.orm).await?;
        Ok(feedback_from_entity(model))
    }

    async fn list_for_product(&self, product_id: Uuid) -> AppResult<Vec<Feedback>> {
        let items = Feedbacks::find()
            .filter(feedbacks::Column::ProductId.eq(product_id))
            .order_by_desc(feedbacks::Column::CreatedAt)
            .all(&self.orm)
            .await?
            .into_iter()
            .map(feedback_from_entity)
            .collect();
        Ok(items)
    }

    async fn average_rating(&self, product_id: Uuid) -> AppResult<Option<f64>> {
        let row = RatingRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT AVG(rating)::float8 AS rating FROM feedbacks WHERE product_id = $1",
            [Value::from(product_id)],
        ))
        .one(&self.orm)
        .await?;
        Ok(row.and_then(|row| row.rating))
    }

    async fn latest_for_user(
        &self,
        user_id: Uuid,
        product_id: Uuid,
    ) -> AppResult<Option<Feedback>> {
        let feedback = Feedbacks::find()
            .filter(feedbacks::Column::UserId.eq(user_id))
            .filter(feedbacks::Column::ProductId.eq(product_id))
            .order_by_desc(feedbacks::Column::CreatedAt)
            .one(&self.orm)
            .await?;
        Ok(feedback.map(feedback_from_entity))
    }
}

fn user_from_entity(model: users::Model) -> User {
    User {
        id: model.id,
        email: model.email,
        password_hash: model.password_hash,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn product_from_entity(model: products::Model) -> Product {
    Product {
        id: model.id,
        title: model.title,
        description: model.description,
        price: model.price,
        image: model.image,
        category: model.category,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn line_from_entity(model: cart_items::Model) -> CartLine {
    CartLine {
        id: model.id,
        cart_id: model.cart_id,
        product_id: model.product_id,
        quantity: model.quantity,
        price: model.price,
    }
}

fn feedback_from_entity(model: feedbacks::Model) -> Feedback {
    Feedback {
        id: model.id,
        product_id: model.product_id,
        user_id: model.user_id,
        rating: model.rating,
        comment: model.comment,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
