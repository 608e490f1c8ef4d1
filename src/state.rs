use std::sync::Arc;

use crate::{
    db::OrmConn,
    repository::{
        CartRepository, FeedbackRepository, ProductRepository, UserRepository,
        memory::MemoryRepository, postgres::PostgresRepository,
    },
    services::auth_service::AuthGateway,
};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub carts: Arc<dyn CartRepository>,
    pub feedbacks: Arc<dyn FeedbackRepository>,
    pub auth: Arc<AuthGateway>,
}

impl AppState {
    pub fn postgres(orm: OrmConn, auth: AuthGateway) -> Self {
        Self::from_backend(Arc::new(PostgresRepository::new(orm)), auth)
    }

    pub fn in_memory(auth: AuthGateway) -> Self {
        Self::from_backend(Arc::new(MemoryRepository::new()), auth)
    }

    fn from_backend<R>(repo: Arc<R>, auth: AuthGateway) -> Self
    where
        R: UserRepository + ProductRepository + CartRepository + FeedbackRepository + 'static,
    {
        Self {
            users: repo.clone(),
            products: repo.clone(),
            carts: repo.clone(),
            feedbacks: repo,
            auth: Arc::new(auth),
        }
    }
}
