pub mod auth;
pub mod cart;
pub mod feedback;
pub mod products;
