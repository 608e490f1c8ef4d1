pub mod cart_items;
pub mod carts;
pub mod feedbacks;
pub mod products;
pub mod users;

pub use cart_items::Entity as CartItems;
pub use carts::Entity as Carts;
pub use feedbacks::Entity as Feedbacks;
pub use products::Entity as Products;
pub use users::Entity as Users;
