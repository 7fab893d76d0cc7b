pub mod auth_service;
pub mod cart_service;
pub mod catalog_service;
pub mod checkout_service;
pub mod coupon_service;
pub mod order_service;
pub mod payment_service;
pub mod user_service;
pub mod wishlist_service;

pub use auth_service::*;
pub use cart_service::*;
pub use catalog_service::*;
pub use checkout_service::*;
pub use coupon_service::*;
pub use order_service::*;
pub use payment_service::*;
pub use user_service::*;
pub use wishlist_service::*;
