pub mod cart;
pub mod catalog;
pub mod common;
pub mod coupon;
pub mod order;
pub mod pagination;
pub mod payment;
pub mod user;
pub mod wishlist;

pub use cart::*;
pub use catalog::*;
pub use common::*;
pub use coupon::*;
pub use order::*;
pub use pagination::*;
pub use payment::*;
pub use user::*;
pub use wishlist::*;

pub use crate::entities::{OrderStatus, UserRole};
