pub mod brands;
pub mod cart_items;
pub mod carts;
pub mod categories;
pub mod coupons;
pub mod order_items;
pub mod orders;
pub mod payments;
pub mod products;
pub mod users;
pub mod wishlists;

pub use brands as brand_entity;
pub use cart_items as cart_item_entity;
pub use carts as cart_entity;
pub use categories as category_entity;
pub use coupons as coupon_entity;
pub use order_items as order_item_entity;
pub use orders as order_entity;
pub use payments as payment_entity;
pub use products as product_entity;
pub use users as user_entity;
pub use wishlists as wishlist_entity;

pub use orders::OrderStatus;
pub use users::UserRole;
