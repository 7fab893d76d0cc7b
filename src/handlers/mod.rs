pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod coupon;
pub mod order;
pub mod payment;
pub mod user;
pub mod wishlist;

pub use auth::auth_config;
pub use cart::cart_config;
pub use catalog::catalog_config;
pub use checkout::checkout_config;
pub use coupon::coupon_config;
pub use order::order_config;
pub use payment::payment_config;

use crate::error::AppError;
use crate::middlewares::RateLimiter;
use actix_web::web;

/// 请求体或查询参数解析失败时返回统一的错误结构
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into())
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into())
}

/// 挂载 /api/v1 下的全部业务路由
pub fn api_config(limiter: RateLimiter) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        cfg.service(
            web::scope("/api/v1")
                .app_data(json_config())
                .app_data(query_config())
                .configure(|cfg| auth_config(cfg, limiter))
                .configure(catalog_config)
                .configure(cart_config)
                .configure(checkout_config)
                .configure(order_config)
                .configure(payment_config)
                .configure(coupon_config),
        );
    }
}
