use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter

use nexora_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    handlers,
    middlewares::{AuthMiddleware, RateLimiter, create_cors},
    services::*,
    swagger::swagger_config,
    utils::JwtService,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // 加载配置
    let config = Config::from_toml().expect("Failed to load configuration");

    env_logger::Builder::from_env(Env::default().default_filter_or(config.log.level.as_str()))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    // 创建数据库连接池
    let pool = create_pool(&config.database)
        .await
        .expect("Failed to create database connection pool");

    // 运行数据库迁移
    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    let jwt_service = JwtService::new(
        &config.jwt.secret,
        config.jwt.access_token_expires_in,
        config.jwt.refresh_token_expires_in,
    );

    // 创建服务
    let auth_service = AuthService::new(pool.clone(), jwt_service.clone());
    let user_service = UserService::new(pool.clone());
    let catalog_service = CatalogService::new(pool.clone());
    let wishlist_service = WishlistService::new(pool.clone());
    let cart_service = CartService::new(pool.clone());
    let checkout_service = CheckoutService::new(pool.clone());
    let order_service = OrderService::new(pool.clone());
    let payment_service = PaymentService::new(pool.clone(), config.payment.default_method.clone());
    let coupon_service = CouponService::new(pool.clone());

    // 确保管理员账号存在
    if let Some(admin) = &config.admin {
        auth_service
            .ensure_admin(admin)
            .await
            .expect("Failed to bootstrap admin account");
    }

    // 注册限流在所有 worker 间共享
    let register_limiter = RateLimiter::per_minute(config.rate_limit.register_per_minute)
        .trust_proxy(config.rate_limit.trust_proxy);

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(AuthMiddleware::new(jwt_service.clone()))
            .wrap(create_cors())
            .wrap(Logger::default())
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(user_service.clone()))
            .app_data(web::Data::new(catalog_service.clone()))
            .app_data(web::Data::new(wishlist_service.clone()))
            .app_data(web::Data::new(cart_service.clone()))
            .app_data(web::Data::new(checkout_service.clone()))
            .app_data(web::Data::new(order_service.clone()))
            .app_data(web::Data::new(payment_service.clone()))
            .app_data(web::Data::new(coupon_service.clone()))
            .configure(swagger_config)
            .configure(handlers::api_config(register_limiter.clone()))
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
