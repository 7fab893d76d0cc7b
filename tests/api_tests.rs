mod common;

use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use common::*;
use nexora_backend::entities::UserRole;
use nexora_backend::handlers;
use nexora_backend::middlewares::{AuthMiddleware, RateLimiter};
use nexora_backend::services::*;
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};

fn services(db: DatabaseConnection) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(web::Data::new(AuthService::new(db.clone(), jwt())))
            .app_data(web::Data::new(UserService::new(db.clone())))
            .app_data(web::Data::new(CatalogService::new(db.clone())))
            .app_data(web::Data::new(WishlistService::new(db.clone())))
            .app_data(web::Data::new(CartService::new(db.clone())))
            .app_data(web::Data::new(CheckoutService::new(db.clone())))
            .app_data(web::Data::new(OrderService::new(db.clone())))
            .app_data(web::Data::new(PaymentService::new(
                db.clone(),
                "Razorpay".to_string(),
            )))
            .app_data(web::Data::new(CouponService::new(db)));
    }
}

macro_rules! init_app {
    ($db:expr) => {
        init_app!($db, RateLimiter::per_minute(100))
    };
    ($db:expr, $limiter:expr) => {
        test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(jwt()))
                .configure(services($db.clone()))
                .configure(handlers::api_config($limiter)),
        )
        .await
    };
}

/// 中间件拒绝时返回 Err，处理函数返回的错误是普通响应，两种情况统一取状态码
macro_rules! status_of {
    ($app:expr, $req:expr) => {
        match test::try_call_service(&$app, $req).await {
            Ok(resp) => resp.status(),
            Err(err) => err.as_response_error().status_code(),
        }
    };
}

fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}

#[actix_web::test]
async fn test_protected_routes_require_token() {
    let db = setup_db().await;
    let app = init_app!(db);

    let req = test::TestRequest::get().uri("/api/v1/cart").to_request();
    assert_eq!(status_of!(app, req), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/api/v1/orders")
        .insert_header(bearer("not-a-jwt"))
        .to_request();
    assert_eq!(status_of!(app, req), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/api/v1/catalog/wishlist")
        .to_request();
    assert_eq!(status_of!(app, req), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_catalog_reads_are_anonymous_but_writes_are_not() {
    let db = setup_db().await;
    let seller = create_user(&db, "seller", UserRole::Seller).await;
    let customer = create_user(&db, "alice", UserRole::Customer).await;
    create_product(&db, seller.id, "Speaker", 7_000, 4).await;
    let app = init_app!(db);

    let req = test::TestRequest::get()
        .uri("/api/v1/catalog/products?search=speak")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["data"][0]["name"], "Speaker");

    let new_product = json!({ "name": "Amp", "price": 9000, "stock": 2 });

    let req = test::TestRequest::post()
        .uri("/api/v1/catalog/products")
        .set_json(&new_product)
        .to_request();
    assert_eq!(status_of!(app, req), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/v1/catalog/products")
        .insert_header(bearer(&access_token(&customer)))
        .set_json(&new_product)
        .to_request();
    assert_eq!(status_of!(app, req), StatusCode::FORBIDDEN);

    let req = test::TestRequest::post()
        .uri("/api/v1/catalog/products")
        .insert_header(bearer(&access_token(&seller)))
        .set_json(&new_product)
        .to_request();
    assert_eq!(status_of!(app, req), StatusCode::CREATED);
}

#[actix_web::test]
async fn test_shopping_flow_over_http() {
    let db = setup_db().await;
    let seller = create_user(&db, "seller", UserRole::Seller).await;
    let alice = create_user(&db, "alice", UserRole::Customer).await;
    let bob = create_user(&db, "bob", UserRole::Customer).await;
    let product = create_product(&db, seller.id, "Blender", 2_500, 10).await;
    let app = init_app!(db);
    let alice_token = access_token(&alice);

    // 空购物车结算
    let req = test::TestRequest::post()
        .uri("/api/v1/checkout")
        .insert_header(bearer(&alice_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["message"], "Cart is empty");

    let req = test::TestRequest::post()
        .uri("/api/v1/cart")
        .insert_header(bearer(&alice_token))
        .set_json(json!({ "product_id": product.id, "quantity": 2 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["total_price"], 5_000);

    let req = test::TestRequest::post()
        .uri("/api/v1/checkout")
        .insert_header(bearer(&alice_token))
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Order placed successfully");
    let order_id = body["order_id"].as_i64().unwrap();

    // 他人订单返回 404
    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/orders/{order_id}"))
        .insert_header(bearer(&access_token(&bob)))
        .to_request();
    assert_eq!(status_of!(app, req), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri("/api/v1/payments")
        .insert_header(bearer(&alice_token))
        .set_json(json!({ "order_id": order_id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["success"], true);
    assert_eq!(body["data"]["method"], "Razorpay");

    let req = test::TestRequest::post()
        .uri("/api/v1/payments")
        .insert_header(bearer(&alice_token))
        .set_json(json!({ "order_id": order_id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["message"], "Order already paid or processed");

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/orders/{order_id}"))
        .insert_header(bearer(&alice_token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["status"], "PAID");
    assert_eq!(body["data"]["items"][0]["product_name"], "Blender");
}

#[actix_web::test]
async fn test_order_status_patch_is_admin_only() {
    let db = setup_db().await;
    let admin = create_user(&db, "admin", UserRole::Admin).await;
    let seller = create_user(&db, "seller", UserRole::Seller).await;
    let alice = create_user(&db, "alice", UserRole::Customer).await;
    let product = create_product(&db, seller.id, "Kettle", 1_800, 3).await;

    CartService::new(db.clone())
        .add_item(
            alice.id,
            nexora_backend::models::AddCartItemRequest {
                product_id: product.id,
                quantity: 1,
            },
        )
        .await
        .unwrap();
    let order_id = CheckoutService::new(db.clone())
        .checkout(alice.id, Default::default())
        .await
        .unwrap()
        .order_id;

    let app = init_app!(db);
    let uri = format!("/api/v1/orders/{order_id}");

    let req = test::TestRequest::patch()
        .uri(&uri)
        .insert_header(bearer(&access_token(&alice)))
        .set_json(json!({ "status": "SHIPPED" }))
        .to_request();
    assert_eq!(status_of!(app, req), StatusCode::FORBIDDEN);

    let req = test::TestRequest::patch()
        .uri(&uri)
        .insert_header(bearer(&access_token(&admin)))
        .set_json(json!({ "status": "SHIPPED" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["status"], "SHIPPED");

    let req = test::TestRequest::patch()
        .uri(&uri)
        .insert_header(bearer(&access_token(&admin)))
        .set_json(json!({ "status": "LOST" }))
        .to_request();
    assert_eq!(status_of!(app, req), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_register_login_and_refresh() {
    let db = setup_db().await;
    let app = init_app!(db);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(json!({
            "username": "root",
            "email": "root@nexora.test",
            "password": "Password123",
            "role": "ADMIN"
        }))
        .to_request();
    assert_eq!(status_of!(app, req), StatusCode::FORBIDDEN);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(json!({
            "username": "carol",
            "email": "carol@nexora.test",
            "password": "weak"
        }))
        .to_request();
    assert_eq!(status_of!(app, req), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(json!({
            "username": "carol",
            "email": "carol@nexora.test",
            "password": "Password123",
            "first_name": "Carol"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["user"]["role"], "CUSTOMER");

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({ "username": "carol", "password": "Wrong12345" }))
        .to_request();
    assert_eq!(status_of!(app, req), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({ "username": "carol", "password": "Password123" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let access = body["data"]["access_token"].as_str().unwrap().to_string();
    let refresh = body["data"]["refresh_token"].as_str().unwrap().to_string();

    // 访问令牌不能用于刷新
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .set_json(json!({ "refresh_token": access }))
        .to_request();
    assert_eq!(status_of!(app, req), StatusCode::UNAUTHORIZED);

    // 刷新令牌不能用于访问
    let req = test::TestRequest::get()
        .uri("/api/v1/auth/me")
        .insert_header(bearer(&refresh))
        .to_request();
    assert_eq!(status_of!(app, req), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .set_json(json!({ "refresh_token": refresh }))
        .to_request();
    assert_eq!(status_of!(app, req), StatusCode::OK);

    let req = test::TestRequest::put()
        .uri("/api/v1/auth/me")
        .insert_header(bearer(&access))
        .set_json(json!({ "address": "12 MG Road", "phone": "+91 98765 43210" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["address"], "12 MG Road");
    assert_eq!(body["data"]["username"], "carol");
    assert_eq!(body["data"]["first_name"], "Carol");
}

#[actix_web::test]
async fn test_register_is_rate_limited() {
    let db = setup_db().await;
    let app = init_app!(db, RateLimiter::per_minute(2));

    let register = || {
        test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(json!({ "username": "x", "email": "bad", "password": "weak" }))
            .to_request()
    };

    // 前两次进入处理函数（参数错误），第三次被限流
    assert_eq!(status_of!(app, register()), StatusCode::BAD_REQUEST);
    assert_eq!(status_of!(app, register()), StatusCode::BAD_REQUEST);
    assert_eq!(status_of!(app, register()), StatusCode::TOO_MANY_REQUESTS);

    // 登录不受注册限流影响
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({ "username": "nobody", "password": "Password123" }))
        .to_request();
    assert_eq!(status_of!(app, req), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_register_limit_ignores_spoofed_forwarded_for() {
    let db = setup_db().await;
    let app = init_app!(db, RateLimiter::per_minute(2));
    let peer: std::net::SocketAddr = "198.51.100.7:40000".parse().unwrap();

    let mut statuses = Vec::new();
    for i in 0..6 {
        let req = test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .peer_addr(peer)
            .insert_header(("x-forwarded-for", format!("10.0.0.{i}")))
            .set_json(json!({ "username": "x", "email": "bad", "password": "weak" }))
            .to_request();
        statuses.push(status_of!(app, req));
    }

    assert_eq!(&statuses[..2], &[StatusCode::BAD_REQUEST, StatusCode::BAD_REQUEST]);
    assert!(statuses[2..].iter().all(|s| *s == StatusCode::TOO_MANY_REQUESTS));
}

#[actix_web::test]
async fn test_coupons_are_admin_only() {
    let db = setup_db().await;
    let admin = create_user(&db, "admin", UserRole::Admin).await;
    let seller = create_user(&db, "seller", UserRole::Seller).await;
    let app = init_app!(db);

    let req = test::TestRequest::get()
        .uri("/api/v1/coupons")
        .insert_header(bearer(&access_token(&seller)))
        .to_request();
    assert_eq!(status_of!(app, req), StatusCode::FORBIDDEN);

    let req = test::TestRequest::post()
        .uri("/api/v1/coupons")
        .insert_header(bearer(&access_token(&admin)))
        .set_json(json!({
            "discount_percent": 25,
            "valid_from": "2026-01-01T00:00:00Z",
            "valid_to": "2030-01-01T00:00:00Z"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["code"].as_str().unwrap().len(), 8);
    assert_eq!(body["data"]["active"], true);
}
