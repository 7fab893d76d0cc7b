#![allow(dead_code)]

use chrono::Utc;
use migration::{Migrator, MigratorTrait};
use nexora_backend::entities::{
    UserRole, coupon_entity as coupons, product_entity as products, user_entity as users,
};
use nexora_backend::models::AuthUser;
use nexora_backend::utils::JwtService;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};

pub const JWT_SECRET: &str = "test-secret";

/// 内存 SQLite，单连接保证所有查询落在同一个库上
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("connect in-memory sqlite");
    Migrator::up(&db, None).await.expect("run migrations");
    db
}

pub fn jwt() -> JwtService {
    JwtService::new(JWT_SECRET, 3600, 86400)
}

pub async fn create_user(db: &DatabaseConnection, username: &str, role: UserRole) -> AuthUser {
    let now = Utc::now();
    let user = users::ActiveModel {
        username: Set(username.to_string()),
        email: Set(format!("{username}@nexora.test")),
        password_hash: Set("not-a-real-hash".to_string()),
        first_name: Set(String::new()),
        last_name: Set(String::new()),
        phone: Set(String::new()),
        address: Set(String::new()),
        role: Set(role),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert user");

    AuthUser {
        id: user.id,
        role: user.role,
    }
}

pub fn access_token(user: &AuthUser) -> String {
    jwt()
        .generate_access_token(user.id, user.role)
        .expect("generate token")
}

pub async fn create_product(
    db: &DatabaseConnection,
    seller_id: i32,
    name: &str,
    price: i64,
    stock: i32,
) -> products::Model {
    let now = Utc::now();
    products::ActiveModel {
        name: Set(name.to_string()),
        description: Set(format!("{name} description")),
        price: Set(price),
        stock: Set(stock),
        category_id: Set(None),
        brand_id: Set(None),
        seller_id: Set(seller_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert product")
}

pub async fn create_coupon(
    db: &DatabaseConnection,
    code: &str,
    percent: i32,
    active: bool,
    valid_days: i64,
) -> coupons::Model {
    let now = Utc::now();
    coupons::ActiveModel {
        code: Set(code.to_string()),
        discount_percent: Set(percent),
        active: Set(active),
        valid_from: Set(now - chrono::Duration::days(1)),
        valid_to: Set(now + chrono::Duration::days(valid_days)),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert coupon")
}
