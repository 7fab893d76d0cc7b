mod common;

use chrono::{Duration, Utc};
use common::*;
use nexora_backend::entities::{UserRole, category_entity as categories, order_entity as orders};
use nexora_backend::error::AppError;
use nexora_backend::models::*;
use nexora_backend::services::{
    CartService, CatalogService, CheckoutService, CouponService, WishlistService,
};
use nexora_backend::utils::{MAX_PRICE, MAX_QUANTITY};
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, Set};

fn new_product(name: &str, price: i64) -> CreateProductRequest {
    CreateProductRequest {
        name: name.to_string(),
        description: format!("{name} for everyday use"),
        price,
        stock: 10,
        category_id: None,
        brand_id: None,
    }
}

#[tokio::test]
async fn test_adding_same_product_merges_quantity() {
    let db = setup_db().await;
    let seller = create_user(&db, "seller", UserRole::Seller).await;
    let alice = create_user(&db, "alice", UserRole::Customer).await;
    let product = create_product(&db, seller.id, "Keyboard", 4_500, 20).await;
    let cart = CartService::new(db.clone());

    for quantity in [2, 3] {
        cart.add_item(
            alice.id,
            AddCartItemRequest {
                product_id: product.id,
                quantity,
            },
        )
        .await
        .unwrap();
    }

    let view = cart.get_cart(alice.id).await.unwrap();
    assert_eq!(view.items.len(), 1);
    assert_eq!(view.items[0].quantity, 5);
    assert_eq!(view.items[0].subtotal, 22_500);
    assert_eq!(view.total_price, 22_500);
}

#[tokio::test]
async fn test_cart_item_update_and_remove() {
    let db = setup_db().await;
    let seller = create_user(&db, "seller", UserRole::Seller).await;
    let alice = create_user(&db, "alice", UserRole::Customer).await;
    let bob = create_user(&db, "bob", UserRole::Customer).await;
    let product = create_product(&db, seller.id, "Monitor", 12_000, 5).await;
    let cart = CartService::new(db.clone());

    let view = cart
        .add_item(
            alice.id,
            AddCartItemRequest {
                product_id: product.id,
                quantity: 1,
            },
        )
        .await
        .unwrap();
    let item_id = view.items[0].id;

    let view = cart
        .update_item(alice.id, item_id, UpdateCartItemRequest { quantity: 4 })
        .await
        .unwrap();
    assert_eq!(view.total_price, 48_000);

    let err = cart
        .update_item(alice.id, item_id, UpdateCartItemRequest { quantity: 0 })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    // 其他用户无法操作该条目
    let err = cart.remove_item(bob.id, item_id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(ref m) if m == "Item not found"));

    let view = cart.remove_item(alice.id, item_id).await.unwrap();
    assert!(view.items.is_empty());

    let err = cart.remove_item(alice.id, item_id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_price_and_quantity_limits() {
    let db = setup_db().await;
    let seller = create_user(&db, "seller", UserRole::Seller).await;
    let alice = create_user(&db, "alice", UserRole::Customer).await;

    let err = CatalogService::new(db.clone())
        .create_product(&seller, new_product("Yacht", MAX_PRICE + 1))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    let product = create_product(&db, seller.id, "Cable", 300, 100).await;
    let cart = CartService::new(db.clone());
    let add = |quantity| AddCartItemRequest {
        product_id: product.id,
        quantity,
    };

    let err = cart.add_item(alice.id, add(MAX_QUANTITY + 1)).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    cart.add_item(alice.id, add(MAX_QUANTITY)).await.unwrap();
    // 累加后超过上限被拒绝，原数量不变
    let err = cart.add_item(alice.id, add(1)).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
    let view = cart.get_cart(alice.id).await.unwrap();
    assert_eq!(view.items[0].quantity, MAX_QUANTITY);
}

#[tokio::test]
async fn test_overflowing_totals_are_rejected() {
    let db = setup_db().await;
    let seller = create_user(&db, "seller", UserRole::Seller).await;
    let alice = create_user(&db, "alice", UserRole::Customer).await;
    // 直接写库，绕过单价上限
    let product = create_product(&db, seller.id, "Legacy", i64::MAX / 2 + 1, 10).await;
    let cart = CartService::new(db.clone());

    let err = cart
        .add_item(
            alice.id,
            AddCartItemRequest {
                product_id: product.id,
                quantity: 2,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(ref m) if m == "Amount is too large"));

    let err = CheckoutService::new(db.clone())
        .checkout(alice.id, CheckoutRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
    assert_eq!(orders::Entity::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_unique_violation_maps_to_validation_error() {
    let db = setup_db().await;
    let insert = || {
        categories::ActiveModel {
            name: Set("Phones".to_string()),
            description: Set(String::new()),
            ..Default::default()
        }
        .insert(&db)
    };
    insert().await.unwrap();

    // 并发下跳过了重名检查，数据库唯一索引兜底
    let err = insert().await.unwrap_err();
    let err = AppError::unique_violation(err, "Category with this name already exists");
    assert!(
        matches!(err, AppError::ValidationError(ref m) if m == "Category with this name already exists")
    );
}

#[tokio::test]
async fn test_add_unknown_product_to_cart() {
    let db = setup_db().await;
    let alice = create_user(&db, "alice", UserRole::Customer).await;
    let err = CartService::new(db.clone())
        .add_item(
            alice.id,
            AddCartItemRequest {
                product_id: 999,
                quantity: 1,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_catalog_write_permissions() {
    let db = setup_db().await;
    let admin = create_user(&db, "admin", UserRole::Admin).await;
    let seller = create_user(&db, "seller", UserRole::Seller).await;
    let rival = create_user(&db, "rival", UserRole::Seller).await;
    let customer = create_user(&db, "alice", UserRole::Customer).await;
    let catalog = CatalogService::new(db.clone());

    let err = catalog
        .create_product(&customer, new_product("Tablet", 30_000))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::PermissionDenied));

    let err = catalog
        .create_category(
            &customer,
            CategoryRequest {
                name: "Toys".to_string(),
                description: String::new(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::PermissionDenied));

    let product = catalog
        .create_product(&seller, new_product("Tablet", 30_000))
        .await
        .unwrap();
    assert_eq!(product.seller_id, seller.id);

    let err = catalog
        .update_product(
            &rival,
            product.id,
            UpdateProductRequest {
                price: Some(1),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::PermissionDenied));

    let err = catalog.delete_product(&rival, product.id).await.unwrap_err();
    assert!(matches!(err, AppError::PermissionDenied));

    let updated = catalog
        .update_product(
            &seller,
            product.id,
            UpdateProductRequest {
                price: Some(28_000),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.price, 28_000);

    // 管理员可删除任意商品
    catalog.delete_product(&admin, product.id).await.unwrap();
    assert!(matches!(
        catalog.get_product(product.id).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_category_and_brand_names_are_unique() {
    let db = setup_db().await;
    let admin = create_user(&db, "admin", UserRole::Admin).await;
    let catalog = CatalogService::new(db.clone());

    let category = catalog
        .create_category(
            &admin,
            CategoryRequest {
                name: "Electronics".to_string(),
                description: "All gadgets".to_string(),
            },
        )
        .await
        .unwrap();
    let err = catalog
        .create_category(
            &admin,
            CategoryRequest {
                name: "Electronics".to_string(),
                description: String::new(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    let brand = catalog
        .create_brand(
            &admin,
            BrandRequest {
                name: "Samsung".to_string(),
                description: "Smart Devices".to_string(),
            },
        )
        .await
        .unwrap();

    let product = catalog
        .create_product(
            &admin,
            CreateProductRequest {
                category_id: Some(category.id),
                brand_id: Some(brand.id),
                ..new_product("Galaxy", 65_000)
            },
        )
        .await
        .unwrap();
    assert_eq!(product.category.as_ref().unwrap().name, "Electronics");
    assert_eq!(product.brand.as_ref().unwrap().name, "Samsung");

    let err = catalog
        .create_product(
            &admin,
            CreateProductRequest {
                category_id: Some(999),
                ..new_product("Ghost", 1)
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
}

#[tokio::test]
async fn test_product_search_ordering_and_pagination() {
    let db = setup_db().await;
    let seller = create_user(&db, "seller", UserRole::Seller).await;
    let catalog = CatalogService::new(db.clone());

    for (name, price) in [
        ("Red Phone", 300),
        ("Blue Phone", 100),
        ("Green Lamp", 200),
        ("phone charger", 50),
    ] {
        catalog
            .create_product(&seller, new_product(name, price))
            .await
            .unwrap();
    }

    let page = catalog
        .list_products(&ProductQuery {
            search: Some("PHONE".to_string()),
            ordering: Some("price".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.total, 3);
    let prices: Vec<i64> = page.data.iter().map(|p| p.price).collect();
    assert_eq!(prices, vec![50, 100, 300]);

    let page = catalog
        .list_products(&ProductQuery {
            ordering: Some("-price".to_string()),
            page: Some(2),
            per_page: Some(3),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.total, 4);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].price, 50);

    let err = catalog
        .list_products(&ProductQuery {
            ordering: Some("name".to_string()),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
}

#[tokio::test]
async fn test_wishlist_rejects_duplicates() {
    let db = setup_db().await;
    let seller = create_user(&db, "seller", UserRole::Seller).await;
    let alice = create_user(&db, "alice", UserRole::Customer).await;
    let bob = create_user(&db, "bob", UserRole::Customer).await;
    let product = create_product(&db, seller.id, "Camera", 55_000, 3).await;
    let wishlist = WishlistService::new(db.clone());

    let entry = wishlist
        .add(alice.id, AddWishlistRequest { product_id: product.id })
        .await
        .unwrap();
    assert_eq!(entry.product.id, product.id);

    let err = wishlist
        .add(alice.id, AddWishlistRequest { product_id: product.id })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    assert_eq!(wishlist.list(alice.id).await.unwrap().len(), 1);
    assert!(wishlist.list(bob.id).await.unwrap().is_empty());

    let err = wishlist.remove(bob.id, entry.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    wishlist.remove(alice.id, entry.id).await.unwrap();
    assert!(wishlist.list(alice.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_coupon_generation_and_validation() {
    let db = setup_db().await;
    let coupons = CouponService::new(db.clone());
    let now = Utc::now();

    let generated = coupons
        .create(CreateCouponRequest {
            code: None,
            discount_percent: 15,
            active: true,
            valid_from: now,
            valid_to: now + Duration::days(30),
        })
        .await
        .unwrap();
    assert_eq!(generated.code.len(), 8);
    assert!(generated.code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));

    let named = coupons
        .create(CreateCouponRequest {
            code: Some("welcome5".to_string()),
            discount_percent: 5,
            active: true,
            valid_from: now,
            valid_to: now + Duration::days(1),
        })
        .await
        .unwrap();
    assert_eq!(named.code, "WELCOME5");

    let err = coupons
        .create(CreateCouponRequest {
            code: Some("WELCOME5".to_string()),
            discount_percent: 5,
            active: true,
            valid_from: now,
            valid_to: now + Duration::days(1),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    let err = coupons
        .create(CreateCouponRequest {
            code: None,
            discount_percent: 0,
            active: true,
            valid_from: now,
            valid_to: now + Duration::days(1),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    let updated = coupons
        .update(
            named.id,
            UpdateCouponRequest {
                active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(!updated.active);

    coupons.delete(named.id).await.unwrap();
    assert!(matches!(
        coupons.get(named.id).await,
        Err(AppError::NotFound(_))
    ));
    assert_eq!(coupons.list().await.unwrap().len(), 1);
}
