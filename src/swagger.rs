use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::refresh,
        handlers::user::get_me,
        handlers::user::update_me,
        handlers::catalog::list_categories,
        handlers::catalog::get_category,
        handlers::catalog::create_category,
        handlers::catalog::update_category,
        handlers::catalog::delete_category,
        handlers::catalog::list_brands,
        handlers::catalog::get_brand,
        handlers::catalog::create_brand,
        handlers::catalog::update_brand,
        handlers::catalog::delete_brand,
        handlers::catalog::list_products,
        handlers::catalog::get_product,
        handlers::catalog::create_product,
        handlers::catalog::update_product,
        handlers::catalog::delete_product,
        handlers::wishlist::list_wishlist,
        handlers::wishlist::add_to_wishlist,
        handlers::wishlist::remove_from_wishlist,
        handlers::cart::get_cart,
        handlers::cart::add_item,
        handlers::cart::update_item,
        handlers::cart::remove_item,
        handlers::checkout::checkout,
        handlers::order::get_orders,
        handlers::order::get_order,
        handlers::order::update_order_status,
        handlers::payment::create_payment,
        handlers::coupon::list_coupons,
        handlers::coupon::get_coupon,
        handlers::coupon::create_coupon,
        handlers::coupon::update_coupon,
        handlers::coupon::delete_coupon,
    ),
    components(
        schemas(
            UserRole,
            OrderStatus,
            RegisterRequest,
            LoginRequest,
            RefreshTokenRequest,
            UpdateProfileRequest,
            UserResponse,
            AuthResponse,
            CategoryRequest,
            CategoryResponse,
            BrandRequest,
            BrandResponse,
            ProductQuery,
            CreateProductRequest,
            UpdateProductRequest,
            ProductResponse,
            AddWishlistRequest,
            WishlistItemResponse,
            AddCartItemRequest,
            UpdateCartItemRequest,
            CartItemResponse,
            CartResponse,
            CheckoutRequest,
            CheckoutResponse,
            OrderQuery,
            UpdateOrderStatusRequest,
            OrderItemResponse,
            OrderResponse,
            CreatePaymentRequest,
            PaymentResponse,
            CreateCouponRequest,
            UpdateCouponRequest,
            CouponResponse,
            ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration, login and profile API"),
        (name = "catalog", description = "Categories, brands and products API"),
        (name = "wishlist", description = "Wishlist API"),
        (name = "cart", description = "Shopping cart API"),
        (name = "order", description = "Checkout and order API"),
        (name = "payment", description = "Payment API"),
        (name = "coupon", description = "Coupon administration API"),
    ),
    info(
        title = "Nexora API",
        version = "1.0.0",
        description = "Nexora e-commerce REST API documentation"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
