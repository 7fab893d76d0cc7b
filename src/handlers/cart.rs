use crate::models::*;
use crate::services::CartService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/cart",
    tag = "cart",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "购物车", body = CartResponse),
        (status = 401, description = "未授权")
    )
)]
pub async fn get_cart(cart: web::Data<CartService>, user: AuthUser) -> Result<HttpResponse> {
    match cart.get_cart(user.id).await {
        Ok(c) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": c }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/cart",
    tag = "cart",
    request_body = AddCartItemRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "已加入购物车", body = CartResponse),
        (status = 400, description = "数量无效"),
        (status = 404, description = "商品不存在")
    )
)]
pub async fn add_item(
    cart: web::Data<CartService>,
    user: AuthUser,
    request: web::Json<AddCartItemRequest>,
) -> Result<HttpResponse> {
    match cart.add_item(user.id, request.into_inner()).await {
        Ok(c) => Ok(HttpResponse::Created().json(json!({ "success": true, "data": c }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/cart/{item_id}",
    tag = "cart",
    params(("item_id" = i32, Path, description = "购物车条目ID")),
    request_body = UpdateCartItemRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "已更新数量", body = CartResponse),
        (status = 404, description = "Item not found")
    )
)]
pub async fn update_item(
    cart: web::Data<CartService>,
    user: AuthUser,
    path: web::Path<i32>,
    request: web::Json<UpdateCartItemRequest>,
) -> Result<HttpResponse> {
    match cart
        .update_item(user.id, path.into_inner(), request.into_inner())
        .await
    {
        Ok(c) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": c }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/cart/{item_id}",
    tag = "cart",
    params(("item_id" = i32, Path, description = "购物车条目ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "已移除", body = CartResponse),
        (status = 404, description = "Item not found")
    )
)]
pub async fn remove_item(
    cart: web::Data<CartService>,
    user: AuthUser,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    match cart.remove_item(user.id, path.into_inner()).await {
        Ok(c) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": c }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn cart_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/cart")
            .route("", web::get().to(get_cart))
            .route("", web::post().to(add_item))
            .route("/{item_id}", web::put().to(update_item))
            .route("/{item_id}", web::delete().to(remove_item)),
    );
}
