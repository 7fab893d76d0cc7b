use crate::models::*;
use crate::services::WishlistService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/catalog/wishlist",
    tag = "wishlist",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "心愿单", body = [WishlistItemResponse]),
        (status = 401, description = "未授权")
    )
)]
pub async fn list_wishlist(
    wishlist: web::Data<WishlistService>,
    user: AuthUser,
) -> Result<HttpResponse> {
    match wishlist.list(user.id).await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": list }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/catalog/wishlist",
    tag = "wishlist",
    request_body = AddWishlistRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "已加入心愿单", body = WishlistItemResponse),
        (status = 400, description = "商品已在心愿单中"),
        (status = 404, description = "商品不存在")
    )
)]
pub async fn add_to_wishlist(
    wishlist: web::Data<WishlistService>,
    user: AuthUser,
    request: web::Json<AddWishlistRequest>,
) -> Result<HttpResponse> {
    match wishlist.add(user.id, request.into_inner()).await {
        Ok(item) => Ok(HttpResponse::Created().json(json!({ "success": true, "data": item }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/catalog/wishlist/{id}",
    tag = "wishlist",
    params(("id" = i32, Path, description = "心愿单条目ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "已移除"),
        (status = 404, description = "条目不存在")
    )
)]
pub async fn remove_from_wishlist(
    wishlist: web::Data<WishlistService>,
    user: AuthUser,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    match wishlist.remove(user.id, path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Removed from wishlist"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn wishlist_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/wishlist")
            .route("", web::get().to(list_wishlist))
            .route("", web::post().to(add_to_wishlist))
            .route("/{id}", web::delete().to(remove_from_wishlist)),
    );
}
