use crate::error::AppError;
use crate::models::*;
use crate::services::CouponService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

fn require_admin(user: &AuthUser) -> std::result::Result<(), AppError> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(AppError::PermissionDenied)
    }
}

#[utoipa::path(
    get,
    path = "/coupons",
    tag = "coupon",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "优惠券列表", body = [CouponResponse]),
        (status = 403, description = "仅管理员可操作")
    )
)]
pub async fn list_coupons(
    coupon_service: web::Data<CouponService>,
    user: AuthUser,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&user) {
        return Ok(e.error_response());
    }
    match coupon_service.list().await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": list }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/coupons/{id}",
    tag = "coupon",
    params(("id" = i32, Path, description = "优惠券ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "优惠券详情", body = CouponResponse),
        (status = 403, description = "仅管理员可操作"),
        (status = 404, description = "优惠券不存在")
    )
)]
pub async fn get_coupon(
    coupon_service: web::Data<CouponService>,
    user: AuthUser,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&user) {
        return Ok(e.error_response());
    }
    match coupon_service.get(path.into_inner()).await {
        Ok(c) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": c }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/coupons",
    tag = "coupon",
    request_body = CreateCouponRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "创建成功", body = CouponResponse),
        (status = 400, description = "请求参数错误"),
        (status = 403, description = "仅管理员可操作")
    )
)]
pub async fn create_coupon(
    coupon_service: web::Data<CouponService>,
    user: AuthUser,
    request: web::Json<CreateCouponRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&user) {
        return Ok(e.error_response());
    }
    match coupon_service.create(request.into_inner()).await {
        Ok(c) => Ok(HttpResponse::Created().json(json!({ "success": true, "data": c }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/coupons/{id}",
    tag = "coupon",
    params(("id" = i32, Path, description = "优惠券ID")),
    request_body = UpdateCouponRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "更新成功", body = CouponResponse),
        (status = 403, description = "仅管理员可操作"),
        (status = 404, description = "优惠券不存在")
    )
)]
pub async fn update_coupon(
    coupon_service: web::Data<CouponService>,
    user: AuthUser,
    path: web::Path<i32>,
    request: web::Json<UpdateCouponRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&user) {
        return Ok(e.error_response());
    }
    match coupon_service
        .update(path.into_inner(), request.into_inner())
        .await
    {
        Ok(c) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": c }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/coupons/{id}",
    tag = "coupon",
    params(("id" = i32, Path, description = "优惠券ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "删除成功"),
        (status = 403, description = "仅管理员可操作"),
        (status = 404, description = "优惠券不存在")
    )
)]
pub async fn delete_coupon(
    coupon_service: web::Data<CouponService>,
    user: AuthUser,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&user) {
        return Ok(e.error_response());
    }
    match coupon_service.delete(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Coupon deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn coupon_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/coupons")
            .route("", web::get().to(list_coupons))
            .route("", web::post().to(create_coupon))
            .route("/{id}", web::get().to(get_coupon))
            .route("/{id}", web::put().to(update_coupon))
            .route("/{id}", web::delete().to(delete_coupon)),
    );
}
