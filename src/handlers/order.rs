use crate::models::*;
use crate::services::OrderService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/orders",
    tag = "order",
    params(
        ("page" = Option<u32>, Query, description = "页码"),
        ("per_page" = Option<u32>, Query, description = "每页数量"),
        ("status" = Option<OrderStatus>, Query, description = "订单状态")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "订单分页列表"),
        (status = 401, description = "未授权")
    )
)]
pub async fn get_orders(
    order_service: web::Data<OrderService>,
    user: AuthUser,
    query: web::Query<OrderQuery>,
) -> Result<HttpResponse> {
    match order_service.list_orders(&user, &query.into_inner()).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": page }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/orders/{id}",
    tag = "order",
    params(("id" = i32, Path, description = "订单ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "订单详情", body = OrderResponse),
        (status = 404, description = "订单不存在")
    )
)]
pub async fn get_order(
    order_service: web::Data<OrderService>,
    user: AuthUser,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    match order_service.get_order(&user, path.into_inner()).await {
        Ok(order) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": order }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/orders/{id}",
    tag = "order",
    params(("id" = i32, Path, description = "订单ID")),
    request_body = UpdateOrderStatusRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "状态已更新", body = OrderResponse),
        (status = 403, description = "仅管理员可操作"),
        (status = 404, description = "订单不存在")
    )
)]
pub async fn update_order_status(
    order_service: web::Data<OrderService>,
    user: AuthUser,
    path: web::Path<i32>,
    request: web::Json<UpdateOrderStatusRequest>,
) -> Result<HttpResponse> {
    match order_service
        .update_status(&user, path.into_inner(), request.status)
        .await
    {
        Ok(order) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": order }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn order_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/orders")
            .route("", web::get().to(get_orders))
            .route("/{id}", web::get().to(get_order))
            .route("/{id}", web::patch().to(update_order_status)),
    );
}
