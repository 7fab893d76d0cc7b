use crate::models::*;
use crate::services::CheckoutService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/checkout",
    tag = "order",
    request_body(content = CheckoutRequest, description = "可选的优惠码"),
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Order placed successfully", body = CheckoutResponse),
        (status = 400, description = "购物车为空、库存不足或优惠码无效"),
        (status = 401, description = "未授权")
    )
)]
pub async fn checkout(
    checkout_service: web::Data<CheckoutService>,
    user: AuthUser,
    request: Option<web::Json<CheckoutRequest>>,
) -> Result<HttpResponse> {
    // 请求体可省略
    let request = request.map(web::Json::into_inner).unwrap_or_default();

    match checkout_service.checkout(user.id, request).await {
        Ok(resp) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "message": "Order placed successfully",
            "order_id": resp.order_id,
            "data": resp
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn checkout_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/checkout", web::post().to(checkout));
}
