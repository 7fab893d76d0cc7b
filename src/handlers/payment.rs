use crate::models::*;
use crate::services::PaymentService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/payments",
    tag = "payment",
    request_body = CreatePaymentRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "支付成功", body = PaymentResponse),
        (status = 400, description = "Order already paid or processed"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn create_payment(
    payment_service: web::Data<PaymentService>,
    user: AuthUser,
    request: web::Json<CreatePaymentRequest>,
) -> Result<HttpResponse> {
    match payment_service.pay(user.id, request.into_inner()).await {
        Ok(payment) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": payment
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn payment_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/payments", web::post().to(create_payment));
}
