use crate::entities::payment_entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreatePaymentRequest {
    #[schema(example = 3)]
    pub order_id: i32,
    /// 支付金额（分），缺省为订单总额
    #[schema(example = 500000)]
    pub amount: Option<i64>,
    #[schema(example = "UPI")]
    pub method: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaymentResponse {
    pub id: i32,
    pub order_id: i32,
    pub amount: i64,
    pub method: String,
    pub transaction_id: String,
    pub success: bool,
    pub created_at: DateTime<Utc>,
}

impl From<payment_entity::Model> for PaymentResponse {
    fn from(m: payment_entity::Model) -> Self {
        Self {
            id: m.id,
            order_id: m.order_id,
            amount: m.amount,
            method: m.method,
            transaction_id: m.transaction_id,
            success: m.success,
            created_at: m.created_at,
        }
    }
}
