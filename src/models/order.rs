use super::PaymentResponse;
use crate::entities::{OrderStatus, order_entity, order_item_entity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    #[schema(example = "SAVE10")]
    pub coupon_code: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CheckoutResponse {
    pub order_id: i32,
    pub total: i64,
    pub discount: i64,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct OrderQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub status: Option<OrderStatus>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    #[schema(example = "SHIPPED")]
    pub status: OrderStatus,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: i32,
    pub product_id: Option<i32>,
    pub product_name: String,
    pub quantity: i32,
    /// 下单时单价（分）
    pub price: i64,
    pub subtotal: i64,
}

impl From<order_item_entity::Model> for OrderItemResponse {
    fn from(m: order_item_entity::Model) -> Self {
        Self {
            id: m.id,
            product_id: m.product_id,
            product_name: m.product_name,
            quantity: m.quantity,
            price: m.price,
            subtotal: m.price.saturating_mul(i64::from(m.quantity)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub id: i32,
    pub user_id: i32,
    pub total: i64,
    pub discount: i64,
    pub coupon_code: Option<String>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<OrderItemResponse>,
    pub payment: Option<PaymentResponse>,
}

impl OrderResponse {
    pub fn from_parts(
        m: order_entity::Model,
        items: Vec<OrderItemResponse>,
        payment: Option<PaymentResponse>,
    ) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            total: m.total,
            discount: m.discount,
            coupon_code: m.coupon_code,
            status: m.status,
            created_at: m.created_at,
            updated_at: m.updated_at,
            items,
            payment,
        }
    }
}
