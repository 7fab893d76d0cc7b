use super::ProductResponse;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AddCartItemRequest {
    #[schema(example = 1)]
    pub product_id: i32,
    #[serde(default = "default_quantity")]
    #[schema(example = 2)]
    pub quantity: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateCartItemRequest {
    #[schema(example = 5)]
    pub quantity: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CartItemResponse {
    pub id: i32,
    pub product: ProductResponse,
    pub quantity: i32,
    /// 单价 × 数量（分）
    pub subtotal: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CartResponse {
    pub id: i32,
    pub user_id: i32,
    pub items: Vec<CartItemResponse>,
    pub total_price: i64,
}
