use super::ProductResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AddWishlistRequest {
    pub product_id: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WishlistItemResponse {
    pub id: i32,
    pub product: ProductResponse,
    pub added_at: DateTime<Utc>,
}
