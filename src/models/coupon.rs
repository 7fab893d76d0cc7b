use crate::entities::coupon_entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

fn default_active() -> bool {
    true
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateCouponRequest {
    /// 缺省时自动生成8位优惠码
    #[schema(example = "SAVE10")]
    pub code: Option<String>,
    #[schema(example = 10)]
    pub discount_percent: i32,
    #[serde(default = "default_active")]
    pub active: bool,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateCouponRequest {
    pub discount_percent: Option<i32>,
    pub active: Option<bool>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_to: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CouponResponse {
    pub id: i32,
    pub code: String,
    pub discount_percent: i32,
    pub active: bool,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<coupon_entity::Model> for CouponResponse {
    fn from(m: coupon_entity::Model) -> Self {
        Self {
            id: m.id,
            code: m.code,
            discount_percent: m.discount_percent,
            active: m.active,
            valid_from: m.valid_from,
            valid_to: m.valid_to,
            created_at: m.created_at,
        }
    }
}
