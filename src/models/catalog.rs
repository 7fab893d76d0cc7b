use crate::entities::{brand_entity, category_entity, product_entity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CategoryRequest {
    #[schema(example = "Electronics")]
    pub name: String,
    #[serde(default)]
    #[schema(example = "All gadgets")]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponse {
    pub id: i32,
    pub name: String,
    pub description: String,
}

impl From<category_entity::Model> for CategoryResponse {
    fn from(m: category_entity::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BrandRequest {
    #[schema(example = "Samsung")]
    pub name: String,
    #[serde(default)]
    #[schema(example = "Smart Devices")]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BrandResponse {
    pub id: i32,
    pub name: String,
    pub description: String,
}

impl From<brand_entity::Model> for BrandResponse {
    fn from(m: brand_entity::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
        }
    }
}

/// 商品列表查询参数
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ProductQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    /// 按名称或描述模糊搜索
    pub search: Option<String>,
    /// price / -price / created_at / -created_at
    pub ordering: Option<String>,
    pub category_id: Option<i32>,
    pub brand_id: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    #[schema(example = "Galaxy S25")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// 单价（分）
    #[schema(example = 6500000)]
    pub price: i64,
    #[serde(default)]
    #[schema(example = 100)]
    pub stock: i32,
    pub category_id: Option<i32>,
    pub brand_id: Option<i32>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub stock: Option<i32>,
    pub category_id: Option<i32>,
    pub brand_id: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub stock: i32,
    pub category: Option<CategoryResponse>,
    pub brand: Option<BrandResponse>,
    pub seller_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductResponse {
    pub fn from_parts(
        m: product_entity::Model,
        category: Option<CategoryResponse>,
        brand: Option<BrandResponse>,
    ) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            price: m.price,
            stock: m.stock,
            category,
            brand,
            seller_id: m.seller_id,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
