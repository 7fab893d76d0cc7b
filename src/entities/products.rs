use crate::error::AppResult;
use crate::utils::line_total;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// 商品实体
/// - price: 单价（分）
/// - stock: 库存，结算时以 `stock >= quantity` 条件原子扣减
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub stock: i32,
    pub category_id: Option<i32>,
    pub brand_id: Option<i32>,
    pub seller_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    /// 单价 × 数量，溢出时返回校验错误
    pub fn subtotal(&self, quantity: i32) -> AppResult<i64> {
        line_total(self.price, quantity)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_delete = "SetNull"
    )]
    Category,
    #[sea_orm(
        belongs_to = "super::brands::Entity",
        from = "Column::BrandId",
        to = "super::brands::Column::Id",
        on_delete = "SetNull"
    )]
    Brand,
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::brands::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Brand.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
