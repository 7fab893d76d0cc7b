use crate::entities::{
    OrderStatus, order_entity as orders, order_item_entity as order_items,
    payment_entity as payments,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use std::collections::HashMap;

/// 批量组装订单明细与支付记录
pub(crate) async fn load_order_responses<C: ConnectionTrait>(
    conn: &C,
    list: Vec<orders::Model>,
) -> AppResult<Vec<OrderResponse>> {
    if list.is_empty() {
        return Ok(Vec::new());
    }
    let order_ids: Vec<i32> = list.iter().map(|o| o.id).collect();

    let mut items_by_order: HashMap<i32, Vec<OrderItemResponse>> = HashMap::new();
    for item in order_items::Entity::find()
        .filter(order_items::Column::OrderId.is_in(order_ids.clone()))
        .order_by_asc(order_items::Column::Id)
        .all(conn)
        .await?
    {
        items_by_order
            .entry(item.order_id)
            .or_default()
            .push(OrderItemResponse::from(item));
    }

    let mut payment_by_order: HashMap<i32, PaymentResponse> = payments::Entity::find()
        .filter(payments::Column::OrderId.is_in(order_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|p| (p.order_id, PaymentResponse::from(p)))
        .collect();

    Ok(list
        .into_iter()
        .map(|o| {
            let items = items_by_order.remove(&o.id).unwrap_or_default();
            let payment = payment_by_order.remove(&o.id);
            OrderResponse::from_parts(o, items, payment)
        })
        .collect())
}

#[derive(Clone)]
pub struct OrderService {
    pool: DatabaseConnection,
}

impl OrderService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 管理员查看全部订单，其他用户只能看到自己的
    pub async fn list_orders(
        &self,
        user: &AuthUser,
        query: &OrderQuery,
    ) -> AppResult<PaginatedResponse<OrderResponse>> {
        let params = PaginationParams::new(query.page, query.per_page);

        let mut select = orders::Entity::find();
        if !user.is_admin() {
            select = select.filter(orders::Column::UserId.eq(user.id));
        }
        if let Some(status) = query.status {
            select = select.filter(orders::Column::Status.eq(status));
        }

        let total = select.clone().count(&self.pool).await?;
        let list = select
            .order_by_desc(orders::Column::CreatedAt)
            .order_by_desc(orders::Column::Id)
            .offset(params.get_offset())
            .limit(params.get_limit())
            .all(&self.pool)
            .await?;

        let data = load_order_responses(&self.pool, list).await?;
        Ok(PaginatedResponse::new(data, &params, total))
    }

    pub async fn get_order(&self, user: &AuthUser, order_id: i32) -> AppResult<OrderResponse> {
        let order = self.find_visible(user, order_id).await?;
        self.order_response(order).await
    }

    /// 管理员直接设置订单状态，不校验状态流转
    pub async fn update_status(
        &self,
        user: &AuthUser,
        order_id: i32,
        status: OrderStatus,
    ) -> AppResult<OrderResponse> {
        if !user.is_admin() {
            return Err(AppError::PermissionDenied);
        }

        let order = orders::Entity::find_by_id(order_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;
        let previous = order.status;

        let mut model = order.into_active_model();
        model.status = Set(status);
        model.updated_at = Set(Utc::now());
        let updated = model.update(&self.pool).await?;

        log::info!(
            "Order {} status changed {} -> {} by admin {}",
            order_id,
            previous,
            status,
            user.id
        );
        self.order_response(updated).await
    }

    async fn find_visible(&self, user: &AuthUser, order_id: i32) -> AppResult<orders::Model> {
        let mut select = orders::Entity::find_by_id(order_id);
        if !user.is_admin() {
            select = select.filter(orders::Column::UserId.eq(user.id));
        }
        // 他人订单同样返回 404，不暴露订单是否存在
        select
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".to_string()))
    }

    async fn order_response(&self, order: orders::Model) -> AppResult<OrderResponse> {
        load_order_responses(&self.pool, vec![order])
            .await?
            .pop()
            .ok_or_else(|| AppError::InternalError("Order response missing".to_string()))
    }
}
