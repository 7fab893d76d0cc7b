use super::coupon_service::{discount_for, find_valid_coupon};
use crate::entities::{
    OrderStatus, cart_entity as carts, cart_item_entity as cart_items, order_entity as orders,
    order_item_entity as order_items, product_entity as products,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::sum_amounts;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use std::collections::HashMap;

#[derive(Clone)]
pub struct CheckoutService {
    pool: DatabaseConnection,
}

impl CheckoutService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 将购物车转换为订单。整个过程在一个事务内完成，任一步失败全部回滚
    pub async fn checkout(
        &self,
        user_id: i32,
        request: CheckoutRequest,
    ) -> AppResult<CheckoutResponse> {
        let txn = self.pool.begin().await?;
        match self.checkout_in(&txn, user_id, request).await {
            Ok(resp) => {
                txn.commit().await?;
                log::info!(
                    "Order {} placed by user {} (total {}, discount {})",
                    resp.order_id,
                    user_id,
                    resp.total,
                    resp.discount
                );
                Ok(resp)
            }
            Err(e) => {
                txn.rollback().await?;
                Err(e)
            }
        }
    }

    async fn checkout_in(
        &self,
        txn: &DatabaseTransaction,
        user_id: i32,
        request: CheckoutRequest,
    ) -> AppResult<CheckoutResponse> {
        // 事务内只读取购物车，没有购物车等同于空购物车
        let cart = carts::Entity::find()
            .filter(carts::Column::UserId.eq(user_id))
            .one(txn)
            .await?
            .ok_or_else(|| AppError::ValidationError("Cart is empty".to_string()))?;
        let lines = cart_items::Entity::find()
            .filter(cart_items::Column::CartId.eq(cart.id))
            .order_by_asc(cart_items::Column::Id)
            .all(txn)
            .await?;
        if lines.is_empty() {
            return Err(AppError::ValidationError("Cart is empty".to_string()));
        }

        let product_ids: Vec<i32> = lines.iter().map(|l| l.product_id).collect();
        let product_map: HashMap<i32, products::Model> = products::Entity::find()
            .filter(products::Column::Id.is_in(product_ids))
            .all(txn)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let mut priced = Vec::with_capacity(lines.len());
        for line in &lines {
            let product = product_map.get(&line.product_id).ok_or_else(|| {
                AppError::NotFound(format!("Product {} not found", line.product_id))
            })?;
            priced.push((product, line.quantity));
        }
        let mut line_totals = Vec::with_capacity(priced.len());
        for (product, quantity) in &priced {
            line_totals.push(product.subtotal(*quantity)?);
        }
        let subtotal = sum_amounts(line_totals)?;

        let now = Utc::now();
        let (discount, coupon_code) = match request
            .coupon_code
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
        {
            Some(code) => {
                let coupon = find_valid_coupon(txn, code, now).await?;
                (
                    discount_for(subtotal, coupon.discount_percent),
                    Some(coupon.code),
                )
            }
            None => (0, None),
        };

        let order = orders::ActiveModel {
            user_id: Set(user_id),
            total: Set(subtotal - discount),
            discount: Set(discount),
            coupon_code: Set(coupon_code),
            status: Set(OrderStatus::Pending),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(txn)
        .await?;

        for (product, quantity) in priced {
            order_items::ActiveModel {
                order_id: Set(order.id),
                product_id: Set(Some(product.id)),
                product_name: Set(product.name.clone()),
                quantity: Set(quantity),
                price: Set(product.price),
                ..Default::default()
            }
            .insert(txn)
            .await?;

            // 条件扣减库存，并发下也不会变为负数
            let res = products::Entity::update_many()
                .col_expr(
                    products::Column::Stock,
                    Expr::col(products::Column::Stock).sub(quantity),
                )
                .col_expr(products::Column::UpdatedAt, Expr::value(now))
                .filter(products::Column::Id.eq(product.id))
                .filter(products::Column::Stock.gte(quantity))
                .exec(txn)
                .await?;
            if res.rows_affected == 0 {
                return Err(AppError::ValidationError(format!(
                    "Insufficient stock for product {}",
                    product.name
                )));
            }
        }

        cart_items::Entity::delete_many()
            .filter(cart_items::Column::CartId.eq(cart.id))
            .exec(txn)
            .await?;

        Ok(CheckoutResponse {
            order_id: order.id,
            total: order.total,
            discount: order.discount,
        })
    }
}
