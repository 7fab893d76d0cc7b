use super::catalog_service::load_product_responses;
use crate::entities::{cart_entity as carts, cart_item_entity as cart_items, product_entity as products};
use crate::error::{AppError, AppResult, is_unique_violation};
use crate::models::*;
use crate::utils::{MAX_QUANTITY, line_total, sum_amounts, validate_quantity};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use std::collections::HashMap;

async fn find_cart<C: ConnectionTrait>(conn: &C, user_id: i32) -> AppResult<Option<carts::Model>> {
    Ok(carts::Entity::find()
        .filter(carts::Column::UserId.eq(user_id))
        .one(conn)
        .await?)
}

/// 获取用户购物车，不存在时创建
pub(crate) async fn ensure_cart<C: ConnectionTrait>(conn: &C, user_id: i32) -> AppResult<carts::Model> {
    if let Some(cart) = find_cart(conn, user_id).await? {
        return Ok(cart);
    }

    let inserted = carts::ActiveModel {
        user_id: Set(user_id),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(conn)
    .await;

    match inserted {
        Ok(cart) => Ok(cart),
        // 并发的首次请求已创建购物车，取回即可
        Err(e) if is_unique_violation(&e) => find_cart(conn, user_id)
            .await?
            .ok_or_else(|| AppError::InternalError("Cart vanished after insert".to_string())),
        Err(e) => Err(e.into()),
    }
}

fn quantity_limit_exceeded() -> AppError {
    AppError::ValidationError(format!("Quantity must be at most {MAX_QUANTITY}"))
}

#[derive(Clone)]
pub struct CartService {
    pool: DatabaseConnection,
}

impl CartService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn get_cart(&self, user_id: i32) -> AppResult<CartResponse> {
        let cart = ensure_cart(&self.pool, user_id).await?;
        self.cart_response(cart).await
    }

    /// 加入购物车；同一商品已存在时累加数量
    pub async fn add_item(&self, user_id: i32, request: AddCartItemRequest) -> AppResult<CartResponse> {
        validate_quantity(request.quantity)?;

        products::Entity::find_by_id(request.product_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

        let cart = ensure_cart(&self.pool, user_id).await?;

        let merged = self
            .merge_quantity(cart.id, request.product_id, request.quantity)
            .await?;
        if merged == 0 {
            let inserted = cart_items::ActiveModel {
                cart_id: Set(cart.id),
                product_id: Set(request.product_id),
                quantity: Set(request.quantity),
                ..Default::default()
            }
            .insert(&self.pool)
            .await;

            match inserted {
                Ok(_) => {}
                // 并发请求先插入了同一商品，改为累加
                Err(e) if is_unique_violation(&e) => {
                    self.merge_quantity(cart.id, request.product_id, request.quantity)
                        .await?;
                }
                Err(e) => return Err(e.into()),
            }
        }

        self.cart_response(cart).await
    }

    pub async fn update_item(
        &self,
        user_id: i32,
        item_id: i32,
        request: UpdateCartItemRequest,
    ) -> AppResult<CartResponse> {
        validate_quantity(request.quantity)?;
        let cart = ensure_cart(&self.pool, user_id).await?;

        let res = cart_items::Entity::update_many()
            .col_expr(cart_items::Column::Quantity, Expr::value(request.quantity))
            .filter(cart_items::Column::Id.eq(item_id))
            .filter(cart_items::Column::CartId.eq(cart.id))
            .exec(&self.pool)
            .await?;
        if res.rows_affected == 0 {
            return Err(AppError::NotFound("Item not found".to_string()));
        }

        self.cart_response(cart).await
    }

    pub async fn remove_item(&self, user_id: i32, item_id: i32) -> AppResult<CartResponse> {
        let cart = ensure_cart(&self.pool, user_id).await?;

        let res = cart_items::Entity::delete_many()
            .filter(cart_items::Column::Id.eq(item_id))
            .filter(cart_items::Column::CartId.eq(cart.id))
            .exec(&self.pool)
            .await?;
        if res.rows_affected == 0 {
            return Err(AppError::NotFound("Item not found".to_string()));
        }

        self.cart_response(cart).await
    }

    /// 累加已有条目的数量，返回受影响行数。累加后超过上限时返回校验错误
    async fn merge_quantity(&self, cart_id: i32, product_id: i32, quantity: i32) -> AppResult<u64> {
        let existing = cart_items::Entity::find()
            .filter(cart_items::Column::CartId.eq(cart_id))
            .filter(cart_items::Column::ProductId.eq(product_id))
            .one(&self.pool)
            .await?;
        if existing.is_none() {
            return Ok(0);
        }

        // 条件更新，数量不会越过上限
        let merged = cart_items::Entity::update_many()
            .col_expr(
                cart_items::Column::Quantity,
                Expr::col(cart_items::Column::Quantity).add(quantity),
            )
            .filter(cart_items::Column::CartId.eq(cart_id))
            .filter(cart_items::Column::ProductId.eq(product_id))
            .filter(cart_items::Column::Quantity.lte(MAX_QUANTITY - quantity))
            .exec(&self.pool)
            .await?;
        if merged.rows_affected == 0 {
            return Err(quantity_limit_exceeded());
        }
        Ok(merged.rows_affected)
    }

    async fn cart_response(&self, cart: carts::Model) -> AppResult<CartResponse> {
        let items = cart_items::Entity::find()
            .filter(cart_items::Column::CartId.eq(cart.id))
            .order_by_asc(cart_items::Column::Id)
            .all(&self.pool)
            .await?;

        let product_ids: Vec<i32> = items.iter().map(|i| i.product_id).collect();
        let product_list = if product_ids.is_empty() {
            Vec::new()
        } else {
            products::Entity::find()
                .filter(products::Column::Id.is_in(product_ids))
                .all(&self.pool)
                .await?
        };
        let product_map: HashMap<i32, ProductResponse> =
            load_product_responses(&self.pool, product_list)
                .await?
                .into_iter()
                .map(|p| (p.id, p))
                .collect();

        let mut lines = Vec::with_capacity(items.len());
        for item in items {
            let Some(product) = product_map.get(&item.product_id) else {
                continue;
            };
            lines.push(CartItemResponse {
                id: item.id,
                subtotal: line_total(product.price, item.quantity)?,
                product: product.clone(),
                quantity: item.quantity,
            });
        }
        let total_price = sum_amounts(lines.iter().map(|i| i.subtotal))?;

        Ok(CartResponse {
            id: cart.id,
            user_id: cart.user_id,
            items: lines,
            total_price,
        })
    }
}
