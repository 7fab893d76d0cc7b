use super::catalog_service::load_product_responses;
use crate::entities::{product_entity as products, wishlist_entity as wishlists};
use crate::error::{AppError, AppResult};
use crate::models::*;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::collections::HashMap;

const ALREADY_WISHLISTED: &str = "Product is already in your wishlist";

#[derive(Clone)]
pub struct WishlistService {
    pool: DatabaseConnection,
}

impl WishlistService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn list(&self, user_id: i32) -> AppResult<Vec<WishlistItemResponse>> {
        let entries = wishlists::Entity::find()
            .filter(wishlists::Column::UserId.eq(user_id))
            .order_by_desc(wishlists::Column::AddedAt)
            .order_by_desc(wishlists::Column::Id)
            .all(&self.pool)
            .await?;
        self.to_responses(entries).await
    }

    pub async fn add(&self, user_id: i32, request: AddWishlistRequest) -> AppResult<WishlistItemResponse> {
        products::Entity::find_by_id(request.product_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

        let exists = wishlists::Entity::find()
            .filter(wishlists::Column::UserId.eq(user_id))
            .filter(wishlists::Column::ProductId.eq(request.product_id))
            .one(&self.pool)
            .await?;
        if exists.is_some() {
            return Err(AppError::ValidationError(ALREADY_WISHLISTED.to_string()));
        }

        let entry = wishlists::ActiveModel {
            user_id: Set(user_id),
            product_id: Set(request.product_id),
            added_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await
        .map_err(|e| AppError::unique_violation(e, ALREADY_WISHLISTED))?;

        self.to_responses(vec![entry])
            .await?
            .pop()
            .ok_or_else(|| AppError::InternalError("Wishlist entry missing".to_string()))
    }

    pub async fn remove(&self, user_id: i32, id: i32) -> AppResult<()> {
        let res = wishlists::Entity::delete_many()
            .filter(wishlists::Column::Id.eq(id))
            .filter(wishlists::Column::UserId.eq(user_id))
            .exec(&self.pool)
            .await?;
        if res.rows_affected == 0 {
            return Err(AppError::NotFound("Wishlist item not found".to_string()));
        }
        Ok(())
    }

    async fn to_responses(
        &self,
        entries: Vec<wishlists::Model>,
    ) -> AppResult<Vec<WishlistItemResponse>> {
        if entries.is_empty() {
            return Ok(Vec::new());
        }
        let product_ids: Vec<i32> = entries.iter().map(|e| e.product_id).collect();
        let product_list = products::Entity::find()
            .filter(products::Column::Id.is_in(product_ids))
            .all(&self.pool)
            .await?;
        let product_map: HashMap<i32, ProductResponse> =
            load_product_responses(&self.pool, product_list)
                .await?
                .into_iter()
                .map(|p| (p.id, p))
                .collect();

        Ok(entries
            .into_iter()
            .filter_map(|e| {
                Some(WishlistItemResponse {
                    id: e.id,
                    product: product_map.get(&e.product_id)?.clone(),
                    added_at: e.added_at,
                })
            })
            .collect())
    }
}
