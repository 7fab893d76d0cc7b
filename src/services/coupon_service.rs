use crate::entities::coupon_entity as coupons;
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::generate_coupon_code;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, Set,
};

const COUPON_CODE_TAKEN: &str = "Coupon with this code already exists";

/// 按百分比计算折扣，向下取整到分
pub fn discount_for(subtotal: i64, percent: i32) -> i64 {
    // 以 i128 计算避免乘法溢出；percent 不超过 100，结果不大于 subtotal
    let discount = i128::from(subtotal) * i128::from(percent.clamp(0, 100)) / 100;
    i64::try_from(discount).unwrap_or(subtotal)
}

/// 查找当前可用的优惠码，不存在、停用或过期都返回校验错误
pub async fn find_valid_coupon<C: ConnectionTrait>(
    conn: &C,
    code: &str,
    now: DateTime<Utc>,
) -> AppResult<coupons::Model> {
    let coupon = coupons::Entity::find()
        .filter(coupons::Column::Code.eq(normalize_code(code)))
        .one(conn)
        .await?
        .ok_or_else(|| AppError::ValidationError("Invalid coupon code".to_string()))?;

    if !coupon.is_redeemable_at(now) {
        return Err(AppError::ValidationError(
            "Coupon is expired or inactive".to_string(),
        ));
    }

    Ok(coupon)
}

fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

fn validate_coupon_window(
    discount_percent: i32,
    valid_from: DateTime<Utc>,
    valid_to: DateTime<Utc>,
) -> AppResult<()> {
    if !(1..=100).contains(&discount_percent) {
        return Err(AppError::ValidationError(
            "Discount percent must be between 1 and 100".to_string(),
        ));
    }
    if valid_from >= valid_to {
        return Err(AppError::ValidationError(
            "valid_from must be earlier than valid_to".to_string(),
        ));
    }
    Ok(())
}

#[derive(Clone)]
pub struct CouponService {
    pool: DatabaseConnection,
}

impl CouponService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> AppResult<Vec<CouponResponse>> {
        let list = coupons::Entity::find()
            .order_by_desc(coupons::Column::CreatedAt)
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(CouponResponse::from).collect())
    }

    pub async fn get(&self, id: i32) -> AppResult<CouponResponse> {
        Ok(CouponResponse::from(self.find(id).await?))
    }

    pub async fn create(&self, request: CreateCouponRequest) -> AppResult<CouponResponse> {
        validate_coupon_window(
            request.discount_percent,
            request.valid_from,
            request.valid_to,
        )?;

        let code = match request.code.as_deref().map(normalize_code) {
            Some(code) if !code.is_empty() => {
                if code.len() > 20 || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
                    return Err(AppError::ValidationError(
                        "Coupon code must be 1-20 letters or digits".to_string(),
                    ));
                }
                code
            }
            _ => generate_coupon_code(),
        };

        let exists = coupons::Entity::find()
            .filter(coupons::Column::Code.eq(code.clone()))
            .one(&self.pool)
            .await?;
        if exists.is_some() {
            return Err(AppError::ValidationError(COUPON_CODE_TAKEN.to_string()));
        }

        let coupon = coupons::ActiveModel {
            code: Set(code),
            discount_percent: Set(request.discount_percent),
            active: Set(request.active),
            valid_from: Set(request.valid_from),
            valid_to: Set(request.valid_to),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await
        .map_err(|e| AppError::unique_violation(e, COUPON_CODE_TAKEN))?;

        log::info!("Created coupon {} ({}%)", coupon.code, coupon.discount_percent);
        Ok(CouponResponse::from(coupon))
    }

    pub async fn update(&self, id: i32, request: UpdateCouponRequest) -> AppResult<CouponResponse> {
        let existing = self.find(id).await?;

        let discount_percent = request.discount_percent.unwrap_or(existing.discount_percent);
        let valid_from = request.valid_from.unwrap_or(existing.valid_from);
        let valid_to = request.valid_to.unwrap_or(existing.valid_to);
        validate_coupon_window(discount_percent, valid_from, valid_to)?;

        let active = request.active.unwrap_or(existing.active);
        let mut model = existing.into_active_model();
        model.discount_percent = Set(discount_percent);
        model.valid_from = Set(valid_from);
        model.valid_to = Set(valid_to);
        model.active = Set(active);

        let updated = model.update(&self.pool).await?;
        Ok(CouponResponse::from(updated))
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let res = coupons::Entity::delete_by_id(id).exec(&self.pool).await?;
        if res.rows_affected == 0 {
            return Err(AppError::NotFound("Coupon not found".to_string()));
        }
        Ok(())
    }

    async fn find(&self, id: i32) -> AppResult<coupons::Model> {
        coupons::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Coupon not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_discount_rounds_down() {
        assert_eq!(discount_for(10_000, 10), 1_000);
        assert_eq!(discount_for(999, 15), 149);
        assert_eq!(discount_for(1, 50), 0);
        assert_eq!(discount_for(12_345, 100), 12_345);
        assert_eq!(discount_for(i64::MAX, 50), i64::MAX / 2);
        assert_eq!(discount_for(i64::MAX, 100), i64::MAX);
    }

    #[test]
    fn test_validate_coupon_window() {
        let now = Utc::now();
        assert!(validate_coupon_window(10, now, now + Duration::days(1)).is_ok());
        assert!(validate_coupon_window(0, now, now + Duration::days(1)).is_err());
        assert!(validate_coupon_window(101, now, now + Duration::days(1)).is_err());
        assert!(validate_coupon_window(10, now, now).is_err());
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code("  save10 "), "SAVE10");
    }
}
