use crate::entities::user_entity as users;
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::validate_phone;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel, Set};

#[derive(Clone)]
pub struct UserService {
    pool: DatabaseConnection,
}

impl UserService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn get_profile(&self, user_id: i32) -> AppResult<UserResponse> {
        let user = users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        Ok(UserResponse::from(user))
    }

    /// 只更新姓名、电话与地址；用户名、邮箱和角色保持只读
    pub async fn update_profile(
        &self,
        user_id: i32,
        request: UpdateProfileRequest,
    ) -> AppResult<UserResponse> {
        if request.first_name.is_none()
            && request.last_name.is_none()
            && request.phone.is_none()
            && request.address.is_none()
        {
            return Err(AppError::ValidationError("No fields to update".to_string()));
        }

        if let Some(phone) = &request.phone {
            validate_phone(phone.trim())?;
        }

        let mut model = users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?
            .into_active_model();

        if let Some(v) = request.first_name {
            model.first_name = Set(v.trim().to_string());
        }
        if let Some(v) = request.last_name {
            model.last_name = Set(v.trim().to_string());
        }
        if let Some(v) = request.phone {
            model.phone = Set(v.trim().to_string());
        }
        if let Some(v) = request.address {
            model.address = Set(v.trim().to_string());
        }
        model.updated_at = Set(Utc::now());

        let updated = model.update(&self.pool).await?;
        Ok(UserResponse::from(updated))
    }
}
