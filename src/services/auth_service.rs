use crate::config::AdminConfig;
use crate::entities::{UserRole, user_entity as users};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::*;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

const USERNAME_TAKEN: &str = "A user with that username already exists";

#[derive(Clone)]
pub struct AuthService {
    pool: DatabaseConnection,
    jwt_service: JwtService,
}

impl AuthService {
    pub fn new(pool: DatabaseConnection, jwt_service: JwtService) -> Self {
        Self { pool, jwt_service }
    }

    pub async fn register(&self, request: RegisterRequest) -> AppResult<AuthResponse> {
        let role = request.role.unwrap_or(UserRole::Customer);
        // 管理员账号只能由配置引导创建
        if role == UserRole::Admin {
            return Err(AppError::Forbidden);
        }

        let username = request.username.trim().to_string();
        validate_username(&username)?;
        validate_email(request.email.trim())?;
        validate_password(&request.password)?;
        validate_phone(request.phone.trim())?;

        if self.find_by_username(&username).await?.is_some() {
            return Err(AppError::ValidationError(USERNAME_TAKEN.to_string()));
        }

        let user = self
            .insert_user(
                username,
                request.email.trim().to_string(),
                &request.password,
                role,
                ProfileFields {
                    first_name: request.first_name,
                    last_name: request.last_name,
                    phone: request.phone,
                    address: request.address,
                },
            )
            .await?;

        log::info!("Registered user {} with role {}", user.id, user.role);
        self.issue_tokens(user)
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        let invalid = || AppError::AuthError("Invalid username or password".to_string());

        let user = self
            .find_by_username(request.username.trim())
            .await?
            .ok_or_else(invalid)?;

        if !verify_password(&request.password, &user.password_hash)? {
            return Err(invalid());
        }

        self.issue_tokens(user)
    }

    pub async fn refresh_token(&self, refresh_token: &str) -> AppResult<AuthResponse> {
        let claims = self.jwt_service.verify_refresh_token(refresh_token)?;
        let auth_user = claims.auth_user()?;

        // 角色以数据库为准，令牌中的角色可能已过期
        let user = users::Entity::find_by_id(auth_user.id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::AuthError("User no longer exists".to_string()))?;

        self.issue_tokens(user)
    }

    /// 启动时确保配置中的管理员账号存在
    pub async fn ensure_admin(&self, admin: &AdminConfig) -> AppResult<()> {
        if self.find_by_username(&admin.username).await?.is_some() {
            return Ok(());
        }

        validate_password(&admin.password)?;
        let user = self
            .insert_user(
                admin.username.clone(),
                admin.email.clone(),
                &admin.password,
                UserRole::Admin,
                ProfileFields::default(),
            )
            .await?;
        log::info!("Bootstrapped admin account {}", user.username);
        Ok(())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<users::Model>> {
        Ok(users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.pool)
            .await?)
    }

    async fn insert_user(
        &self,
        username: String,
        email: String,
        password: &str,
        role: UserRole,
        profile: ProfileFields,
    ) -> AppResult<users::Model> {
        let now = Utc::now();
        let user = users::ActiveModel {
            username: Set(username),
            email: Set(email),
            password_hash: Set(hash_password(password)?),
            first_name: Set(profile.first_name.trim().to_string()),
            last_name: Set(profile.last_name.trim().to_string()),
            phone: Set(profile.phone.trim().to_string()),
            address: Set(profile.address.trim().to_string()),
            role: Set(role),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await
        .map_err(|e| AppError::unique_violation(e, USERNAME_TAKEN))?;
        Ok(user)
    }

    fn issue_tokens(&self, user: users::Model) -> AppResult<AuthResponse> {
        let access_token = self.jwt_service.generate_access_token(user.id, user.role)?;
        let refresh_token = self.jwt_service.generate_refresh_token(user.id, user.role)?;

        Ok(AuthResponse {
            user: UserResponse::from(user),
            access_token,
            refresh_token,
            expires_in: self.jwt_service.get_access_token_expires_in(),
        })
    }
}

#[derive(Default)]
struct ProfileFields {
    first_name: String,
    last_name: String,
    phone: String,
    address: String,
}
