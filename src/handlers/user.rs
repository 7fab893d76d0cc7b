use crate::models::*;
use crate::services::UserService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取个人资料成功", body = UserResponse),
        (status = 401, description = "未授权")
    )
)]
pub async fn get_me(user_service: web::Data<UserService>, user: AuthUser) -> Result<HttpResponse> {
    match user_service.get_profile(user.id).await {
        Ok(profile) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": profile
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/auth/me",
    tag = "auth",
    request_body = UpdateProfileRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "更新个人资料成功", body = UserResponse),
        (status = 400, description = "请求参数错误"),
        (status = 401, description = "未授权")
    )
)]
pub async fn update_me(
    user_service: web::Data<UserService>,
    user: AuthUser,
    request: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse> {
    match user_service
        .update_profile(user.id, request.into_inner())
        .await
    {
        Ok(profile) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": profile
        }))),
        Err(e) => Ok(e.error_response()),
    }
}
