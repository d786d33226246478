use crate::models::*;
use crate::services::{AuthUser, ReferralService, UserService};
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/users/me",
    tag = "user",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取当前用户成功", body = UserResponse),
        (status = 401, description = "未授权")
    )
)]
pub async fn get_me(user_service: web::Data<UserService>, user: AuthUser) -> Result<HttpResponse> {
    match user_service.get_me(user.id).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": data
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/users/me",
    tag = "user",
    request_body = UpdateMeRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "更新成功", body = UserResponse),
        (status = 400, description = "请求参数错误")
    )
)]
pub async fn update_me(
    user_service: web::Data<UserService>,
    user: AuthUser,
    request: web::Json<UpdateMeRequest>,
) -> Result<HttpResponse> {
    match user_service.update_me(user.id, request.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": data
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/users/me/referrals",
    tag = "user",
    params(ListQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "被推荐用户列表", body = [ReferralResponse])
    )
)]
pub async fn get_referrals(
    referral_service: web::Data<ReferralService>,
    user: AuthUser,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse> {
    match referral_service.list_referred(user.id, &query).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": data
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn user_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .route("/me", web::get().to(get_me))
            .route("/me", web::put().to(update_me))
            .route("/me/referrals", web::get().to(get_referrals)),
    );
}
