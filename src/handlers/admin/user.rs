use crate::models::*;
use crate::services::{AuthUser, AuthzService, PermissionAction, UserService};
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

const RESOURCE: &str = "users";

#[utoipa::path(
    get,
    path = "/admin/users",
    tag = "admin",
    params(ListQuery, UserFilter),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "用户列表", body = [UserResponse]),
        (status = 403, description = "无权限")
    )
)]
pub async fn list_users(
    authz: web::Data<AuthzService>,
    user_service: web::Data<UserService>,
    user: AuthUser,
    query: web::Query<ListQuery>,
    filter: web::Query<UserFilter>,
) -> Result<HttpResponse> {
    if let Err(e) = authz.require(&user, RESOURCE, PermissionAction::Get).await {
        return Ok(e.error_response());
    }
    match user_service.admin_list(&query, &filter).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": data
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/users/{id}",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "用户 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "用户详情", body = UserResponse),
        (status = 404, description = "用户不存在")
    )
)]
pub async fn get_user(
    authz: web::Data<AuthzService>,
    user_service: web::Data<UserService>,
    user: AuthUser,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    if let Err(e) = authz.require(&user, RESOURCE, PermissionAction::Get).await {
        return Ok(e.error_response());
    }
    match user_service.admin_get(path.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": data
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/users",
    tag = "admin",
    request_body = CreateUserRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "创建成功", body = UserResponse),
        (status = 400, description = "请求参数错误")
    )
)]
pub async fn create_user(
    authz: web::Data<AuthzService>,
    user_service: web::Data<UserService>,
    user: AuthUser,
    request: web::Json<CreateUserRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = authz.require(&user, RESOURCE, PermissionAction::Post).await {
        return Ok(e.error_response());
    }
    match user_service.admin_create(request.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": data
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/admin/users/{id}",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "用户 ID")
    ),
    request_body = UpdateUserRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "更新成功", body = UserResponse)
    )
)]
pub async fn update_user(
    authz: web::Data<AuthzService>,
    user_service: web::Data<UserService>,
    user: AuthUser,
    path: web::Path<i64>,
    request: web::Json<UpdateUserRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = authz.require(&user, RESOURCE, PermissionAction::Put).await {
        return Ok(e.error_response());
    }
    match user_service
        .admin_update(path.into_inner(), request.into_inner())
        .await
    {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": data
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/admin/users",
    tag = "admin",
    request_body = IdsRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "软删除用户", body = AffectedResponse)
    )
)]
pub async fn delete_users(
    authz: web::Data<AuthzService>,
    user_service: web::Data<UserService>,
    user: AuthUser,
    request: web::Json<IdsRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = authz.require(&user, RESOURCE, PermissionAction::Delete).await {
        return Ok(e.error_response());
    }
    match user_service.delete_many(&request.ids).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": data
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/admin/users/ban",
    tag = "admin",
    request_body = IdsRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "封禁用户", body = AffectedResponse)
    )
)]
pub async fn ban_users(
    authz: web::Data<AuthzService>,
    user_service: web::Data<UserService>,
    user: AuthUser,
    request: web::Json<IdsRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = authz.require(&user, RESOURCE, PermissionAction::Put).await {
        return Ok(e.error_response());
    }
    match user_service.ban_many(&request.ids).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": data
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/admin/users/unban",
    tag = "admin",
    request_body = IdsRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "解除封禁", body = AffectedResponse)
    )
)]
pub async fn unban_users(
    authz: web::Data<AuthzService>,
    user_service: web::Data<UserService>,
    user: AuthUser,
    request: web::Json<IdsRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = authz.require(&user, RESOURCE, PermissionAction::Put).await {
        return Ok(e.error_response());
    }
    match user_service.unban_many(&request.ids).await {
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
            .route("", web::get().to(list_users))
            .route("", web::post().to(create_user))
            .route("", web::delete().to(delete_users))
            .route("/ban", web::put().to(ban_users))
            .route("/unban", web::put().to(unban_users))
            .route("/{id}", web::get().to(get_user))
            .route("/{id}", web::put().to(update_user)),
    );
}
