use crate::models::*;
use crate::services::{AuthUser, AuthzService, PermissionAction, WheelService};
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

const RESOURCE: &str = "wheels";

#[utoipa::path(
    get,
    path = "/admin/wheels",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "转盘列表（含奖品）", body = [AdminWheelResponse])
    )
)]
pub async fn list_wheels(
    authz: web::Data<AuthzService>,
    wheel_service: web::Data<WheelService>,
    user: AuthUser,
) -> Result<HttpResponse> {
    if let Err(e) = authz.require(&user, RESOURCE, PermissionAction::Get).await {
        return Ok(e.error_response());
    }
    match wheel_service.admin_list().await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": data
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/wheels/{id}",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "转盘 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "转盘详情", body = AdminWheelResponse),
        (status = 404, description = "转盘不存在")
    )
)]
pub async fn get_wheel(
    authz: web::Data<AuthzService>,
    wheel_service: web::Data<WheelService>,
    user: AuthUser,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    if let Err(e) = authz.require(&user, RESOURCE, PermissionAction::Get).await {
        return Ok(e.error_response());
    }
    match wheel_service.admin_get(path.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": data
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/wheels",
    tag = "admin",
    params(LocaleQuery),
    request_body = CreateWheelRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "创建成功", body = AdminWheelResponse),
        (status = 400, description = "奖品概率之和必须为 100%")
    )
)]
pub async fn create_wheel(
    authz: web::Data<AuthzService>,
    wheel_service: web::Data<WheelService>,
    user: AuthUser,
    locale: web::Query<LocaleQuery>,
    request: web::Json<CreateWheelRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = authz.require(&user, RESOURCE, PermissionAction::Post).await {
        return Ok(e.error_response());
    }
    match wheel_service
        .admin_create(user.id, request.into_inner(), locale.locale.as_deref())
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
    put,
    path = "/admin/wheels/{id}",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "转盘 ID"),
        LocaleQuery
    ),
    request_body = UpdateWheelRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "更新成功", body = AdminWheelResponse)
    )
)]
pub async fn update_wheel(
    authz: web::Data<AuthzService>,
    wheel_service: web::Data<WheelService>,
    user: AuthUser,
    path: web::Path<i64>,
    locale: web::Query<LocaleQuery>,
    request: web::Json<UpdateWheelRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = authz.require(&user, RESOURCE, PermissionAction::Put).await {
        return Ok(e.error_response());
    }
    match wheel_service
        .admin_update(
            path.into_inner(),
            user.id,
            request.into_inner(),
            locale.locale.as_deref(),
        )
        .await
    {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": data
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn wheel_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/wheels")
            .route("", web::get().to(list_wheels))
            .route("", web::post().to(create_wheel))
            .route("/{id}", web::get().to(get_wheel))
            .route("/{id}", web::put().to(update_wheel)),
    );
}
