use crate::models::*;
use crate::services::{AppService, AuthUser, AuthzService, PermissionAction};
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

const RESOURCE: &str = "apps";

#[utoipa::path(
    get,
    path = "/admin/apps",
    tag = "admin",
    params(ListQuery, AppFilter),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "应用列表（含未上架）", body = [AppResponse])
    )
)]
pub async fn list_apps(
    authz: web::Data<AuthzService>,
    app_service: web::Data<AppService>,
    user: AuthUser,
    query: web::Query<ListQuery>,
    filter: web::Query<AppFilter>,
) -> Result<HttpResponse> {
    if let Err(e) = authz.require(&user, RESOURCE, PermissionAction::Get).await {
        return Ok(e.error_response());
    }
    match app_service.admin_list(&query, &filter).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": data
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/apps/count-by-status",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "各状态应用数量", body = [AppStatusCount])
    )
)]
pub async fn count_apps_by_status(
    authz: web::Data<AuthzService>,
    app_service: web::Data<AppService>,
    user: AuthUser,
) -> Result<HttpResponse> {
    if let Err(e) = authz.require(&user, RESOURCE, PermissionAction::Get).await {
        return Ok(e.error_response());
    }
    match app_service.count_by_status().await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": data
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/apps/{id}",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "应用 ID"),
        LocaleQuery
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "应用详情", body = AppResponse),
        (status = 404, description = "应用不存在")
    )
)]
pub async fn get_app(
    authz: web::Data<AuthzService>,
    app_service: web::Data<AppService>,
    user: AuthUser,
    path: web::Path<i64>,
    locale: web::Query<LocaleQuery>,
) -> Result<HttpResponse> {
    if let Err(e) = authz.require(&user, RESOURCE, PermissionAction::Get).await {
        return Ok(e.error_response());
    }
    match app_service
        .admin_get(path.into_inner(), locale.locale.as_deref())
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
    post,
    path = "/admin/apps",
    tag = "admin",
    params(LocaleQuery),
    request_body = CreateAppRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "创建成功", body = AppResponse),
        (status = 400, description = "请求参数错误")
    )
)]
pub async fn create_app(
    authz: web::Data<AuthzService>,
    app_service: web::Data<AppService>,
    user: AuthUser,
    locale: web::Query<LocaleQuery>,
    request: web::Json<CreateAppRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = authz.require(&user, RESOURCE, PermissionAction::Post).await {
        return Ok(e.error_response());
    }
    match app_service
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
    path = "/admin/apps/{id}",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "应用 ID"),
        LocaleQuery
    ),
    request_body = UpdateAppRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "更新成功", body = AppResponse)
    )
)]
pub async fn update_app(
    authz: web::Data<AuthzService>,
    app_service: web::Data<AppService>,
    user: AuthUser,
    path: web::Path<i64>,
    locale: web::Query<LocaleQuery>,
    request: web::Json<UpdateAppRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = authz.require(&user, RESOURCE, PermissionAction::Put).await {
        return Ok(e.error_response());
    }
    match app_service
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

#[utoipa::path(
    delete,
    path = "/admin/apps",
    tag = "admin",
    request_body = IdsRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "删除成功", body = AffectedResponse)
    )
)]
pub async fn delete_apps(
    authz: web::Data<AuthzService>,
    app_service: web::Data<AppService>,
    user: AuthUser,
    request: web::Json<IdsRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = authz.require(&user, RESOURCE, PermissionAction::Delete).await {
        return Ok(e.error_response());
    }
    match app_service.delete_many(&request.ids).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": data
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn app_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/apps")
            .route("", web::get().to(list_apps))
            .route("", web::post().to(create_app))
            .route("", web::delete().to(delete_apps))
            .route("/count-by-status", web::get().to(count_apps_by_status))
            .route("/{id}", web::get().to(get_app))
            .route("/{id}", web::put().to(update_app)),
    );
}
