use crate::models::*;
use crate::services::{AuthUser, AuthzService, PermissionAction};
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

const RESOURCE: &str = "roles";

#[utoipa::path(
    get,
    path = "/admin/roles",
    tag = "admin",
    params(ListQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "角色列表", body = [RoleResponse])
    )
)]
pub async fn list_roles(
    authz: web::Data<AuthzService>,
    user: AuthUser,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse> {
    if let Err(e) = authz.require(&user, RESOURCE, PermissionAction::Get).await {
        return Ok(e.error_response());
    }
    match authz.list_roles(&query).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": data
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/roles/{id}",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "角色 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "角色详情", body = RoleResponse),
        (status = 404, description = "角色不存在")
    )
)]
pub async fn get_role(
    authz: web::Data<AuthzService>,
    user: AuthUser,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    if let Err(e) = authz.require(&user, RESOURCE, PermissionAction::Get).await {
        return Ok(e.error_response());
    }
    match authz.get_role(path.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": data
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/roles",
    tag = "admin",
    request_body = CreateRoleRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "创建成功", body = RoleResponse),
        (status = 400, description = "权限不合法")
    )
)]
pub async fn create_role(
    authz: web::Data<AuthzService>,
    user: AuthUser,
    request: web::Json<CreateRoleRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = authz.require(&user, RESOURCE, PermissionAction::Post).await {
        return Ok(e.error_response());
    }
    match authz.create_role(request.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": data
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/admin/roles/{id}",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "角色 ID")
    ),
    request_body = UpdateRoleRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "更新成功", body = RoleResponse)
    )
)]
pub async fn update_role(
    authz: web::Data<AuthzService>,
    user: AuthUser,
    path: web::Path<i64>,
    request: web::Json<UpdateRoleRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = authz.require(&user, RESOURCE, PermissionAction::Put).await {
        return Ok(e.error_response());
    }
    match authz.update_role(path.into_inner(), request.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": data
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/admin/roles/{id}",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "角色 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "删除成功"),
        (status = 400, description = "系统角色或仍在使用")
    )
)]
pub async fn delete_role(
    authz: web::Data<AuthzService>,
    user: AuthUser,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    if let Err(e) = authz.require(&user, RESOURCE, PermissionAction::Delete).await {
        return Ok(e.error_response());
    }
    match authz.delete_role(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": null
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/permissions",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "可授权的资源与操作", body = PermissionCatalogResponse)
    )
)]
pub async fn list_permissions(authz: web::Data<AuthzService>, user: AuthUser) -> Result<HttpResponse> {
    if let Err(e) = authz.require(&user, "permissions", PermissionAction::Get).await {
        return Ok(e.error_response());
    }
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": authz.catalog()
    })))
}

pub fn role_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/roles")
            .route("", web::get().to(list_roles))
            .route("", web::post().to(create_role))
            .route("/{id}", web::get().to(get_role))
            .route("/{id}", web::put().to(update_role))
            .route("/{id}", web::delete().to(delete_role)),
    )
    .route("/permissions", web::get().to(list_permissions));
}
