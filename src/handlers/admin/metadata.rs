use crate::models::*;
use crate::services::{AuthUser, AuthzService, MetadataService, PermissionAction};
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

const RESOURCE: &str = "metadata";

#[utoipa::path(
    get,
    path = "/admin/metadata",
    tag = "admin",
    params(MetadataFilter),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "全部配置项", body = [Metadata])
    )
)]
pub async fn list_metadata(
    authz: web::Data<AuthzService>,
    metadata_service: web::Data<MetadataService>,
    user: AuthUser,
    filter: web::Query<MetadataFilter>,
) -> Result<HttpResponse> {
    if let Err(e) = authz.require(&user, RESOURCE, PermissionAction::Get).await {
        return Ok(e.error_response());
    }
    match metadata_service.list(&filter).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": data
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/admin/metadata/{key}",
    tag = "admin",
    params(
        ("key" = String, Path, description = "配置键，例如 rate / fee / expire")
    ),
    request_body = UpdateMetadataRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "更新成功", body = Metadata),
        (status = 400, description = "配置值不合法"),
        (status = 404, description = "配置项不存在")
    )
)]
pub async fn update_metadata(
    authz: web::Data<AuthzService>,
    metadata_service: web::Data<MetadataService>,
    user: AuthUser,
    path: web::Path<String>,
    request: web::Json<UpdateMetadataRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = authz.require(&user, RESOURCE, PermissionAction::Put).await {
        return Ok(e.error_response());
    }
    match metadata_service
        .update(&path.into_inner(), request.into_inner())
        .await
    {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": data
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn metadata_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/metadata")
            .route("", web::get().to(list_metadata))
            .route("/{key}", web::put().to(update_metadata)),
    );
}
