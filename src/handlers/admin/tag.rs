use crate::models::*;
use crate::services::{AuthUser, AuthzService, PermissionAction, TagService};
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

const RESOURCE: &str = "tags";

#[utoipa::path(
    post,
    path = "/admin/tags",
    tag = "admin",
    params(LocaleQuery),
    request_body = CreateTagRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "创建成功", body = TagResponse),
        (status = 400, description = "名称或描述过长")
    )
)]
pub async fn create_tag(
    authz: web::Data<AuthzService>,
    tag_service: web::Data<TagService>,
    user: AuthUser,
    locale: web::Query<LocaleQuery>,
    request: web::Json<CreateTagRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = authz.require(&user, RESOURCE, PermissionAction::Post).await {
        return Ok(e.error_response());
    }
    match tag_service
        .create(user.id, request.into_inner(), locale.locale.as_deref())
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
    path = "/admin/tags/{id}",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "标签 ID"),
        LocaleQuery
    ),
    request_body = UpdateTagRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "更新成功", body = TagResponse),
        (status = 404, description = "标签不存在")
    )
)]
pub async fn update_tag(
    authz: web::Data<AuthzService>,
    tag_service: web::Data<TagService>,
    user: AuthUser,
    path: web::Path<i64>,
    locale: web::Query<LocaleQuery>,
    request: web::Json<UpdateTagRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = authz.require(&user, RESOURCE, PermissionAction::Put).await {
        return Ok(e.error_response());
    }
    match tag_service
        .update(
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
    path = "/admin/tags",
    tag = "admin",
    request_body = IdsRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "删除成功", body = AffectedResponse)
    )
)]
pub async fn delete_tags(
    authz: web::Data<AuthzService>,
    tag_service: web::Data<TagService>,
    user: AuthUser,
    request: web::Json<IdsRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = authz.require(&user, RESOURCE, PermissionAction::Delete).await {
        return Ok(e.error_response());
    }
    match tag_service.delete_many(&request.ids).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": data
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn tag_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/tags")
            .route("", web::post().to(create_tag))
            .route("", web::delete().to(delete_tags))
            .route("/{id}", web::put().to(update_tag)),
    );
}
