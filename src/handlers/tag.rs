use crate::models::*;
use crate::services::TagService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/tags",
    tag = "tag",
    params(ListQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "标签列表", body = [TagResponse])
    )
)]
pub async fn list_tags(
    tag_service: web::Data<TagService>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse> {
    match tag_service.list(&query).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": data
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/tags/{id_or_slug}",
    tag = "tag",
    params(
        ("id_or_slug" = String, Path, description = "标签 ID 或 slug"),
        LocaleQuery
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "标签详情", body = TagResponse),
        (status = 404, description = "标签不存在")
    )
)]
pub async fn get_tag(
    tag_service: web::Data<TagService>,
    path: web::Path<String>,
    query: web::Query<LocaleQuery>,
) -> Result<HttpResponse> {
    match tag_service.get(&path, query.locale.as_deref()).await {
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
            .route("", web::get().to(list_tags))
            .route("/{id_or_slug}", web::get().to(get_tag)),
    );
}
