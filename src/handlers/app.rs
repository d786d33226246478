use crate::middlewares::request_origin;
use crate::models::*;
use crate::services::{AppService, AuthUser};
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/apps",
    tag = "app",
    params(ListQuery, AppFilter),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "已上架应用", body = [AppResponse])
    )
)]
pub async fn list_apps(
    app_service: web::Data<AppService>,
    user: AuthUser,
    query: web::Query<ListQuery>,
    filter: web::Query<AppFilter>,
) -> Result<HttpResponse> {
    match app_service.list(user.id, &query, &filter).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": data
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/apps/{id_or_slug}",
    tag = "app",
    params(
        ("id_or_slug" = String, Path, description = "应用 ID 或 slug"),
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
    app_service: web::Data<AppService>,
    user: AuthUser,
    path: web::Path<String>,
    query: web::Query<LocaleQuery>,
) -> Result<HttpResponse> {
    match app_service.get(user.id, &path, query.locale.as_deref()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": data
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/apps/{id_or_slug}/open",
    tag = "app",
    params(
        ("id_or_slug" = String, Path, description = "应用 ID 或 slug")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "打开应用，首次打开发放奖励", body = OpenAppResponse),
        (status = 404, description = "应用不存在")
    )
)]
pub async fn open_app(
    app_service: web::Data<AppService>,
    user: AuthUser,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match app_service.open(user.id, &path, request_origin(&req)).await {
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
            .route("/{id_or_slug}", web::get().to(get_app))
            .route("/{id_or_slug}/open", web::post().to(open_app)),
    );
}
