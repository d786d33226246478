use crate::models::*;
use crate::services::{AuthUser, NotificationService};
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/notifications",
    tag = "notification",
    params(ListQuery, NotificationFilter),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "通知列表（不含已删除）", body = [Notification])
    )
)]
pub async fn list_notifications(
    notification_service: web::Data<NotificationService>,
    user: AuthUser,
    query: web::Query<ListQuery>,
    filter: web::Query<NotificationFilter>,
) -> Result<HttpResponse> {
    match notification_service.list(user.id, &query, &filter).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": data
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/notifications/unread-count",
    tag = "notification",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "未读数量", body = UnreadCountResponse)
    )
)]
pub async fn unread_count(
    notification_service: web::Data<NotificationService>,
    user: AuthUser,
) -> Result<HttpResponse> {
    match notification_service.unread_count(user.id).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": data
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/notifications/read",
    tag = "notification",
    request_body = IdsRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "标记已读", body = AffectedResponse)
    )
)]
pub async fn mark_read(
    notification_service: web::Data<NotificationService>,
    user: AuthUser,
    request: web::Json<IdsRequest>,
) -> Result<HttpResponse> {
    match notification_service.mark_read(user.id, &request.ids).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": data
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/notifications/read-all",
    tag = "notification",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "全部标记已读", body = AffectedResponse)
    )
)]
pub async fn mark_all_read(
    notification_service: web::Data<NotificationService>,
    user: AuthUser,
) -> Result<HttpResponse> {
    match notification_service.mark_all_read(user.id).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": data
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/notifications/{id}",
    tag = "notification",
    params(
        ("id" = i64, Path, description = "通知 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "删除成功"),
        (status = 404, description = "通知不存在")
    )
)]
pub async fn delete_notification(
    notification_service: web::Data<NotificationService>,
    user: AuthUser,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match notification_service.delete(user.id, path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": null
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn notification_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/notifications")
            .route("", web::get().to(list_notifications))
            .route("/unread-count", web::get().to(unread_count))
            .route("/read", web::put().to(mark_read))
            .route("/read-all", web::put().to(mark_all_read))
            .route("/{id}", web::delete().to(delete_notification)),
    );
}
