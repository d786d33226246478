use crate::models::*;
use crate::services::{AuthUser, AuthzService, NotificationService, PermissionAction};
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/admin/notifications",
    tag = "admin",
    request_body = CreateNotificationRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "发送成功", body = AffectedResponse)
    )
)]
pub async fn broadcast_notification(
    authz: web::Data<AuthzService>,
    notification_service: web::Data<NotificationService>,
    user: AuthUser,
    request: web::Json<CreateNotificationRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = authz
        .require(&user, "notifications", PermissionAction::Post)
        .await
    {
        return Ok(e.error_response());
    }
    match notification_service.broadcast(request.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": data
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn notification_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/notifications", web::post().to(broadcast_notification));
}
