use crate::models::*;
use crate::services::{AuthUser, AuthzService, PermissionAction, TicketService};
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

const RESOURCE: &str = "user-wheel-tickets";

#[utoipa::path(
    get,
    path = "/admin/user-wheel-tickets",
    tag = "admin",
    params(ListQuery, TicketFilter),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "可用抽奖券", body = [UserWheelTicket])
    )
)]
pub async fn list_tickets(
    authz: web::Data<AuthzService>,
    ticket_service: web::Data<TicketService>,
    user: AuthUser,
    query: web::Query<ListQuery>,
    filter: web::Query<TicketFilter>,
) -> Result<HttpResponse> {
    if let Err(e) = authz.require(&user, RESOURCE, PermissionAction::Get).await {
        return Ok(e.error_response());
    }
    match ticket_service.admin_list(&query, &filter).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": data
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/user-wheel-tickets",
    tag = "admin",
    request_body = GrantTicketsRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "发放成功", body = [UserWheelTicket]),
        (status = 404, description = "用户不存在")
    )
)]
pub async fn grant_tickets(
    authz: web::Data<AuthzService>,
    ticket_service: web::Data<TicketService>,
    user: AuthUser,
    request: web::Json<GrantTicketsRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = authz.require(&user, RESOURCE, PermissionAction::Post).await {
        return Ok(e.error_response());
    }
    match ticket_service.grant(request.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": data
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/admin/user-wheel-tickets/{id}",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "抽奖券 ID")
    ),
    request_body = UpdateTicketStatusRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "状态已更新", body = UserWheelTicket),
        (status = 400, description = "不允许的状态变更")
    )
)]
pub async fn update_ticket_status(
    authz: web::Data<AuthzService>,
    ticket_service: web::Data<TicketService>,
    user: AuthUser,
    path: web::Path<i64>,
    request: web::Json<UpdateTicketStatusRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = authz.require(&user, RESOURCE, PermissionAction::Put).await {
        return Ok(e.error_response());
    }
    match ticket_service
        .set_status(path.into_inner(), request.status)
        .await
    {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": data
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn ticket_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/user-wheel-tickets")
            .route("", web::get().to(list_tickets))
            .route("", web::post().to(grant_tickets))
            .route("/{id}", web::put().to(update_ticket_status)),
    );
}
