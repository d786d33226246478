use crate::models::*;
use crate::services::{AuthUser, TicketService};
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/user-wheel-tickets",
    tag = "ticket",
    params(ListQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "当前用户未使用的抽奖券", body = [UserWheelTicket])
    )
)]
pub async fn list_tickets(
    ticket_service: web::Data<TicketService>,
    user: AuthUser,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse> {
    match ticket_service.list_own(user.id, &query).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": data
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn ticket_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/user-wheel-tickets", web::get().to(list_tickets));
}
