use crate::middlewares::request_origin;
use crate::models::*;
use crate::services::{AuthUser, WheelService};
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/wheels",
    tag = "wheel",
    params(LocaleQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "当前转盘与奖品（不含概率）", body = WheelResponse),
        (status = 404, description = "转盘不存在")
    )
)]
pub async fn get_wheel(
    wheel_service: web::Data<WheelService>,
    user: AuthUser,
    query: web::Query<LocaleQuery>,
) -> Result<HttpResponse> {
    match wheel_service.get_wheel(user.id, query.locale.as_deref()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": data
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/wheels/tickets/count",
    tag = "wheel",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "可用抽奖券数量", body = CountTicketResponse)
    )
)]
pub async fn count_tickets(wheel_service: web::Data<WheelService>, user: AuthUser) -> Result<HttpResponse> {
    match wheel_service.count_tickets(user.id).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": data
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/wheels/buy-tickets",
    tag = "wheel",
    request_body = BuyTicketRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "购买成功", body = BuyTicketResponse),
        (status = 400, description = "余额不足或超过每日上限")
    )
)]
pub async fn buy_tickets(
    wheel_service: web::Data<WheelService>,
    user: AuthUser,
    req: HttpRequest,
    request: web::Json<BuyTicketRequest>,
) -> Result<HttpResponse> {
    match wheel_service
        .buy_tickets(user.id, request.quantity, request_origin(&req))
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
    path = "/wheels/play",
    tag = "wheel",
    params(LocaleQuery),
    request_body = PlayRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "抽奖结果", body = PlayResponse),
        (status = 400, description = "抽奖券不足")
    )
)]
pub async fn play(
    wheel_service: web::Data<WheelService>,
    user: AuthUser,
    query: web::Query<LocaleQuery>,
    request: Option<web::Json<PlayRequest>>,
) -> Result<HttpResponse> {
    let spin_count = request.and_then(|r| r.spin_count);
    match wheel_service
        .play(user.id, spin_count, query.locale.as_deref())
        .await
    {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": data
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn wheel_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/wheels")
            .route("", web::get().to(get_wheel))
            .route("/tickets/count", web::get().to(count_tickets))
            .route("/buy-tickets", web::post().to(buy_tickets))
            .route("/play", web::post().to(play)),
    );
}
