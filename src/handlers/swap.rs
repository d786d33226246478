use crate::middlewares::request_origin;
use crate::models::*;
use crate::services::{AuthUser, SwapService};
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/swaps",
    tag = "swap",
    request_body = CreateSwapRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "兑换已创建并签名", body = SwapSignatureResponse),
        (status = 400, description = "金额、地址或每日次数不合法")
    )
)]
pub async fn create_swap(
    swap_service: web::Data<SwapService>,
    user: AuthUser,
    req: HttpRequest,
    request: web::Json<CreateSwapRequest>,
) -> Result<HttpResponse> {
    match swap_service
        .create_swap(user.id, request.into_inner(), request_origin(&req))
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
    path = "/swaps/after-swap",
    tag = "swap",
    request_body = AfterSwapRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "boc 是否已附加", body = AfterSwapResponse)
    )
)]
pub async fn after_swap(
    swap_service: web::Data<SwapService>,
    user: AuthUser,
    request: web::Json<AfterSwapRequest>,
) -> Result<HttpResponse> {
    match swap_service.after_swap(user.id, request.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": data
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/swaps/{id}/resign",
    tag = "swap",
    params(
        ("id" = i64, Path, description = "兑换 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "重新签名成功", body = SwapSignatureResponse),
        (status = 400, description = "已提交上链或已结束"),
        (status = 404, description = "兑换不存在")
    )
)]
pub async fn resign(
    swap_service: web::Data<SwapService>,
    user: AuthUser,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match swap_service.resign(user.id, path.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": data
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/swaps",
    tag = "swap",
    params(ListQuery, SwapFilter),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "当前用户的兑换记录", body = [UserSwap])
    )
)]
pub async fn list_swaps(
    swap_service: web::Data<SwapService>,
    user: AuthUser,
    query: web::Query<ListQuery>,
    filter: web::Query<SwapFilter>,
) -> Result<HttpResponse> {
    match swap_service.list_own(user.id, &query, &filter).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": data
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn swap_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/swaps")
            .route("", web::get().to(list_swaps))
            .route("", web::post().to(create_swap))
            .route("/after-swap", web::post().to(after_swap))
            .route("/{id}/resign", web::post().to(resign)),
    );
}
