use crate::models::*;
use crate::services::{AuthUser, AuthzService, PermissionAction, SwapService};
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

const RESOURCE: &str = "swaps";

#[utoipa::path(
    get,
    path = "/admin/swaps",
    tag = "admin",
    params(ListQuery, SwapFilter),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "兑换记录", body = [UserSwap])
    )
)]
pub async fn list_swaps(
    authz: web::Data<AuthzService>,
    swap_service: web::Data<SwapService>,
    user: AuthUser,
    query: web::Query<ListQuery>,
    filter: web::Query<SwapFilter>,
) -> Result<HttpResponse> {
    if let Err(e) = authz.require(&user, RESOURCE, PermissionAction::Get).await {
        return Ok(e.error_response());
    }
    match swap_service.admin_list(&query, &filter).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": data
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 手动回滚待确认的兑换并退还积分
#[utoipa::path(
    put,
    path = "/admin/swaps/{id}/rollback",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "兑换 ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "已回滚", body = UserSwap),
        (status = 400, description = "兑换状态不是 PENDING")
    )
)]
pub async fn rollback_swap(
    authz: web::Data<AuthzService>,
    swap_service: web::Data<SwapService>,
    user: AuthUser,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    if let Err(e) = authz.require(&user, RESOURCE, PermissionAction::Put).await {
        return Ok(e.error_response());
    }
    match swap_service.rollback(path.into_inner()).await {
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
            .route("/{id}/rollback", web::put().to(rollback_swap)),
    );
}
