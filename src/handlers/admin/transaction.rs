use crate::models::*;
use crate::services::{AuthUser, AuthzService, LedgerService, PermissionAction};
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/admin/user-transactions",
    tag = "admin",
    params(ListQuery, TransactionFilter),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "所有用户流水", body = [UserTransaction])
    )
)]
pub async fn list_all_transactions(
    authz: web::Data<AuthzService>,
    ledger: web::Data<LedgerService>,
    user: AuthUser,
    query: web::Query<ListQuery>,
    filter: web::Query<TransactionFilter>,
) -> Result<HttpResponse> {
    if let Err(e) = authz
        .require(&user, "user-transactions", PermissionAction::Get)
        .await
    {
        return Ok(e.error_response());
    }
    match ledger.list_all(&query, &filter).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": data
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn transaction_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/user-transactions", web::get().to(list_all_transactions));
}
