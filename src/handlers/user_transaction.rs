use crate::models::*;
use crate::services::{AuthUser, LedgerService};
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/user-transactions",
    tag = "user-transaction",
    params(ListQuery, TransactionFilter),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "当前用户的流水", body = [UserTransaction])
    )
)]
pub async fn list_transactions(
    ledger: web::Data<LedgerService>,
    user: AuthUser,
    query: web::Query<ListQuery>,
    filter: web::Query<TransactionFilter>,
) -> Result<HttpResponse> {
    match ledger.list_for_user(user.id, &query, &filter).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": data
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/user-transactions/total-earn",
    tag = "user-transaction",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "累计获得积分", body = TotalEarnResponse)
    )
)]
pub async fn total_earn(ledger: web::Data<LedgerService>, user: AuthUser) -> Result<HttpResponse> {
    match ledger.total_earn(user.id).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": data
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn user_transaction_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/user-transactions")
            .route("", web::get().to(list_transactions))
            .route("/total-earn", web::get().to(total_earn)),
    );
}
