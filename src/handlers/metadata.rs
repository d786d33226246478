use crate::models::*;
use crate::services::MetadataService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/metadata/swap/{key}",
    tag = "metadata",
    params(
        ("key" = String, Path, description = "rate | fee | min-amount | max-amount | expire")
    ),
    responses(
        (status = 200, description = "兑换配置", body = Metadata),
        (status = 404, description = "配置不存在")
    )
)]
pub async fn get_swap_setting(
    metadata_service: web::Data<MetadataService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match metadata_service.get_swap(&path).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": data
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn metadata_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/metadata/swap/{key}", web::get().to(get_swap_setting));
}
