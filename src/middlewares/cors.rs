use actix_cors::Cors;

/// 前端部署在多个域名下，来源不做限制
pub fn create_cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allow_any_header()
        .expose_headers(vec!["Content-Type"])
        .max_age(3600)
}
