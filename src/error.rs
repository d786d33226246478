use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Auth error: {0}")]
    AuthError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Permission denied")]
    PermissionDenied,

    #[error("External API error: {0}")]
    ExternalApiError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("HTTP request error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}

impl ResponseError for AppError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::AuthError(_) | AppError::JwtError(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden | AppError::PermissionDenied => StatusCode::FORBIDDEN,
            AppError::ExternalApiError(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let (error_code, message) = match self {
            AppError::ValidationError(msg) => {
                log::warn!("Validation error: {msg}");
                ("VALIDATION_ERROR", msg.clone())
            }
            AppError::AuthError(msg) => {
                log::warn!("Authentication error: {msg}");
                ("AUTH_ERROR", msg.clone())
            }
            AppError::JwtError(err) => {
                log::warn!("JWT error: {err}");
                ("AUTH_ERROR", "Invalid token".to_string())
            }
            AppError::NotFound(msg) => ("NOT_FOUND", msg.clone()),
            AppError::Forbidden => {
                log::warn!("Forbidden access");
                ("FORBIDDEN", "Forbidden".to_string())
            }
            AppError::PermissionDenied => {
                log::warn!("Permission denied");
                ("FORBIDDEN", "Permission denied".to_string())
            }
            AppError::ExternalApiError(msg) => {
                log::error!("External API error: {msg}");
                ("EXTERNAL_API_ERROR", msg.clone())
            }
            AppError::DatabaseError(err) => {
                log::error!("Database error: {err}");
                ("DATABASE_ERROR", "Database error".to_string())
            }
            _ => {
                log::error!("Internal error: {self}");
                ("INTERNAL_ERROR", "Internal server error".to_string())
            }
        };

        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "error": {
                "code": error_code,
                "message": message
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use actix_web::http::StatusCode;

    #[actix_web::test]
    async fn test_validation_error_envelope() {
        let resp = AppError::ValidationError("bad rate".into()).error_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(resp.into_body()).await.unwrap();
        let v: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(v["success"], false);
        assert_eq!(v["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(v["error"]["message"], "bad rate");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::AuthError("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(AppError::PermissionDenied.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::InternalError("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
