use crate::error::AppError;
use crate::services::{AuthUser, AuthzService};
use crate::utils::JwtService;
use actix_web::http::Method;
use actix_web::{
    Error, FromRequest, HttpMessage, HttpRequest,
    dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};

// 公开路径配置
struct PublicPaths {
    exact_paths: Vec<&'static str>,
    prefix_paths: Vec<&'static str>,
}

impl PublicPaths {
    fn new() -> Self {
        Self {
            // 完全匹配的公开路径
            exact_paths: vec!["/swagger-ui", "/swagger-ui/", "/api-docs/openapi.json"],
            // 前缀匹配的公开路径；/auth/refresh 以请求体中的 refresh_token 作为凭证
            prefix_paths: vec![
                "/swagger-ui/",
                "/api-docs/",
                "/api/v1/auth/",
                "/api/v1/metadata/",
            ],
        }
    }

    fn is_public_path(&self, path: &str) -> bool {
        if self.exact_paths.contains(&path) {
            return true;
        }

        self.prefix_paths
            .iter()
            .any(|&prefix| path.starts_with(prefix))
    }
}

fn bearer_token(req: &ServiceRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

pub struct AuthMiddleware {
    jwt_service: JwtService,
    authz: AuthzService,
}

impl AuthMiddleware {
    pub fn new(jwt_service: JwtService, authz: AuthzService) -> Self {
        Self { jwt_service, authz }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            jwt_service: self.jwt_service.clone(),
            authz: self.authz.clone(),
            public_paths: PublicPaths::new(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    jwt_service: JwtService,
    authz: AuthzService,
    public_paths: PublicPaths,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // 放行所有 CORS 预检请求
        if req.method() == Method::OPTIONS || self.public_paths.is_public_path(req.path()) {
            return Box::pin(self.service.call(req));
        }

        let Some(token) = bearer_token(&req) else {
            let error = AppError::AuthError("Missing access token".to_string());
            return Box::pin(async move { Err(error.into()) });
        };

        let user = self
            .jwt_service
            .verify_access_token(token)
            .map_err(|_| AppError::AuthError("Invalid access token".to_string()))
            .and_then(|claims| {
                Ok(AuthUser {
                    id: claims.user_id()?,
                    role_id: claims.role_id,
                })
            });

        match user {
            Ok(user) if self.authz.is_banned(user.id) => {
                log::warn!("Rejected request from banned user {}", user.id);
                Box::pin(async move { Err(AppError::Forbidden.into()) })
            }
            Ok(user) => {
                req.extensions_mut().insert(user);
                Box::pin(self.service.call(req))
            }
            Err(error) => Box::pin(async move { Err(error.into()) }),
        }
    }
}

/// 从请求扩展中取出当前用户，未经过认证时返回 401
impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthUser>()
                .copied()
                .ok_or_else(|| AppError::AuthError("Unauthorized".to_string())),
        )
    }
}

/// 请求来源（Origin 头），写入账本流水
pub fn request_origin(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get("Origin")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.chars().take(255).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_paths() {
        let paths = PublicPaths::new();
        assert!(paths.is_public_path("/swagger-ui/"));
        assert!(paths.is_public_path("/api-docs/openapi.json"));
        assert!(paths.is_public_path("/api/v1/auth/login"));
        assert!(paths.is_public_path("/api/v1/metadata/swap/rate"));
        assert!(paths.is_public_path("/api/v1/auth/refresh"));
        assert!(!paths.is_public_path("/api/v1/wheels"));
        assert!(!paths.is_public_path("/api/v1/admin/users"));
    }
}
