use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::UserResponse;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[schema(example = "Password123")]
    pub password: String,
    #[schema(example = "Alice")]
    pub name: Option<String>,
    /// 推荐人的推荐码
    #[schema(example = "K7M2QX9A")]
    pub referral_code: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[schema(example = "Password123")]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// access token 有效期（秒）
    pub expires_in: i64,
    pub user: UserResponse,
}
