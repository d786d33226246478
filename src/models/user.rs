use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::entities::user_entity;
pub use crate::entities::users::UserStatus;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role_id: i64,
    pub status: UserStatus,
    /// 积分余额
    pub balance: i64,
    /// 草稿 TON 余额（nano）
    pub ton_balance: i64,
    pub referral_code: String,
    pub referrer_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<user_entity::Model> for UserResponse {
    fn from(m: user_entity::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            email: m.email,
            role_id: m.role_id,
            status: m.status,
            balance: m.balance,
            ton_balance: m.ton_balance,
            referral_code: m.referral_code,
            referrer_id: m.referrer_id,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateMeRequest {
    #[schema(example = "Alice")]
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub name: Option<String>,
    pub email: String,
    pub password: String,
    pub role_id: i64,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    /// 仅在提供时重新哈希
    pub password: Option<String>,
    pub role_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserFilter {
    /// 按邮箱或名称模糊查询
    pub search: Option<String>,
    pub status: Option<UserStatus>,
    pub role_id: Option<i64>,
}

/// 被推荐用户
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReferralResponse {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}
