use crate::database::DbPool;
use crate::entities::{role_entity as roles, user_entity as users};
use crate::error::{AppError, AppResult};
use crate::models::{
    AuthResponse, LoginRequest, RegisterRequest, RoleType, UserResponse, UserStatus,
};
use crate::services::ReferralService;
use crate::utils::{
    JwtService, generate_unique_referral_code, hash_password, validate_password, verify_password,
};
use regex::Regex;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

/// 统一小写并去除首尾空白后校验邮箱格式
pub fn normalize_email(email: &str) -> AppResult<String> {
    let email = email.trim().to_lowercase();
    let re = Regex::new(r"^[a-z0-9._%+\-]+@[a-z0-9.\-]+\.[a-z]{2,}$")
        .map_err(|e| AppError::InternalError(e.to_string()))?;
    if email.len() > 254 || !re.is_match(&email) {
        return Err(AppError::ValidationError("Email is invalid".to_string()));
    }
    Ok(email)
}

/// 未填写名称时取邮箱 @ 前部分
fn display_name(name: Option<&str>, email: &str) -> String {
    match name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(n) => n.chars().take(100).collect(),
        None => email.split('@').next().unwrap_or(email).to_string(),
    }
}

#[derive(Clone)]
pub struct AuthService {
    pool: DbPool,
    jwt_service: JwtService,
    referrals: ReferralService,
}

impl AuthService {
    pub fn new(pool: DbPool, jwt_service: JwtService, referrals: ReferralService) -> Self {
        Self {
            pool,
            jwt_service,
            referrals,
        }
    }

    fn issue(&self, user: users::Model) -> AppResult<AuthResponse> {
        Ok(AuthResponse {
            access_token: self.jwt_service.generate_access_token(user.id, user.role_id)?,
            refresh_token: self.jwt_service.generate_refresh_token(user.id, user.role_id)?,
            expires_in: self.jwt_service.get_access_token_expires_in(),
            user: UserResponse::from(user),
        })
    }

    /// 默认 USER 角色
    pub async fn default_role<C: ConnectionTrait>(conn: &C, role_type: RoleType) -> AppResult<roles::Model> {
        roles::Entity::find()
            .filter(roles::Column::RoleType.eq(role_type))
            .filter(roles::Column::DeletedAt.is_null())
            .order_by_asc(roles::Column::Id)
            .one(conn)
            .await?
            .ok_or_else(|| AppError::ConfigError(format!("No {role_type:?} role is configured")))
    }

    /// 注册
    ///
    /// 邮箱唯一；携带推荐码时在同一事务内记录推荐关系并发放奖励。
    pub async fn register(&self, request: RegisterRequest) -> AppResult<AuthResponse> {
        let email = normalize_email(&request.email)?;
        validate_password(&request.password)?;

        let existing = users::Entity::find()
            .filter(users::Column::Email.eq(email.as_str()))
            .count(self.pool.as_ref())
            .await?;
        if existing > 0 {
            return Err(AppError::ValidationError("Email is already registered".to_string()));
        }

        let password_hash = hash_password(&request.password)?;

        let txn = self.pool.begin().await?;
        let referrer = match request.referral_code.as_deref().map(str::trim) {
            Some(code) if !code.is_empty() => Some(ReferralService::find_referrer(&txn, code).await?),
            _ => None,
        };
        let role = Self::default_role(&txn, RoleType::User).await?;
        let referral_code = generate_unique_referral_code(&txn).await?;

        let user = users::ActiveModel {
            name: Set(display_name(request.name.as_deref(), &email)),
            email: Set(email),
            password_hash: Set(password_hash),
            role_id: Set(role.id),
            status: Set(UserStatus::Active),
            balance: Set(0),
            ton_balance: Set(0),
            referral_code: Set(referral_code),
            referrer_id: Set(referrer.as_ref().map(|r| r.id)),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        if let Some(referrer) = &referrer {
            self.referrals.apply(&txn, referrer.id, user.id).await?;
        }
        txn.commit().await?;

        // 推荐奖励会改变余额，重新读取
        let user = users::Entity::find_by_id(user.id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        log::info!("User {} registered", user.id);
        self.issue(user)
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        let email = request.email.trim().to_lowercase();
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email.as_str()))
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::AuthError("Invalid email or password".to_string()))?;

        if !verify_password(&request.password, &user.password_hash)? {
            return Err(AppError::AuthError("Invalid email or password".to_string()));
        }
        if user.is_blocked() {
            return Err(AppError::Forbidden);
        }

        self.issue(user)
    }

    /// 刷新令牌：重新签发一对新令牌
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<AuthResponse> {
        let claims = self.jwt_service.verify_refresh_token(refresh_token)?;
        let user = users::Entity::find_by_id(claims.user_id()?)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::AuthError("Invalid token".to_string()))?;

        if user.is_blocked() {
            return Err(AppError::Forbidden);
        }

        self.issue(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Alice@Example.COM ").unwrap(), "alice@example.com");
        assert!(normalize_email("alice@example").is_err());
        assert!(normalize_email("alice.example.com").is_err());
        assert!(normalize_email("").is_err());
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        assert_eq!(display_name(Some(" Bob "), "alice@example.com"), "Bob");
        assert_eq!(display_name(Some("   "), "alice@example.com"), "alice");
        assert_eq!(display_name(None, "alice@example.com"), "alice");
    }
}
