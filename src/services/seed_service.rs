use crate::config::SeedConfig;
use crate::entities::user_entity as users;
use crate::error::AppResult;
use crate::models::{RoleType, UserStatus};
use crate::services::AuthService;
use crate::utils::{generate_unique_referral_code, hash_password, validate_password};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

/// 启动时创建超级管理员（已存在则跳过）
pub async fn seed_super_admin(pool: &DatabaseConnection, seed: &SeedConfig) -> AppResult<bool> {
    let email = seed.admin_email.trim().to_lowercase();
    if email.is_empty() || seed.admin_password.is_empty() {
        log::warn!("Seed admin credentials are not configured, skipping");
        return Ok(false);
    }

    let exists = users::Entity::find()
        .filter(users::Column::Email.eq(email.as_str()))
        .one(pool)
        .await?;
    if exists.is_some() {
        log::info!("Super admin {email} already exists");
        return Ok(false);
    }

    validate_password(&seed.admin_password)?;
    let role = AuthService::default_role(pool, RoleType::SuperAdmin).await?;

    let user = users::ActiveModel {
        name: Set("Super Admin".to_string()),
        email: Set(email),
        password_hash: Set(hash_password(&seed.admin_password)?),
        role_id: Set(role.id),
        status: Set(UserStatus::Active),
        balance: Set(0),
        ton_balance: Set(0),
        referral_code: Set(generate_unique_referral_code(pool).await?),
        ..Default::default()
    }
    .insert(pool)
    .await?;

    log::info!("Seeded super admin user {}", user.id);
    Ok(true)
}
