use crate::database::DbPool;
use crate::entities::{role_entity as roles, user_entity as users};
use crate::error::{AppError, AppResult};
use crate::models::{
    AffectedResponse, CreateUserRequest, ListQuery, PaginatedResponse, UpdateMeRequest,
    UpdateUserRequest, UserFilter, UserResponse, UserStatus,
};
use crate::services::{AuthzService, normalize_email};
use crate::utils::{
    generate_unique_referral_code, hash_password, paginate_select, resolve_sort,
    validate_password,
};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, Set,
};

const SORTABLE: &[(&str, users::Column)] = &[
    ("created_at", users::Column::CreatedAt),
    ("name", users::Column::Name),
    ("email", users::Column::Email),
    ("balance", users::Column::Balance),
    ("ton_balance", users::Column::TonBalance),
];

fn validate_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > 100 {
        return Err(AppError::ValidationError(
            "Name must be between 1 and 100 characters".to_string(),
        ));
    }
    Ok(name.to_string())
}

#[derive(Clone)]
pub struct UserService {
    pool: DbPool,
    authz: AuthzService,
}

impl UserService {
    pub fn new(pool: DbPool, authz: AuthzService) -> Self {
        Self { pool, authz }
    }

    async fn find_active(&self, user_id: i64) -> AppResult<users::Model> {
        users::Entity::find_by_id(user_id)
            .filter(users::Column::DeletedAt.is_null())
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub async fn get_me(&self, user_id: i64) -> AppResult<UserResponse> {
        Ok(self.find_active(user_id).await?.into())
    }

    /// 用户只能修改自己的名称
    pub async fn update_me(&self, user_id: i64, req: UpdateMeRequest) -> AppResult<UserResponse> {
        let name = validate_name(&req.name)?;
        let user = self.find_active(user_id).await?;
        let mut am = user.into_active_model();
        am.name = Set(name);
        am.updated_at = Set(Utc::now());
        Ok(am.update(self.pool.as_ref()).await?.into())
    }

    // -----------------------------
    // 管理端
    // -----------------------------

    pub async fn admin_list(
        &self,
        query: &ListQuery,
        filter: &UserFilter,
    ) -> AppResult<PaginatedResponse<UserResponse>> {
        let mut select = users::Entity::find().filter(users::Column::DeletedAt.is_null());
        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            select = select.filter(
                Condition::any()
                    .add(users::Column::Email.contains(search))
                    .add(users::Column::Name.contains(search)),
            );
        }
        if let Some(status) = filter.status {
            select = select.filter(users::Column::Status.eq(status));
        }
        if let Some(role_id) = filter.role_id {
            select = select.filter(users::Column::RoleId.eq(role_id));
        }
        let sort = resolve_sort(query.sort_by.as_deref(), SORTABLE, users::Column::CreatedAt);
        Ok(paginate_select(self.pool.as_ref(), select, query, sort)
            .await?
            .map(UserResponse::from))
    }

    pub async fn admin_get(&self, id: i64) -> AppResult<UserResponse> {
        self.get_me(id).await
    }

    async fn ensure_role(&self, role_id: i64) -> AppResult<()> {
        roles::Entity::find_by_id(role_id)
            .filter(roles::Column::DeletedAt.is_null())
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::ValidationError(format!("Role {role_id} does not exist")))?;
        Ok(())
    }

    async fn ensure_email_free(&self, email: &str, except: Option<i64>) -> AppResult<()> {
        let mut select = users::Entity::find().filter(users::Column::Email.eq(email));
        if let Some(id) = except {
            select = select.filter(users::Column::Id.ne(id));
        }
        if select.count(self.pool.as_ref()).await? > 0 {
            return Err(AppError::ValidationError("Email is already registered".to_string()));
        }
        Ok(())
    }

    pub async fn admin_create(&self, req: CreateUserRequest) -> AppResult<UserResponse> {
        let email = normalize_email(&req.email)?;
        validate_password(&req.password)?;
        self.ensure_role(req.role_id).await?;
        self.ensure_email_free(&email, None).await?;

        let name = match req.name.as_deref() {
            Some(n) => validate_name(n)?,
            None => email.split('@').next().unwrap_or_default().to_string(),
        };

        let user = users::ActiveModel {
            name: Set(name),
            email: Set(email),
            password_hash: Set(hash_password(&req.password)?),
            role_id: Set(req.role_id),
            status: Set(UserStatus::Active),
            balance: Set(0),
            ton_balance: Set(0),
            referral_code: Set(generate_unique_referral_code(self.pool.as_ref()).await?),
            ..Default::default()
        }
        .insert(self.pool.as_ref())
        .await?;

        log::info!("Admin created user {}", user.id);
        Ok(user.into())
    }

    /// 仅在提供 password 时重新哈希
    pub async fn admin_update(&self, id: i64, req: UpdateUserRequest) -> AppResult<UserResponse> {
        let user = self.find_active(id).await?;
        let mut am = user.into_active_model();

        if let Some(name) = req.name.as_deref() {
            am.name = Set(validate_name(name)?);
        }
        if let Some(email) = req.email.as_deref() {
            let email = normalize_email(email)?;
            self.ensure_email_free(&email, Some(id)).await?;
            am.email = Set(email);
        }
        if let Some(password) = req.password.as_deref() {
            validate_password(password)?;
            am.password_hash = Set(hash_password(password)?);
        }
        if let Some(role_id) = req.role_id {
            self.ensure_role(role_id).await?;
            am.role_id = Set(role_id);
        }
        am.updated_at = Set(Utc::now());

        Ok(am.update(self.pool.as_ref()).await?.into())
    }

    pub async fn delete_many(&self, ids: &[i64]) -> AppResult<AffectedResponse> {
        if ids.is_empty() {
            return Err(AppError::ValidationError("ids is required".to_string()));
        }
        let res = users::Entity::update_many()
            .col_expr(users::Column::DeletedAt, Expr::value(Utc::now()))
            .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(users::Column::Id.is_in(ids.to_vec()))
            .filter(users::Column::DeletedAt.is_null())
            .exec(self.pool.as_ref())
            .await?;
        self.authz.ban(ids);
        log::info!("Soft deleted {} users", res.rows_affected);
        Ok(AffectedResponse {
            affected: res.rows_affected,
        })
    }

    pub async fn ban_many(&self, ids: &[i64]) -> AppResult<AffectedResponse> {
        self.set_status(ids, UserStatus::Inactive).await
    }

    pub async fn unban_many(&self, ids: &[i64]) -> AppResult<AffectedResponse> {
        self.set_status(ids, UserStatus::Active).await
    }

    async fn set_status(&self, ids: &[i64], status: UserStatus) -> AppResult<AffectedResponse> {
        if ids.is_empty() {
            return Err(AppError::ValidationError("ids is required".to_string()));
        }
        let res = users::Entity::update_many()
            .col_expr(users::Column::Status, Expr::value(status))
            .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(users::Column::Id.is_in(ids.to_vec()))
            .filter(users::Column::DeletedAt.is_null())
            .exec(self.pool.as_ref())
            .await?;

        match status {
            UserStatus::Inactive => self.authz.ban(ids),
            UserStatus::Active => {
                // 已删除的用户保持封禁
                let deleted: Vec<i64> = users::Entity::find()
                    .filter(users::Column::Id.is_in(ids.to_vec()))
                    .filter(users::Column::DeletedAt.is_not_null())
                    .all(self.pool.as_ref())
                    .await?
                    .into_iter()
                    .map(|u| u.id)
                    .collect();
                let restored: Vec<i64> = ids.iter().copied().filter(|id| !deleted.contains(id)).collect();
                self.authz.unban(&restored);
            }
        }

        log::info!("Set status {:?} on {} users", status, res.rows_affected);
        Ok(AffectedResponse {
            affected: res.rows_affected,
        })
    }
}
