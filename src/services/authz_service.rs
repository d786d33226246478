use crate::database::DbPool;
use crate::entities::{role_entity as roles, user_entity as users};
use crate::error::{AppError, AppResult};
use crate::models::{
    CreateRoleRequest, ListQuery, PaginatedResponse, PermissionCatalogResponse, RoleResponse,
    RoleType, UpdateRoleRequest, UserStatus,
};
use crate::utils::{paginate_select, resolve_sort};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, IntoActiveModel,
    QueryFilter, QuerySelect, Set,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

/// 可授权的资源
pub const RESOURCES: &[&str] = &[
    "apps",
    "tags",
    "wheels",
    "user-wheel-tickets",
    "swaps",
    "users",
    "roles",
    "permissions",
    "notifications",
    "metadata",
    "user-transactions",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionAction {
    Get,
    Post,
    Put,
    Delete,
}

impl PermissionAction {
    pub const ALL: [PermissionAction; 4] = [
        PermissionAction::Get,
        PermissionAction::Post,
        PermissionAction::Put,
        PermissionAction::Delete,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PermissionAction::Get => "GET",
            PermissionAction::Post => "POST",
            PermissionAction::Put => "PUT",
            PermissionAction::Delete => "DELETE",
        }
    }
}

pub fn permission_key(resource: &str, action: PermissionAction) -> String {
    format!("{resource}:{}", action.as_str())
}

pub fn permission_catalog() -> Vec<String> {
    RESOURCES
        .iter()
        .flat_map(|r| PermissionAction::ALL.iter().map(move |a| permission_key(r, *a)))
        .collect()
}

/// 只允许目录中的权限
pub fn validate_permissions(perms: &[String]) -> AppResult<()> {
    let catalog = permission_catalog();
    if let Some(bad) = perms.iter().find(|p| !catalog.contains(p)) {
        return Err(AppError::ValidationError(format!(
            "Unknown permission: {bad}"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone)]
struct CachedRole {
    role_type: RoleType,
    permissions: HashSet<String>,
}

impl CachedRole {
    fn allows(&self, key: &str) -> bool {
        self.role_type == RoleType::SuperAdmin || self.permissions.contains(key)
    }
}

/// 请求上下文中的当前用户
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i64,
    pub role_id: i64,
}

const SORTABLE: &[(&str, roles::Column)] = &[
    ("created_at", roles::Column::CreatedAt),
    ("name", roles::Column::Name),
    ("id", roles::Column::Id),
];

/// 角色权限与封禁用户的内存缓存
#[derive(Clone)]
pub struct AuthzService {
    pool: DbPool,
    role_cache: Arc<RwLock<HashMap<i64, CachedRole>>>,
    banned: Arc<RwLock<HashSet<i64>>>,
}

impl AuthzService {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            role_cache: Arc::new(RwLock::new(HashMap::new())),
            banned: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    /// 启动时加载封禁（INACTIVE 或已删除）用户
    pub async fn load_banned_users(&self) -> AppResult<usize> {
        let ids: Vec<i64> = users::Entity::find()
            .select_only()
            .column(users::Column::Id)
            .filter(
                Condition::any()
                    .add(users::Column::Status.eq(UserStatus::Inactive))
                    .add(users::Column::DeletedAt.is_not_null()),
            )
            .into_tuple()
            .all(self.pool.as_ref())
            .await?;

        let count = ids.len();
        if let Ok(mut banned) = self.banned.write() {
            *banned = ids.into_iter().collect();
        }
        log::info!("Loaded {count} banned users into access cache");
        Ok(count)
    }

    pub fn is_banned(&self, user_id: i64) -> bool {
        self.banned
            .read()
            .map(|set| set.contains(&user_id))
            .unwrap_or(false)
    }

    pub fn ban(&self, user_ids: &[i64]) {
        if let Ok(mut banned) = self.banned.write() {
            banned.extend(user_ids.iter().copied());
        }
    }

    pub fn unban(&self, user_ids: &[i64]) {
        if let Ok(mut banned) = self.banned.write() {
            for id in user_ids {
                banned.remove(id);
            }
        }
    }

    fn invalidate_role(&self, role_id: i64) {
        if let Ok(mut cache) = self.role_cache.write() {
            cache.remove(&role_id);
        }
    }

    async fn cached_role(&self, role_id: i64) -> AppResult<CachedRole> {
        if let Some(role) = self
            .role_cache
            .read()
            .ok()
            .and_then(|cache| cache.get(&role_id).cloned())
        {
            return Ok(role);
        }

        let model = roles::Entity::find_by_id(role_id)
            .filter(roles::Column::DeletedAt.is_null())
            .one(self.pool.as_ref())
            .await?
            .ok_or(AppError::PermissionDenied)?;

        let role = CachedRole {
            role_type: model.role_type,
            permissions: model.permission_list().into_iter().collect(),
        };
        if let Ok(mut cache) = self.role_cache.write() {
            cache.insert(role_id, role.clone());
        }
        Ok(role)
    }

    /// 检查当前用户是否拥有资源上的操作权限，SUPER_ADMIN 直接放行
    pub async fn require(
        &self,
        user: &AuthUser,
        resource: &str,
        action: PermissionAction,
    ) -> AppResult<()> {
        let role = self.cached_role(user.role_id).await?;
        if role.allows(&permission_key(resource, action)) {
            Ok(())
        } else {
            log::warn!(
                "User {} denied {}:{}",
                user.id,
                resource,
                action.as_str()
            );
            Err(AppError::PermissionDenied)
        }
    }

    pub fn catalog(&self) -> PermissionCatalogResponse {
        PermissionCatalogResponse {
            resources: RESOURCES.iter().map(|s| s.to_string()).collect(),
            actions: PermissionAction::ALL
                .iter()
                .map(|a| a.as_str().to_string())
                .collect(),
            permissions: permission_catalog(),
        }
    }

    pub async fn list_roles(&self, query: &ListQuery) -> AppResult<PaginatedResponse<RoleResponse>> {
        let select = roles::Entity::find().filter(roles::Column::DeletedAt.is_null());
        let sort = resolve_sort(query.sort_by.as_deref(), SORTABLE, roles::Column::CreatedAt);
        Ok(paginate_select(self.pool.as_ref(), select, query, sort)
            .await?
            .map(RoleResponse::from))
    }

    async fn find_role(&self, id: i64) -> AppResult<roles::Model> {
        roles::Entity::find_by_id(id)
            .filter(roles::Column::DeletedAt.is_null())
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Role not found".to_string()))
    }

    pub async fn get_role(&self, id: i64) -> AppResult<RoleResponse> {
        Ok(self.find_role(id).await?.into())
    }

    pub async fn create_role(&self, req: CreateRoleRequest) -> AppResult<RoleResponse> {
        let name = req.name.trim();
        if name.is_empty() {
            return Err(AppError::ValidationError("Role name is required".to_string()));
        }
        let role_type = req.role_type.unwrap_or(RoleType::Admin);
        if role_type == RoleType::SuperAdmin {
            return Err(AppError::ValidationError(
                "SUPER_ADMIN role cannot be created".to_string(),
            ));
        }
        validate_permissions(&req.permissions)?;

        let model = roles::ActiveModel {
            name: Set(name.to_string()),
            role_type: Set(role_type),
            permissions: Set(serde_json::to_value(&req.permissions)?),
            ..Default::default()
        }
        .insert(self.pool.as_ref())
        .await?;

        log::info!("Role {} created", model.id);
        Ok(model.into())
    }

    pub async fn update_role(&self, id: i64, req: UpdateRoleRequest) -> AppResult<RoleResponse> {
        let role = self.find_role(id).await?;
        let mut am = role.into_active_model();

        if let Some(name) = req.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(AppError::ValidationError("Role name is required".to_string()));
            }
            am.name = Set(name);
        }
        if let Some(perms) = req.permissions {
            validate_permissions(&perms)?;
            am.permissions = Set(serde_json::to_value(&perms)?);
        }
        am.updated_at = Set(Utc::now());
        let model = am.update(self.pool.as_ref()).await?;

        self.invalidate_role(id);
        Ok(model.into())
    }

    /// 软删除；系统角色与仍被使用的角色不可删除
    pub async fn delete_role(&self, id: i64) -> AppResult<()> {
        let role = self.find_role(id).await?;
        if role.role_type != RoleType::Admin {
            return Err(AppError::ValidationError(
                "System roles cannot be deleted".to_string(),
            ));
        }

        let in_use = users::Entity::find()
            .filter(users::Column::RoleId.eq(id))
            .filter(users::Column::DeletedAt.is_null())
            .one(self.pool.as_ref())
            .await?;
        if in_use.is_some() {
            return Err(AppError::ValidationError(
                "Role is assigned to users".to_string(),
            ));
        }

        let mut am = role.into_active_model();
        am.deleted_at = Set(Some(Utc::now()));
        am.update(self.pool.as_ref()).await?;

        self.invalidate_role(id);
        log::info!("Role {id} deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_catalog() {
        let catalog = permission_catalog();
        assert_eq!(catalog.len(), RESOURCES.len() * 4);
        assert!(catalog.contains(&"wheels:PUT".to_string()));
        assert!(catalog.contains(&"user-wheel-tickets:DELETE".to_string()));
    }

    #[test]
    fn test_validate_permissions() {
        assert!(validate_permissions(&["swaps:GET".to_string()]).is_ok());
        assert!(validate_permissions(&["swaps:PATCH".to_string()]).is_err());
        assert!(validate_permissions(&["orders:GET".to_string()]).is_err());
    }

    #[test]
    fn test_cached_role_allows() {
        let admin = CachedRole {
            role_type: RoleType::Admin,
            permissions: ["wheels:GET".to_string()].into_iter().collect(),
        };
        assert!(admin.allows("wheels:GET"));
        assert!(!admin.allows("wheels:PUT"));

        let root = CachedRole {
            role_type: RoleType::SuperAdmin,
            permissions: HashSet::new(),
        };
        assert!(root.allows("roles:DELETE"));
    }

    #[test]
    fn test_banned_cache() {
        let svc = AuthzService::new(Arc::new(sea_orm::DatabaseConnection::Disconnected));
        assert!(!svc.is_banned(5));
        svc.ban(&[5, 6]);
        assert!(svc.is_banned(5));
        assert!(svc.is_banned(6));
        svc.unban(&[5]);
        assert!(!svc.is_banned(5));
        assert!(svc.is_banned(6));
    }
}
