use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::role_entity;
pub use crate::entities::roles::RoleType;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RoleResponse {
    pub id: i64,
    pub name: String,
    pub role_type: RoleType,
    pub permissions: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<role_entity::Model> for RoleResponse {
    fn from(m: role_entity::Model) -> Self {
        let permissions = m.permission_list();
        Self {
            id: m.id,
            name: m.name,
            role_type: m.role_type,
            permissions,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateRoleRequest {
    #[schema(example = "Operator")]
    pub name: String,
    /// 默认 ADMIN
    pub role_type: Option<RoleType>,
    #[schema(example = json!(["wheels:GET", "wheels:PUT"]))]
    pub permissions: Vec<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateRoleRequest {
    pub name: Option<String>,
    pub permissions: Option<Vec<String>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PermissionCatalogResponse {
    pub resources: Vec<String>,
    pub actions: Vec<String>,
    pub permissions: Vec<String>,
}
