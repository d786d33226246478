use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TagResponse {
    pub id: i64,
    pub name: String,
    pub short_description: String,
    pub slug: String,
    /// 全部语言的原始值
    #[schema(value_type = Object)]
    pub name_i18n: serde_json::Value,
    #[schema(value_type = Object)]
    pub short_description_i18n: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateTagRequest {
    #[schema(example = "Games")]
    pub name: String,
    pub short_description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateTagRequest {
    pub name: Option<String>,
    pub short_description: Option<String>,
}
