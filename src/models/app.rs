use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::TagResponse;
pub use crate::entities::apps::AppStatus;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AppResponse {
    pub id: i64,
    pub name: String,
    pub short_description: String,
    pub slug: String,
    pub url: String,
    pub image: Option<String>,
    pub status: AppStatus,
    pub reward: i64,
    pub tags: Vec<TagResponse>,
    /// 当前用户是否已领取打开奖励（仅前台）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_received_reward: Option<bool>,
    #[schema(value_type = Object)]
    pub name_i18n: serde_json::Value,
    #[schema(value_type = Object)]
    pub short_description_i18n: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateAppRequest {
    #[schema(example = "Ton Farm")]
    pub name: String,
    pub short_description: Option<String>,
    #[schema(example = "https://t.me/ton_farm_bot")]
    pub url: String,
    pub image: Option<String>,
    pub status: Option<AppStatus>,
    pub reward: Option<i64>,
    #[serde(default)]
    pub tag_ids: Vec<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateAppRequest {
    pub name: Option<String>,
    pub short_description: Option<String>,
    pub url: Option<String>,
    pub image: Option<String>,
    pub status: Option<AppStatus>,
    pub reward: Option<i64>,
    /// 提供时整体替换
    pub tag_ids: Option<Vec<i64>>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AppFilter {
    /// 仅管理端生效，前台固定为 APPROVED
    pub status: Option<AppStatus>,
    pub tag_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AppStatusCount {
    pub status: AppStatus,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OpenAppResponse {
    /// 本次是否发放了奖励
    pub rewarded: bool,
    pub reward: i64,
    pub balance: i64,
}
