use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SwapStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "SUCCESS")]
    Success,
    #[sea_orm(string_value = "FAILED")]
    Failed,
}

impl std::fmt::Display for SwapStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SwapStatus::Pending => write!(f, "PENDING"),
            SwapStatus::Success => write!(f, "SUCCESS"),
            SwapStatus::Failed => write!(f, "FAILED"),
        }
    }
}

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SwapType {
    /// 积分兑换 jetton
    #[sea_orm(string_value = "POINT")]
    Point,
    /// 草稿 TON 提现
    #[sea_orm(string_value = "DRAFT_TON")]
    DraftTon,
}

/// 兑换记录
/// amount: 链上到账数量（nano）
/// point: 实际扣减的余额（POINT 为积分，DRAFT_TON 为 nano TON）
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "user_swaps")]
#[schema(as = UserSwap)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub status: SwapStatus,
    pub swap_type: SwapType,
    pub amount: i64,
    pub point: i64,
    pub signature: String,
    #[sea_orm(unique)]
    pub signature_id: i64,
    pub wallet_address: String,
    pub boc: Option<String>,
    /// unix 秒
    pub expire: i64,
    pub count_check: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
