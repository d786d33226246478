use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(10))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    #[sea_orm(string_value = "SUM")]
    Sum,
    #[sea_orm(string_value = "SUB")]
    Sub,
}

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(10))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Currency {
    #[sea_orm(string_value = "POINT")]
    Point,
    #[sea_orm(string_value = "TON")]
    Ton,
}

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(50))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionAction {
    #[sea_orm(string_value = "REFERRAL")]
    Referral,
    #[sea_orm(string_value = "REFERRED")]
    Referred,
    #[sea_orm(string_value = "WHEEL")]
    Wheel,
    #[sea_orm(string_value = "SWAP")]
    Swap,
    #[sea_orm(string_value = "DRAFT_TON")]
    DraftTon,
    #[sea_orm(string_value = "ROLLBACK_SWAP")]
    RollbackSwap,
    #[sea_orm(string_value = "ROLLBACK_SWAP_DRAFT_TON")]
    RollbackSwapDraftTon,
    #[sea_orm(string_value = "BUY_TICKET")]
    BuyTicket,
    #[sea_orm(string_value = "OPEN_APP")]
    OpenApp,
}

/// 用户账本流水
/// balance_before / balance_after 记录的是 currency 对应余额
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "user_transactions")]
#[schema(as = UserTransaction)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub tx_type: TransactionType,
    pub currency: Currency,
    pub amount: i64,
    pub balance_before: i64,
    pub balance_after: i64,
    pub action: TransactionAction,
    pub ref_source: Option<String>,
    pub ref_id: Option<i64>,
    pub app_id: Option<i64>,
    pub origin: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
