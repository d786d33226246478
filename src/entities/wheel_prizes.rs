use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrizeType {
    /// 积分
    #[sea_orm(string_value = "GOLD")]
    Gold,
    /// 草稿 TON（nano）
    #[sea_orm(string_value = "TON")]
    Ton,
    /// 追加抽奖券
    #[sea_orm(string_value = "TICKET")]
    Ticket,
    #[sea_orm(string_value = "OTHER")]
    Other,
}

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrizeCategory {
    #[sea_orm(string_value = "COMMON")]
    Common,
    #[sea_orm(string_value = "MEDIUM")]
    Medium,
    #[sea_orm(string_value = "JACKPOT")]
    Jackpot,
    #[sea_orm(string_value = "SUPER_JACKPOT")]
    SuperJackpot,
}

impl PrizeCategory {
    pub fn is_jackpot(self) -> bool {
        matches!(self, PrizeCategory::Jackpot | PrizeCategory::SuperJackpot)
    }
}

/// 转盘奖品
/// rate_bp: 概率 (basis points) 1% = 100bp，同一转盘合计 10000bp
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "wheel_prizes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub wheel_id: i64,
    pub position: i32,
    pub name: Json,
    pub description: Json,
    pub prize_type: PrizeType,
    pub category: PrizeCategory,
    pub prize: i64,
    pub rate_bp: i32,
    pub image: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
