use super::wheel_prizes::{PrizeCategory, PrizeType};
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// 抽奖记录（每张券一条）
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "user_wheels")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub wheel_id: i64,
    pub ticket_id: i64,
    pub prize_id: i64,
    pub prize_type: PrizeType,
    pub category: PrizeCategory,
    pub prize: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
