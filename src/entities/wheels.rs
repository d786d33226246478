use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// 转盘
/// cool_down_value: 中大奖后屏蔽大奖的抽奖次数
/// cool_down_time: 中大奖后屏蔽大奖的秒数（可选）
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "wheels")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub fee: i64,
    pub daily_limit: i32,
    pub cool_down_value: i32,
    pub cool_down_time: Option<i64>,
    pub created_by: Option<i64>,
    pub updated_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
