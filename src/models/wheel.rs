use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub use crate::entities::wheel_prizes::{PrizeCategory, PrizeType};

/// 前台奖品展示（不含概率）
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PrizeResponse {
    pub id: i64,
    pub position: i32,
    pub name: String,
    pub description: String,
    pub prize_type: PrizeType,
    pub category: PrizeCategory,
    pub prize: i64,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WheelResponse {
    pub id: i64,
    /// 每张券价格（积分）
    pub fee: i64,
    pub daily_limit: i32,
    /// 今日已购买张数
    pub purchased_today: u64,
    pub prizes: Vec<PrizeResponse>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdminPrizeResponse {
    pub id: i64,
    pub position: i32,
    #[schema(value_type = Object)]
    pub name: serde_json::Value,
    #[schema(value_type = Object)]
    pub description: serde_json::Value,
    pub prize_type: PrizeType,
    pub category: PrizeCategory,
    pub prize: i64,
    /// 百分比，两位小数
    pub rate: f64,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdminWheelResponse {
    pub id: i64,
    pub fee: i64,
    pub daily_limit: i32,
    pub cool_down_value: i32,
    pub cool_down_time: Option<i64>,
    pub prizes: Vec<AdminPrizeResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PrizeInput {
    #[schema(example = "100 Gold")]
    pub name: String,
    pub description: Option<String>,
    pub prize_type: PrizeType,
    pub category: PrizeCategory,
    #[schema(example = 100)]
    pub prize: i64,
    /// 百分比，所有奖品合计必须为 100
    #[schema(example = 40.0)]
    pub rate: f64,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateWheelRequest {
    pub fee: i64,
    pub daily_limit: i32,
    pub cool_down_value: Option<i32>,
    /// 秒
    pub cool_down_time: Option<i64>,
    pub prizes: Vec<PrizeInput>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateWheelRequest {
    pub fee: Option<i64>,
    pub daily_limit: Option<i32>,
    pub cool_down_value: Option<i32>,
    pub cool_down_time: Option<i64>,
    /// 提供时整体替换奖品列表
    pub prizes: Option<Vec<PrizeInput>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BuyTicketRequest {
    #[schema(example = 1)]
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BuyTicketResponse {
    pub quantity: u32,
    pub cost: i64,
    pub balance: i64,
    /// 免费转盘不产生流水
    pub transaction_id: Option<i64>,
    pub ticket_ids: Vec<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct PlayRequest {
    /// 1-10，默认 1
    pub spin_count: Option<u32>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SpinResult {
    pub ticket_id: i64,
    pub prize_id: i64,
    pub position: i32,
    pub name: String,
    pub prize_type: PrizeType,
    pub category: PrizeCategory,
    pub prize: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlayResponse {
    pub spins: Vec<SpinResult>,
    pub remaining_tickets: u64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CountTicketResponse {
    pub count: u64,
}
