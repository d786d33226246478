use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

pub use crate::entities::user_swaps::{SwapStatus, SwapType};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateSwapRequest {
    /// POINT: 积分数量；DRAFT_TON: nano TON
    #[schema(example = 10000)]
    pub amount: i64,
    #[schema(example = "EQD4FPq-PRDieyQKkizFTRtSDyucUIqrj0v_zXJmqaDp6_0t")]
    pub wallet_address: String,
    /// 默认 POINT
    pub swap_type: Option<SwapType>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AfterSwapRequest {
    pub swap_id: i64,
    pub boc: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AfterSwapResponse {
    pub attached: bool,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SwapFilter {
    /// 仅管理端生效
    pub user_id: Option<i64>,
    pub status: Option<SwapStatus>,
    pub swap_type: Option<SwapType>,
}

/// 兑换签名结果，前端据此构造链上交易
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SwapSignatureResponse {
    pub id: i64,
    pub swap_type: SwapType,
    pub status: SwapStatus,
    /// 到账数量（nano）
    pub amount: i64,
    /// 扣减数量
    pub point: i64,
    pub signature: String,
    pub signature_id: i64,
    pub wallet_address: String,
    /// 签名载荷中的地址
    pub payload_address: String,
    pub expire: i64,
    pub public_key: String,
}

pub type UserSwap = crate::entities::user_swaps::Model;
