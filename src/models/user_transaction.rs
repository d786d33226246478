use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

pub use crate::entities::user_transactions::{Currency, TransactionAction, TransactionType};

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TransactionFilter {
    /// 仅管理端生效
    pub user_id: Option<i64>,
    pub action: Option<TransactionAction>,
    pub currency: Option<Currency>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TotalEarnResponse {
    pub currency: Currency,
    pub total: i64,
}

/// 流水记录
pub type UserTransaction = crate::entities::user_transactions::Model;
