use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// 批量操作的 ID 列表
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IdsRequest {
    #[schema(example = json!([1, 2, 3]))]
    pub ids: Vec<i64>,
}

/// 写入多语言字段时使用的语言
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LocaleQuery {
    pub locale: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AffectedResponse {
    pub affected: u64,
}
