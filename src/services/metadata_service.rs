use crate::database::DbPool;
use crate::entities::metadata_entity as metadata;
use crate::error::{AppError, AppResult};
use crate::models::{MetadataFilter, MetadataType, UpdateMetadataRequest};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, Set,
};

pub const SWAP_RATE: &str = "rate";
pub const SWAP_FEE: &str = "fee";
pub const SWAP_MIN_AMOUNT: &str = "min-amount";
pub const SWAP_MAX_AMOUNT: &str = "max-amount";
pub const SWAP_EXPIRE: &str = "expire";
pub const REWARD_OPEN_APP: &str = "open-app";

/// 兑换参数
#[derive(Debug, Clone, PartialEq)]
pub struct SwapSettings {
    /// 1 积分可兑换的 TON
    pub rate: f64,
    /// 手续费百分比
    pub fee: f64,
    pub min_amount: i64,
    pub max_amount: i64,
    /// 签名有效期（分钟）
    pub expire_minutes: i64,
}

/// 校验配置值格式，未知的 SWAP 键一律拒绝
pub fn validate_metadata_value(metadata_type: MetadataType, key: &str, value: &str) -> AppResult<()> {
    let invalid = || AppError::ValidationError(format!("Invalid value for {key}: {value}"));
    match (metadata_type, key) {
        (MetadataType::Swap, SWAP_RATE) => {
            let v: f64 = value.parse().map_err(|_| invalid())?;
            if !(v.is_finite() && v > 0.0) {
                return Err(invalid());
            }
        }
        (MetadataType::Swap, SWAP_FEE) => {
            let v: f64 = value.parse().map_err(|_| invalid())?;
            if !(0.0..100.0).contains(&v) {
                return Err(invalid());
            }
        }
        (MetadataType::Swap, SWAP_MIN_AMOUNT | SWAP_MAX_AMOUNT | SWAP_EXPIRE)
        | (MetadataType::Reward, _) => {
            let v: i64 = value.parse().map_err(|_| invalid())?;
            let allow_zero = metadata_type == MetadataType::Reward;
            if v < 0 || (v == 0 && !allow_zero) {
                return Err(invalid());
            }
        }
        (MetadataType::Swap, _) => {
            return Err(AppError::ValidationError(format!(
                "Unknown swap setting: {key}"
            )));
        }
    }
    Ok(())
}

#[derive(Clone)]
pub struct MetadataService {
    pool: DbPool,
}

impl MetadataService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn find<C: ConnectionTrait>(
        conn: &C,
        metadata_type: MetadataType,
        key: &str,
    ) -> AppResult<metadata::Model> {
        metadata::Entity::find()
            .filter(metadata::Column::MetadataType.eq(metadata_type))
            .filter(metadata::Column::Key.eq(key))
            .one(conn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Metadata {key} not found")))
    }

    async fn parse<C: ConnectionTrait, T: std::str::FromStr>(
        conn: &C,
        metadata_type: MetadataType,
        key: &str,
    ) -> AppResult<T> {
        let m = Self::find(conn, metadata_type, key).await?;
        m.value
            .parse()
            .map_err(|_| AppError::ConfigError(format!("Metadata {key} is malformed: {}", m.value)))
    }

    /// 公开接口：读取单个兑换配置
    pub async fn get_swap(&self, key: &str) -> AppResult<metadata::Model> {
        Self::find(self.pool.as_ref(), MetadataType::Swap, key).await
    }

    pub async fn swap_settings<C: ConnectionTrait>(conn: &C) -> AppResult<SwapSettings> {
        Ok(SwapSettings {
            rate: Self::parse(conn, MetadataType::Swap, SWAP_RATE).await?,
            fee: Self::parse(conn, MetadataType::Swap, SWAP_FEE).await?,
            min_amount: Self::parse(conn, MetadataType::Swap, SWAP_MIN_AMOUNT).await?,
            max_amount: Self::parse(conn, MetadataType::Swap, SWAP_MAX_AMOUNT).await?,
            expire_minutes: Self::parse(conn, MetadataType::Swap, SWAP_EXPIRE).await?,
        })
    }

    /// 打开应用的默认奖励，未配置时为 0
    pub async fn open_app_reward<C: ConnectionTrait>(conn: &C) -> AppResult<i64> {
        match Self::parse(conn, MetadataType::Reward, REWARD_OPEN_APP).await {
            Ok(v) => Ok(v),
            Err(AppError::NotFound(_)) => Ok(0),
            Err(e) => Err(e),
        }
    }

    pub async fn list(&self, filter: &MetadataFilter) -> AppResult<Vec<metadata::Model>> {
        let mut select = metadata::Entity::find();
        if let Some(t) = filter.metadata_type {
            select = select.filter(metadata::Column::MetadataType.eq(t));
        }
        Ok(select
            .order_by_asc(metadata::Column::MetadataType)
            .order_by_asc(metadata::Column::Key)
            .all(self.pool.as_ref())
            .await?)
    }

    pub async fn update(&self, key: &str, req: UpdateMetadataRequest) -> AppResult<metadata::Model> {
        let metadata_type = req.metadata_type.unwrap_or(MetadataType::Swap);
        let value = req.value.trim().to_string();
        validate_metadata_value(metadata_type, key, &value)?;

        let existing = Self::find(self.pool.as_ref(), metadata_type, key).await?;
        let mut am = existing.into_active_model();
        am.value = Set(value);
        if let Some(desc) = req.description {
            am.description = Set(Some(desc));
        }
        am.updated_at = Set(Utc::now());
        let model = am.update(self.pool.as_ref()).await?;

        log::info!("Metadata {key} updated to {}", model.value);
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_swap_values() {
        assert!(validate_metadata_value(MetadataType::Swap, SWAP_RATE, "0.001").is_ok());
        assert!(validate_metadata_value(MetadataType::Swap, SWAP_RATE, "0").is_err());
        assert!(validate_metadata_value(MetadataType::Swap, SWAP_RATE, "abc").is_err());
        assert!(validate_metadata_value(MetadataType::Swap, SWAP_FEE, "5").is_ok());
        assert!(validate_metadata_value(MetadataType::Swap, SWAP_FEE, "100").is_err());
        assert!(validate_metadata_value(MetadataType::Swap, SWAP_MIN_AMOUNT, "1000").is_ok());
        assert!(validate_metadata_value(MetadataType::Swap, SWAP_MAX_AMOUNT, "1.5").is_err());
        assert!(validate_metadata_value(MetadataType::Swap, SWAP_EXPIRE, "0").is_err());
        assert!(validate_metadata_value(MetadataType::Swap, "unknown", "1").is_err());
    }

    #[test]
    fn test_validate_reward_values() {
        assert!(validate_metadata_value(MetadataType::Reward, REWARD_OPEN_APP, "0").is_ok());
        assert!(validate_metadata_value(MetadataType::Reward, REWARD_OPEN_APP, "50").is_ok());
        assert!(validate_metadata_value(MetadataType::Reward, REWARD_OPEN_APP, "-1").is_err());
    }
}
