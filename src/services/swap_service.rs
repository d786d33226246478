use crate::database::DbPool;
use crate::config::SwapConfig;
use crate::entities::{
    chain_cursor_entity as cursors, jetton_transaction_entity as chain_txs, user_entity as users,
    user_swap_entity as swaps,
};
use crate::error::{AppError, AppResult};
use crate::external::{ChainPage, TonApiClient};
use crate::models::{
    AfterSwapRequest, AfterSwapResponse, CreateSwapRequest, Currency, ListQuery,
    PaginatedResponse, SwapFilter, SwapSignatureResponse, SwapStatus, SwapType,
    TransactionAction,
};
use crate::services::{LedgerEntry, LedgerService, MetadataService, NotificationService};
use crate::utils::{
    NANO_PER_TON, SwapSigner, generate_unique_signature_id, paginate_select, resolve_sort,
    validate_ton_address,
};
use chrono::{Duration, Utc};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
    TransactionTrait,
};

const REF_SOURCE: &str = "user_swaps";

const SORTABLE: &[(&str, swaps::Column)] = &[
    ("created_at", swaps::Column::CreatedAt),
    ("amount", swaps::Column::Amount),
    ("point", swaps::Column::Point),
    ("expire", swaps::Column::Expire),
];

/// 积分折算 nano：floor(amount × (100 − fee)% × rate × 10⁹)
///
/// fee 与 rate 先定点化（fee 精确到 0.01%，rate 精确到 1 nano），避免浮点误差。
pub fn point_to_nano(amount: i64, fee_percent: f64, rate: f64) -> AppResult<i64> {
    if amount <= 0 {
        return Err(AppError::ValidationError("Amount must be positive".to_string()));
    }
    let fee_bp = (fee_percent * 100.0).round() as i128;
    let rate_nano = (rate * NANO_PER_TON as f64).round() as i128;
    if !(0..10_000).contains(&fee_bp) || rate_nano <= 0 {
        return Err(AppError::ConfigError(format!(
            "Invalid swap settings: fee {fee_percent}, rate {rate}"
        )));
    }

    let coin = i128::from(amount) * (10_000 - fee_bp) * rate_nano / 10_000;
    if coin <= 0 {
        return Err(AppError::ValidationError(
            "Amount is too small to swap".to_string(),
        ));
    }
    i64::try_from(coin)
        .map_err(|_| AppError::ValidationError("Swap amount is too large".to_string()))
}

/// 过期兑换的处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementDecision {
    /// 链上暂未找到，count_check + 1
    Retry,
    /// 超过重试次数仍未找到，回滚
    RollBack,
    Resolve(SwapStatus),
}

/// chain: 按签名匹配到的链上交易是否成功，None 表示未匹配
pub fn decide_settlement(count_check: i32, max_checks: i32, chain: Option<bool>) -> SettlementDecision {
    match chain {
        Some(true) => SettlementDecision::Resolve(SwapStatus::Success),
        Some(false) => SettlementDecision::Resolve(SwapStatus::Failed),
        None if count_check < max_checks => SettlementDecision::Retry,
        None => SettlementDecision::RollBack,
    }
}

fn start_of_today() -> chrono::DateTime<Utc> {
    let now = Utc::now();
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .unwrap_or(now)
}

fn to_u32(value: i64, what: &str) -> AppResult<u32> {
    u32::try_from(value).map_err(|_| AppError::InternalError(format!("{what} out of range: {value}")))
}

#[derive(Clone)]
pub struct SwapService {
    pool: DbPool,
    config: SwapConfig,
    signer: SwapSigner,
    ton: TonApiClient,
}

impl SwapService {
    pub fn new(pool: DbPool, config: SwapConfig, signer: SwapSigner) -> Self {
        let ton = TonApiClient::new(&config);
        Self {
            pool,
            config,
            signer,
            ton,
        }
    }

    /// 签名载荷中的地址：POINT 为合约的 jetton 钱包，DRAFT_TON 为用户钱包
    fn payload_address(&self, swap_type: SwapType, wallet_address: &str) -> AppResult<String> {
        match swap_type {
            SwapType::Point => {
                if self.config.jetton_wallet_address.is_empty() {
                    return Err(AppError::ConfigError(
                        "swap.jetton_wallet_address is not configured".to_string(),
                    ));
                }
                Ok(self.config.jetton_wallet_address.clone())
            }
            SwapType::DraftTon => Ok(wallet_address.to_string()),
        }
    }

    fn sign(&self, payload_address: &str, amount: i64, expire: i64, signature_id: i64) -> AppResult<String> {
        let amount = u64::try_from(amount)
            .map_err(|_| AppError::InternalError(format!("Swap amount out of range: {amount}")))?;
        Ok(self.signer.sign(
            payload_address,
            amount,
            to_u32(expire, "Swap expire")?,
            to_u32(signature_id, "Signature id")?,
        ))
    }

    fn signature_response(&self, swap: swaps::Model, payload_address: String) -> SwapSignatureResponse {
        SwapSignatureResponse {
            id: swap.id,
            swap_type: swap.swap_type,
            status: swap.status,
            amount: swap.amount,
            point: swap.point,
            signature: swap.signature,
            signature_id: swap.signature_id,
            wallet_address: swap.wallet_address,
            payload_address,
            expire: swap.expire,
            public_key: self.signer.public_key_hex(),
        }
    }

    /// 创建兑换并签名
    ///
    /// 逻辑:
    /// 1. 锁定用户，校验当日兑换次数（不含 FAILED）
    /// 2. 按类型计算到账数量并扣减对应余额
    /// 3. 生成签名编号与过期时间，签名后落库，并把流水关联到兑换记录
    pub async fn create_swap(
        &self,
        user_id: i64,
        req: CreateSwapRequest,
        origin: Option<String>,
    ) -> AppResult<SwapSignatureResponse> {
        let swap_type = req.swap_type.unwrap_or(SwapType::Point);
        let wallet_address = req.wallet_address.trim().to_string();
        validate_ton_address(&wallet_address)?;
        if req.amount <= 0 {
            return Err(AppError::ValidationError("Amount must be positive".to_string()));
        }

        let txn = self.pool.begin().await?;
        users::Entity::find_by_id(user_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let today = swaps::Entity::find()
            .filter(swaps::Column::UserId.eq(user_id))
            .filter(swaps::Column::Status.ne(SwapStatus::Failed))
            .filter(swaps::Column::CreatedAt.gte(start_of_today()))
            .count(&txn)
            .await?;
        if today >= self.config.daily_limit {
            return Err(AppError::ValidationError(format!(
                "Daily swap limit reached ({today}/{})",
                self.config.daily_limit
            )));
        }

        let settings = MetadataService::swap_settings(&txn).await?;
        let (coin, currency, action) = match swap_type {
            SwapType::Point => {
                if req.amount < settings.min_amount || req.amount > settings.max_amount {
                    return Err(AppError::ValidationError(format!(
                        "Amount must be between {} and {}",
                        settings.min_amount, settings.max_amount
                    )));
                }
                (
                    point_to_nano(req.amount, settings.fee, settings.rate)?,
                    Currency::Point,
                    TransactionAction::Swap,
                )
            }
            SwapType::DraftTon => (req.amount, Currency::Ton, TransactionAction::DraftTon),
        };

        let payload_address = self.payload_address(swap_type, &wallet_address)?;
        let expire = (Utc::now() + Duration::minutes(settings.expire_minutes)).timestamp();
        let signature_id = generate_unique_signature_id(&txn).await?;
        let signature = self.sign(&payload_address, coin, expire, signature_id)?;

        let entry = LedgerService::apply(
            &txn,
            LedgerEntry::debit(user_id, currency, req.amount, action).with_origin(origin),
        )
        .await?;

        let swap = swaps::ActiveModel {
            user_id: Set(user_id),
            status: Set(SwapStatus::Pending),
            swap_type: Set(swap_type),
            amount: Set(coin),
            point: Set(req.amount),
            signature: Set(signature),
            signature_id: Set(signature_id),
            wallet_address: Set(wallet_address),
            boc: Set(None),
            expire: Set(expire),
            count_check: Set(0),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        LedgerService::attach_ref(&txn, entry.id, REF_SOURCE, swap.id).await?;
        txn.commit().await?;

        log::info!(
            "Swap {} created for user {user_id}: {:?} {} -> {} nano",
            swap.id,
            swap_type,
            req.amount,
            coin
        );
        Ok(self.signature_response(swap, payload_address))
    }

    /// 前端提交链上交易 boc，只能附加一次
    pub async fn after_swap(&self, user_id: i64, req: AfterSwapRequest) -> AppResult<AfterSwapResponse> {
        if req.boc.trim().is_empty() {
            return Err(AppError::ValidationError("boc is required".to_string()));
        }
        let res = swaps::Entity::update_many()
            .col_expr(swaps::Column::Boc, Expr::value(req.boc.trim()))
            .col_expr(swaps::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(swaps::Column::Id.eq(req.swap_id))
            .filter(swaps::Column::UserId.eq(user_id))
            .filter(swaps::Column::Status.eq(SwapStatus::Pending))
            .filter(swaps::Column::Boc.is_null())
            .filter(swaps::Column::Expire.gte(Utc::now().timestamp()))
            .exec(self.pool.as_ref())
            .await?;

        Ok(AfterSwapResponse {
            attached: res.rows_affected == 1,
        })
    }

    /// 重新签名：刷新过期时间；已附加 boc 的兑换不可再签
    pub async fn resign(&self, user_id: i64, swap_id: i64) -> AppResult<SwapSignatureResponse> {
        let swap = swaps::Entity::find_by_id(swap_id)
            .filter(swaps::Column::UserId.eq(user_id))
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Swap not found".to_string()))?;

        if swap.status != SwapStatus::Pending {
            return Err(AppError::ValidationError(format!(
                "Swap is already {}",
                swap.status
            )));
        }
        if swap.boc.is_some() {
            return Err(AppError::ValidationError(
                "Swap has already been submitted on chain".to_string(),
            ));
        }

        let settings = MetadataService::swap_settings(self.pool.as_ref()).await?;
        let payload_address = self.payload_address(swap.swap_type, &swap.wallet_address)?;
        let expire = (Utc::now() + Duration::minutes(settings.expire_minutes)).timestamp();
        let signature = self.sign(&payload_address, swap.amount, expire, swap.signature_id)?;

        // boc 可能在读取之后被附加，条件更新兜底
        let res = swaps::Entity::update_many()
            .col_expr(swaps::Column::Signature, Expr::value(signature.clone()))
            .col_expr(swaps::Column::Expire, Expr::value(expire))
            .col_expr(swaps::Column::CountCheck, Expr::value(0))
            .col_expr(swaps::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(swaps::Column::Id.eq(swap.id))
            .filter(swaps::Column::Status.eq(SwapStatus::Pending))
            .filter(swaps::Column::Boc.is_null())
            .exec(self.pool.as_ref())
            .await?;
        if res.rows_affected != 1 {
            return Err(AppError::ValidationError(
                "Swap can no longer be re-signed".to_string(),
            ));
        }

        log::info!("Swap {} re-signed for user {user_id}", swap.id);
        Ok(self.signature_response(
            swaps::Model {
                signature,
                expire,
                count_check: 0,
                ..swap
            },
            payload_address,
        ))
    }

    /// 在事务内回滚：退还扣减的余额并置为 FAILED
    async fn rollback_in(txn: &DatabaseTransaction, swap_id: i64) -> AppResult<swaps::Model> {
        let swap = swaps::Entity::find_by_id(swap_id)
            .lock_exclusive()
            .one(txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Swap not found".to_string()))?;

        if swap.status != SwapStatus::Pending {
            return Err(AppError::ValidationError(format!(
                "Only pending swaps can be rolled back, swap {} is {}",
                swap.id, swap.status
            )));
        }

        let (currency, action) = match swap.swap_type {
            SwapType::Point => (Currency::Point, TransactionAction::RollbackSwap),
            SwapType::DraftTon => (Currency::Ton, TransactionAction::RollbackSwapDraftTon),
        };
        LedgerService::apply(
            txn,
            LedgerEntry::credit(swap.user_id, currency, swap.point, action)
                .with_ref(REF_SOURCE, swap.id),
        )
        .await?;

        swaps::Entity::update_many()
            .col_expr(swaps::Column::Status, Expr::value(SwapStatus::Failed))
            .col_expr(swaps::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(swaps::Column::Id.eq(swap.id))
            .exec(txn)
            .await?;

        Ok(swaps::Model {
            status: SwapStatus::Failed,
            ..swap
        })
    }

    /// 管理端手动回滚
    pub async fn rollback(&self, swap_id: i64) -> AppResult<swaps::Model> {
        let txn = self.pool.begin().await?;
        let swap = Self::rollback_in(&txn, swap_id).await?;
        txn.commit().await?;
        log::info!("Swap {swap_id} rolled back, refunded {} to user {}", swap.point, swap.user_id);
        Ok(swap)
    }

    fn filtered(filter: &SwapFilter) -> Select<swaps::Entity> {
        let mut select = swaps::Entity::find();
        if let Some(status) = filter.status {
            select = select.filter(swaps::Column::Status.eq(status));
        }
        if let Some(swap_type) = filter.swap_type {
            select = select.filter(swaps::Column::SwapType.eq(swap_type));
        }
        select
    }

    pub async fn list_own(
        &self,
        user_id: i64,
        query: &ListQuery,
        filter: &SwapFilter,
    ) -> AppResult<PaginatedResponse<swaps::Model>> {
        let select = Self::filtered(filter).filter(swaps::Column::UserId.eq(user_id));
        let sort = resolve_sort(query.sort_by.as_deref(), SORTABLE, swaps::Column::CreatedAt);
        paginate_select(self.pool.as_ref(), select, query, sort).await
    }

    pub async fn admin_list(
        &self,
        query: &ListQuery,
        filter: &SwapFilter,
    ) -> AppResult<PaginatedResponse<swaps::Model>> {
        let mut select = Self::filtered(filter);
        if let Some(user_id) = filter.user_id {
            select = select.filter(swaps::Column::UserId.eq(user_id));
        }
        let sort = resolve_sort(query.sort_by.as_deref(), SORTABLE, swaps::Column::CreatedAt);
        paginate_select(self.pool.as_ref(), select, query, sort).await
    }

    // -----------------------------
    // 后台任务
    // -----------------------------

    /// 抓取合约交易，按签名去重落库；没有待处理兑换时跳过
    pub async fn crawl_chain(&self) -> AppResult<usize> {
        let account = self.config.contract_address.as_str();
        if account.is_empty() {
            return Ok(0);
        }
        let pending = swaps::Entity::find()
            .filter(swaps::Column::Status.eq(SwapStatus::Pending))
            .count(self.pool.as_ref())
            .await?;
        if pending == 0 {
            return Ok(0);
        }

        let after_lt = self.crawl_cursor(account).await?;
        let page = self.ton.account_transactions(account, after_lt).await?;
        log::info!(
            "Fetched {} swap records after lt {after_lt} (page max lt {:?})",
            page.records.len(),
            page.last_lt
        );
        self.record_page(account, after_lt, page).await
    }

    /// 当前抓取游标；还没有游标时从已落库快照的最大 lt 开始
    pub async fn crawl_cursor(&self, account: &str) -> AppResult<i64> {
        if let Some(cursor) = cursors::Entity::find_by_id(account.to_string())
            .one(self.pool.as_ref())
            .await?
        {
            return Ok(cursor.last_lt);
        }

        let last_lt: Option<i64> = chain_txs::Entity::find()
            .select_only()
            .column_as(chain_txs::Column::Lt.max(), "lt")
            .into_tuple::<Option<i64>>()
            .one(self.pool.as_ref())
            .await?
            .flatten();
        Ok(last_lt.unwrap_or(0))
    }

    /// 落库一页交易并推进游标（同一事务）
    ///
    /// 游标取整页的最大 lt，不含兑换签名的页也会前进。
    pub async fn record_page(&self, account: &str, after_lt: i64, page: ChainPage) -> AppResult<usize> {
        let txn = self.pool.begin().await?;

        let mut inserted = 0;
        for record in page.records {
            let exists = chain_txs::Entity::find()
                .filter(chain_txs::Column::Signature.eq(record.signature.as_str()))
                .count(&txn)
                .await?;
            if exists > 0 {
                continue;
            }
            chain_txs::ActiveModel {
                signature: Set(record.signature),
                is_success: Set(record.is_success),
                lt: Set(record.lt),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            inserted += 1;
        }

        if let Some(last_lt) = page.last_lt
            && last_lt > after_lt
        {
            cursors::Entity::insert(cursors::ActiveModel {
                account: Set(account.to_string()),
                last_lt: Set(last_lt),
                updated_at: Set(Utc::now()),
            })
            .on_conflict(
                OnConflict::column(cursors::Column::Account)
                    .update_columns([cursors::Column::LastLt, cursors::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await?;
        }

        txn.commit().await?;
        Ok(inserted)
    }

    /// 处理已过期的待确认兑换，返回本轮处理条数
    pub async fn settle_expired(&self) -> AppResult<usize> {
        let batch = swaps::Entity::find()
            .filter(swaps::Column::Status.eq(SwapStatus::Pending))
            .filter(swaps::Column::Expire.lte(Utc::now().timestamp()))
            .order_by_asc(swaps::Column::CreatedAt)
            .limit(self.config.settle_batch_size)
            .all(self.pool.as_ref())
            .await?;

        let mut settled = 0;
        for swap in batch {
            let id = swap.id;
            match self.settle_one(swap).await {
                Ok(()) => settled += 1,
                Err(e) => log::error!("Failed to settle swap {id}: {e}"),
            }
        }
        Ok(settled)
    }

    async fn settle_one(&self, swap: swaps::Model) -> AppResult<()> {
        let chain = chain_txs::Entity::find()
            .filter(chain_txs::Column::Signature.eq(swap.signature.as_str()))
            .one(self.pool.as_ref())
            .await?
            .map(|t| t.is_success);

        match decide_settlement(swap.count_check, self.config.max_checks, chain) {
            SettlementDecision::Retry => {
                swaps::Entity::update_many()
                    .col_expr(
                        swaps::Column::CountCheck,
                        Expr::col(swaps::Column::CountCheck).add(1),
                    )
                    .filter(swaps::Column::Id.eq(swap.id))
                    .filter(swaps::Column::Status.eq(SwapStatus::Pending))
                    .exec(self.pool.as_ref())
                    .await?;
                log::info!(
                    "Swap {} has no chain transaction yet (check {})",
                    swap.id,
                    swap.count_check + 1
                );
            }
            SettlementDecision::RollBack => {
                let txn = self.pool.begin().await?;
                Self::rollback_in(&txn, swap.id).await?;
                Self::notify(&txn, &swap, SwapStatus::Failed).await?;
                txn.commit().await?;
                log::warn!("Swap {} not found on chain, rolled back", swap.id);
            }
            SettlementDecision::Resolve(status) => {
                let txn = self.pool.begin().await?;
                let res = swaps::Entity::update_many()
                    .col_expr(swaps::Column::Status, Expr::value(status))
                    .col_expr(swaps::Column::UpdatedAt, Expr::value(Utc::now()))
                    .filter(swaps::Column::Id.eq(swap.id))
                    .filter(swaps::Column::Status.eq(SwapStatus::Pending))
                    .exec(&txn)
                    .await?;
                if res.rows_affected == 1 {
                    Self::notify(&txn, &swap, status).await?;
                }
                txn.commit().await?;
                log::info!("Swap {} settled as {status}", swap.id);
            }
        }
        Ok(())
    }

    async fn notify<C: ConnectionTrait>(conn: &C, swap: &swaps::Model, status: SwapStatus) -> AppResult<()> {
        let (name, description) = match status {
            SwapStatus::Success => (
                "Swap completed",
                format!("Your swap #{} of {} nano has been confirmed on chain.", swap.id, swap.amount),
            ),
            _ => (
                "Swap failed",
                format!("Your swap #{} failed and {} has been refunded.", swap.id, swap.point),
            ),
        };
        NotificationService::create(conn, swap.user_id, name, &description, Some((REF_SOURCE, swap.id)))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::mock;
    use crate::entities::user_transaction_entity as tx;
    use crate::external::ChainSwapRecord;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[test]
    fn test_point_to_nano() {
        // 10000 积分，手续费 5%，汇率 0.001 -> 9.5 TON
        assert_eq!(point_to_nano(10_000, 5.0, 0.001).unwrap(), 9_500_000_000);
        assert_eq!(point_to_nano(1_000, 0.0, 0.001).unwrap(), 1_000_000_000);
        // 向下取整
        assert_eq!(point_to_nano(3, 33.33, 0.000000001).unwrap(), 2);
    }

    #[test]
    fn test_point_to_nano_rejects_bad_input() {
        assert!(matches!(point_to_nano(0, 5.0, 0.001), Err(AppError::ValidationError(_))));
        assert!(matches!(point_to_nano(100, 100.0, 0.001), Err(AppError::ConfigError(_))));
        assert!(matches!(point_to_nano(100, 5.0, 0.0), Err(AppError::ConfigError(_))));
        assert!(matches!(point_to_nano(i64::MAX, 0.0, 1000.0), Err(AppError::ValidationError(_))));
    }

    #[test]
    fn test_decide_settlement() {
        assert_eq!(decide_settlement(0, 5, None), SettlementDecision::Retry);
        assert_eq!(decide_settlement(4, 5, None), SettlementDecision::Retry);
        assert_eq!(decide_settlement(5, 5, None), SettlementDecision::RollBack);
        assert_eq!(
            decide_settlement(0, 5, Some(true)),
            SettlementDecision::Resolve(SwapStatus::Success)
        );
        assert_eq!(
            decide_settlement(9, 5, Some(false)),
            SettlementDecision::Resolve(SwapStatus::Failed)
        );
    }

    fn service(pool: &DbPool) -> SwapService {
        let config = SwapConfig {
            contract_address: "EQcontract".to_string(),
            jetton_wallet_address: "EQwallet".to_string(),
            ..Default::default()
        };
        SwapService::new(pool.clone(), config, SwapSigner::from_secret([7u8; 32]))
    }

    fn swap(id: i64, status: SwapStatus, swap_type: SwapType, point: i64) -> swaps::Model {
        swaps::Model {
            id,
            user_id: 7,
            status,
            swap_type,
            amount: 9_500_000_000,
            point,
            signature: "c2lnbmF0dXJl".to_string(),
            signature_id: 123_456,
            wallet_address: "EQuser".to_string(),
            boc: None,
            expire: Utc::now().timestamp() + 600,
            count_check: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn refund_row(
        user: &users::Model,
        currency: Currency,
        action: TransactionAction,
        before: i64,
        after: i64,
    ) -> tx::Model {
        let entry =
            LedgerEntry::credit(user.id, currency, after - before, action).with_ref(REF_SOURCE, 3);
        mock::ledger_row(40, user, &entry, before, after)
    }

    #[tokio::test]
    async fn test_rollback_point_swap_refunds_balance() {
        let user = mock::user(7, 1000, 0);
        let pool = mock::pool(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![swap(3, SwapStatus::Pending, SwapType::Point, 500)]])
                .append_query_results([vec![user.clone()], vec![mock::user(7, 1500, 0)]])
                .append_query_results([vec![refund_row(
                    &user,
                    Currency::Point,
                    TransactionAction::RollbackSwap,
                    1000,
                    1500,
                )]])
                .append_exec_results([mock::affected(1)]),
        );

        let rolled = service(&pool).rollback(3).await.unwrap();
        assert_eq!(rolled.status, SwapStatus::Failed);
        assert_eq!(rolled.point, 500);

        let log = mock::statements(pool);
        assert!(log.contains(r#"UPDATE "users" SET "balance""#));
        assert!(log.contains("BigInt(Some(1500))"));
        assert!(log.contains(r#"String(Some("ROLLBACK_SWAP"))"#));
        assert!(log.contains(r#"String(Some("user_swaps"))"#));
        assert!(log.contains(r#"UPDATE "user_swaps" SET "status""#));
        assert!(log.contains(r#"String(Some("FAILED"))"#));
        assert!(log.contains("COMMIT"));
    }

    #[tokio::test]
    async fn test_rollback_draft_ton_swap_refunds_ton_balance() {
        let user = mock::user(7, 1000, 2_000);
        let pool = mock::pool(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![swap(3, SwapStatus::Pending, SwapType::DraftTon, 500)]])
                .append_query_results([vec![user.clone()], vec![mock::user(7, 1000, 2_500)]])
                .append_query_results([vec![refund_row(
                    &user,
                    Currency::Ton,
                    TransactionAction::RollbackSwapDraftTon,
                    2_000,
                    2_500,
                )]])
                .append_exec_results([mock::affected(1)]),
        );

        let rolled = service(&pool).rollback(3).await.unwrap();
        assert_eq!(rolled.status, SwapStatus::Failed);

        let log = mock::statements(pool);
        assert!(log.contains(r#"UPDATE "users" SET "ton_balance""#));
        assert!(log.contains("BigInt(Some(2500))"));
        assert!(log.contains(r#"String(Some("ROLLBACK_SWAP_DRAFT_TON"))"#));
    }

    #[tokio::test]
    async fn test_rollback_only_pending_swaps() {
        let pool = mock::pool(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![swap(3, SwapStatus::Success, SwapType::Point, 500)]]),
        );

        let err = service(&pool).rollback(3).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let log = mock::statements(pool);
        assert!(log.contains("ROLLBACK"));
        assert!(!log.contains("UPDATE"));
        assert!(!log.contains("INSERT"));
    }

    #[tokio::test]
    async fn test_after_swap_attaches_boc_only_once() {
        let pool = mock::pool(
            MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([mock::affected(0)]),
        );

        let resp = service(&pool)
            .after_swap(
                7,
                AfterSwapRequest {
                    swap_id: 3,
                    boc: " te6cc== ".to_string(),
                },
            )
            .await
            .unwrap();
        assert!(!resp.attached);

        let log = mock::statements(pool);
        assert!(log.contains(r#"UPDATE "user_swaps" SET "boc""#));
        assert!(log.contains(r#""user_swaps"."boc" IS NULL"#));
        assert!(log.contains(r#"String(Some("te6cc=="))"#));
    }

    #[tokio::test]
    async fn test_resign_refuses_submitted_swap() {
        let mut submitted = swap(3, SwapStatus::Pending, SwapType::Point, 500);
        submitted.boc = Some("te6cc==".to_string());
        let pool = mock::pool(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([vec![submitted]]),
        );

        let err = service(&pool).resign(7, 3).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let log = mock::statements(pool);
        assert!(!log.contains("UPDATE"));
        assert!(!log.contains(r#""metadata""#));
    }

    #[tokio::test]
    async fn test_record_page_advances_cursor_without_swaps() {
        let pool = mock::pool(
            MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([mock::affected(1)]),
        );

        let page = ChainPage {
            records: Vec::new(),
            last_lt: Some(10),
        };
        let inserted = service(&pool).record_page("EQcontract", 0, page).await.unwrap();
        assert_eq!(inserted, 0);

        let log = mock::statements(pool);
        assert!(log.contains(r#"INSERT INTO "chain_cursors""#));
        assert!(log.contains(r#"ON CONFLICT ("account") DO UPDATE SET"#));
        assert!(log.contains("BigInt(Some(10))"));
        assert!(log.contains("COMMIT"));
    }

    #[tokio::test]
    async fn test_record_page_skips_known_signatures() {
        let pool = mock::pool(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![mock::count_row(1)], vec![mock::count_row(0)]])
                .append_query_results([vec![chain_txs::Model {
                    id: 1,
                    signature: "2".to_string(),
                    is_success: true,
                    lt: 12,
                    created_at: Utc::now(),
                }]]),
        );

        let page = ChainPage {
            records: vec![
                ChainSwapRecord {
                    signature: "1".to_string(),
                    is_success: true,
                    lt: 11,
                },
                ChainSwapRecord {
                    signature: "2".to_string(),
                    is_success: true,
                    lt: 12,
                },
            ],
            last_lt: Some(12),
        };
        // 游标已在 12，不再写入
        let inserted = service(&pool).record_page("EQcontract", 12, page).await.unwrap();
        assert_eq!(inserted, 1);

        let log = mock::statements(pool);
        assert_eq!(log.matches(r#"INSERT INTO "jetton_transactions""#).count(), 1);
        assert!(!log.contains("chain_cursors"));
    }

    #[tokio::test]
    async fn test_crawl_cursor_reads_stored_position() {
        let pool = mock::pool(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([vec![cursors::Model {
                account: "EQcontract".to_string(),
                last_lt: 48_000_001,
                updated_at: Utc::now(),
            }]]),
        );

        assert_eq!(service(&pool).crawl_cursor("EQcontract").await.unwrap(), 48_000_001);
        let log = mock::statements(pool);
        assert!(!log.contains("jetton_transactions"));
    }
}
