use crate::database::DbPool;
use crate::entities::{user_entity, user_transaction_entity as tx};
use crate::error::{AppError, AppResult};
use crate::models::{
    Currency, ListQuery, PaginatedResponse, TotalEarnResponse, TransactionAction,
    TransactionFilter, TransactionType,
};
use crate::utils::{paginate_select, resolve_sort};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait,
    IntoActiveModel, QueryFilter, QuerySelect, Select, Set,
};

/// 一笔待写入的账本流水
#[derive(Debug, Clone)]
pub struct LedgerEntry {
    pub user_id: i64,
    pub tx_type: TransactionType,
    pub currency: Currency,
    pub amount: i64,
    pub action: TransactionAction,
    pub ref_source: Option<String>,
    pub ref_id: Option<i64>,
    pub app_id: Option<i64>,
    pub origin: Option<String>,
}

impl LedgerEntry {
    pub fn credit(user_id: i64, currency: Currency, amount: i64, action: TransactionAction) -> Self {
        Self {
            user_id,
            tx_type: TransactionType::Sum,
            currency,
            amount,
            action,
            ref_source: None,
            ref_id: None,
            app_id: None,
            origin: None,
        }
    }

    pub fn debit(user_id: i64, currency: Currency, amount: i64, action: TransactionAction) -> Self {
        Self {
            tx_type: TransactionType::Sub,
            ..Self::credit(user_id, currency, amount, action)
        }
    }

    pub fn with_ref(mut self, source: &str, ref_id: i64) -> Self {
        self.ref_source = Some(source.to_string());
        self.ref_id = Some(ref_id);
        self
    }

    pub fn with_app(mut self, app_id: i64) -> Self {
        self.app_id = Some(app_id);
        self
    }

    pub fn with_origin(mut self, origin: Option<String>) -> Self {
        self.origin = origin;
        self
    }
}

/// 计算入账/扣款后的余额；金额必须为正，扣款不可透支
pub fn next_balance(before: i64, tx_type: TransactionType, amount: i64) -> AppResult<i64> {
    if amount <= 0 {
        return Err(AppError::ValidationError(
            "Amount must be positive".to_string(),
        ));
    }
    match tx_type {
        TransactionType::Sum => before
            .checked_add(amount)
            .ok_or_else(|| AppError::ValidationError("Balance overflow".to_string())),
        TransactionType::Sub => {
            if before < amount {
                Err(AppError::ValidationError("Insufficient balance".to_string()))
            } else {
                Ok(before - amount)
            }
        }
    }
}

const SORTABLE: &[(&str, tx::Column)] = &[
    ("created_at", tx::Column::CreatedAt),
    ("amount", tx::Column::Amount),
    ("id", tx::Column::Id),
];

#[derive(Clone)]
pub struct LedgerService {
    pool: DbPool,
}

impl LedgerService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// 写入一笔流水并同步用户余额
    ///
    /// 需在调用方事务内执行：先对用户行加排他锁，再更新余额并插入流水。
    pub async fn apply<C: ConnectionTrait>(conn: &C, entry: LedgerEntry) -> AppResult<tx::Model> {
        let user = user_entity::Entity::find_by_id(entry.user_id)
            .lock_exclusive()
            .one(conn)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let before = match entry.currency {
            Currency::Point => user.balance,
            Currency::Ton => user.ton_balance,
        };
        let after = next_balance(before, entry.tx_type, entry.amount)?;

        let mut am = user.into_active_model();
        match entry.currency {
            Currency::Point => am.balance = Set(after),
            Currency::Ton => am.ton_balance = Set(after),
        }
        am.updated_at = Set(Utc::now());
        am.update(conn).await?;

        let model = tx::ActiveModel {
            user_id: Set(entry.user_id),
            tx_type: Set(entry.tx_type),
            currency: Set(entry.currency),
            amount: Set(entry.amount),
            balance_before: Set(before),
            balance_after: Set(after),
            action: Set(entry.action),
            ref_source: Set(entry.ref_source),
            ref_id: Set(entry.ref_id),
            app_id: Set(entry.app_id),
            origin: Set(entry.origin),
            ..Default::default()
        }
        .insert(conn)
        .await?;

        Ok(model)
    }

    /// 将流水关联到其支付的记录（如购买的首张抽奖券）
    pub async fn attach_ref<C: ConnectionTrait>(
        conn: &C,
        tx_id: i64,
        source: &str,
        ref_id: i64,
    ) -> AppResult<()> {
        let res = tx::Entity::update_many()
            .col_expr(tx::Column::RefSource, Expr::value(source))
            .col_expr(tx::Column::RefId, Expr::value(ref_id))
            .filter(tx::Column::Id.eq(tx_id))
            .exec(conn)
            .await?;
        if res.rows_affected == 0 {
            return Err(AppError::NotFound("Transaction not found".to_string()));
        }
        Ok(())
    }

    fn filtered(filter: &TransactionFilter) -> Select<tx::Entity> {
        let mut select = tx::Entity::find();
        if let Some(action) = filter.action {
            select = select.filter(tx::Column::Action.eq(action));
        }
        if let Some(currency) = filter.currency {
            select = select.filter(tx::Column::Currency.eq(currency));
        }
        select
    }

    /// 用户自己的流水
    pub async fn list_for_user(
        &self,
        user_id: i64,
        query: &ListQuery,
        filter: &TransactionFilter,
    ) -> AppResult<PaginatedResponse<tx::Model>> {
        let select = Self::filtered(filter).filter(tx::Column::UserId.eq(user_id));
        let sort = resolve_sort(query.sort_by.as_deref(), SORTABLE, tx::Column::CreatedAt);
        paginate_select(self.pool.as_ref(), select, query, sort).await
    }

    /// 管理端：全部流水，可按用户过滤
    pub async fn list_all(
        &self,
        query: &ListQuery,
        filter: &TransactionFilter,
    ) -> AppResult<PaginatedResponse<tx::Model>> {
        let mut select = Self::filtered(filter);
        if let Some(user_id) = filter.user_id {
            select = select.filter(tx::Column::UserId.eq(user_id));
        }
        let sort = resolve_sort(query.sort_by.as_deref(), SORTABLE, tx::Column::CreatedAt);
        paginate_select(self.pool.as_ref(), select, query, sort).await
    }

    /// 累计获得的积分（所有 SUM 流水之和）
    pub async fn total_earn(&self, user_id: i64) -> AppResult<TotalEarnResponse> {
        let total: Option<i64> = tx::Entity::find()
            .select_only()
            .column_as(Expr::cust("COALESCE(SUM(amount), 0)::BIGINT"), "total")
            .filter(tx::Column::UserId.eq(user_id))
            .filter(tx::Column::TxType.eq(TransactionType::Sum))
            .filter(tx::Column::Currency.eq(Currency::Point))
            .into_tuple()
            .one(self.pool.as_ref())
            .await?;

        Ok(TotalEarnResponse {
            currency: Currency::Point,
            total: total.unwrap_or(0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::mock;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[test]
    fn test_next_balance_credit_and_debit() {
        assert_eq!(next_balance(100, TransactionType::Sum, 50).unwrap(), 150);
        assert_eq!(next_balance(100, TransactionType::Sub, 100).unwrap(), 0);
        assert_eq!(next_balance(0, TransactionType::Sum, 1).unwrap(), 1);
    }

    #[test]
    fn test_next_balance_rejects_overdraft_and_non_positive() {
        assert!(matches!(
            next_balance(99, TransactionType::Sub, 100),
            Err(AppError::ValidationError(_))
        ));
        assert!(next_balance(100, TransactionType::Sum, 0).is_err());
        assert!(next_balance(100, TransactionType::Sub, -5).is_err());
        assert!(next_balance(i64::MAX, TransactionType::Sum, 1).is_err());
    }

    #[test]
    fn test_entry_builders() {
        let e = LedgerEntry::debit(7, Currency::Point, 300, TransactionAction::BuyTicket)
            .with_ref("user_wheel_tickets", 11)
            .with_origin(Some("web".to_string()));
        assert_eq!(e.tx_type, TransactionType::Sub);
        assert_eq!(e.ref_source.as_deref(), Some("user_wheel_tickets"));
        assert_eq!(e.ref_id, Some(11));
        assert_eq!(e.origin.as_deref(), Some("web"));

        let c = LedgerEntry::credit(7, Currency::Ton, 5, TransactionAction::Wheel).with_app(3);
        assert_eq!(c.tx_type, TransactionType::Sum);
        assert_eq!(c.app_id, Some(3));
    }

    #[tokio::test]
    async fn test_apply_updates_balance_and_records_both_sides() {
        let user = mock::user(7, 1000, 0);
        let entry = LedgerEntry::debit(7, Currency::Point, 300, TransactionAction::BuyTicket);
        let pool = mock::pool(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![user.clone()]])
                .append_query_results([vec![mock::user(7, 700, 0)]])
                .append_query_results([vec![mock::ledger_row(21, &user, &entry, 1000, 700)]]),
        );

        let row = LedgerService::apply(pool.as_ref(), entry).await.unwrap();
        assert_eq!(row.id, 21);
        assert_eq!(row.balance_after, 700);

        let log = mock::statements(pool);
        assert!(log.contains("FOR UPDATE"));
        assert!(log.contains(r#"UPDATE "users" SET "balance""#));
        assert!(log.contains("BigInt(Some(700))"));
        assert!(log.contains(r#"INSERT INTO "user_transactions""#));
        assert!(log.contains("BigInt(Some(1000))"));
        assert!(log.contains("BUY_TICKET"));
    }

    #[tokio::test]
    async fn test_apply_ton_credit_touches_ton_balance_only() {
        let user = mock::user(7, 1000, 50);
        let entry = LedgerEntry::credit(7, Currency::Ton, 25, TransactionAction::Wheel);
        let pool = mock::pool(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![user.clone()]])
                .append_query_results([vec![mock::user(7, 1000, 75)]])
                .append_query_results([vec![mock::ledger_row(22, &user, &entry, 50, 75)]]),
        );

        LedgerService::apply(pool.as_ref(), entry).await.unwrap();

        let log = mock::statements(pool);
        assert!(log.contains(r#"UPDATE "users" SET "ton_balance""#));
        assert!(!log.contains(r#"SET "balance""#));
        assert!(log.contains("BigInt(Some(75))"));
    }

    #[tokio::test]
    async fn test_apply_overdraft_writes_nothing() {
        let pool = mock::pool(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![mock::user(7, 299, 0)]]),
        );

        let entry = LedgerEntry::debit(7, Currency::Point, 300, TransactionAction::BuyTicket);
        let err = LedgerService::apply(pool.as_ref(), entry).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(ref m) if m == "Insufficient balance"));

        let log = mock::statements(pool);
        assert!(!log.contains("UPDATE"));
        assert!(!log.contains("INSERT"));
    }

    #[tokio::test]
    async fn test_attach_ref_missing_transaction() {
        let pool = mock::pool(
            MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([mock::affected(0)]),
        );
        let err = LedgerService::attach_ref(pool.as_ref(), 99, "user_wheel_tickets", 5)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
