//! 服务层测试用的 MockDatabase 辅助函数

use super::DbPool;
use crate::entities::user_entity::{self as users, UserStatus};
use crate::entities::user_transaction_entity as tx;
use crate::services::LedgerEntry;
use chrono::Utc;
use sea_orm::{DatabaseConnection, MockDatabase, MockExecResult, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

pub fn pool(db: MockDatabase) -> DbPool {
    Arc::new(db.into_connection())
}

pub fn affected(rows_affected: u64) -> MockExecResult {
    MockExecResult {
        last_insert_id: 0,
        rows_affected,
    }
}

/// PaginatorTrait::count 读取的行
pub fn count_row(n: i64) -> BTreeMap<&'static str, Value> {
    BTreeMap::from([("num_items", Value::BigInt(Some(n)))])
}

/// 取出已执行的全部语句（含 BEGIN / COMMIT / ROLLBACK），去掉 Debug 转义后便于断言
///
/// 调用前需先释放持有连接的服务。
pub fn statements(pool: DbPool) -> String {
    let conn: DatabaseConnection = match Arc::try_unwrap(pool) {
        Ok(conn) => conn,
        Err(_) => panic!("mock pool is still shared"),
    };
    format!("{:?}", conn.into_transaction_log()).replace("\\\"", "\"")
}

pub fn user(id: i64, balance: i64, ton_balance: i64) -> users::Model {
    users::Model {
        id,
        name: format!("user{id}"),
        email: format!("user{id}@example.com"),
        password_hash: String::new(),
        role_id: 3,
        status: UserStatus::Active,
        balance,
        ton_balance,
        referral_code: format!("REF{id:05}"),
        referrer_id: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        deleted_at: None,
    }
}

/// LedgerService::apply 插入后返回的流水行
pub fn ledger_row(id: i64, user: &users::Model, entry: &LedgerEntry, before: i64, after: i64) -> tx::Model {
    tx::Model {
        id,
        user_id: user.id,
        tx_type: entry.tx_type,
        currency: entry.currency,
        amount: entry.amount,
        balance_before: before,
        balance_after: after,
        action: entry.action,
        ref_source: entry.ref_source.clone(),
        ref_id: entry.ref_id,
        app_id: entry.app_id,
        origin: entry.origin.clone(),
        created_at: Utc::now(),
    }
}
