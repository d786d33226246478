use crate::database::DbPool;
use crate::entities::{ticket_entity as tickets, user_entity as users};
use crate::error::{AppError, AppResult};
use crate::models::{
    GrantTicketsRequest, ListQuery, PaginatedResponse, TicketFilter, TicketStatus, TicketType,
};
use crate::utils::{paginate_select, resolve_sort};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, Set,
};

pub const MAX_GRANT_QUANTITY: u32 = 100;

/// 管理员只能在 NEW 与 PENDING 之间切换，USED 为终态
pub fn admin_transition_allowed(from: TicketStatus, to: TicketStatus) -> bool {
    matches!(
        (from, to),
        (TicketStatus::New, TicketStatus::Pending) | (TicketStatus::Pending, TicketStatus::New)
    )
}

const SORTABLE: &[(&str, tickets::Column)] = &[
    ("created_at", tickets::Column::CreatedAt),
    ("id", tickets::Column::Id),
];

#[derive(Clone)]
pub struct TicketService {
    pool: DbPool,
}

impl TicketService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// 发放 count 张 NEW 状态、立即可用的券
    pub async fn mint<C: ConnectionTrait>(
        conn: &C,
        user_id: i64,
        ticket_type: TicketType,
        count: u32,
    ) -> AppResult<Vec<tickets::Model>> {
        Self::mint_at(conn, user_id, ticket_type, count, Utc::now()).await
    }

    /// 发放 count 张券，available_at 之前不计入可用数量，也不能被消费
    pub async fn mint_at<C: ConnectionTrait>(
        conn: &C,
        user_id: i64,
        ticket_type: TicketType,
        count: u32,
        available_at: DateTime<Utc>,
    ) -> AppResult<Vec<tickets::Model>> {
        let mut minted = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let model = tickets::ActiveModel {
                user_id: Set(user_id),
                status: Set(TicketStatus::New),
                ticket_type: Set(ticket_type),
                available_at: Set(available_at),
                ..Default::default()
            }
            .insert(conn)
            .await?;
            minted.push(model);
        }
        Ok(minted)
    }

    /// NEW -> USED，条件更新保证同一张券只会被消费一次；未到可用时间的券不能消费
    pub async fn claim<C: ConnectionTrait>(conn: &C, ticket_id: i64) -> AppResult<bool> {
        let res = tickets::Entity::update_many()
            .col_expr(tickets::Column::Status, Expr::value(TicketStatus::Used))
            .col_expr(tickets::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(tickets::Column::Id.eq(ticket_id))
            .filter(tickets::Column::Status.eq(TicketStatus::New))
            .filter(tickets::Column::AvailableAt.lte(Utc::now()))
            .exec(conn)
            .await?;
        Ok(res.rows_affected == 1)
    }

    /// USED -> NEW，仅用于抽奖后续处理失败时的补偿
    pub async fn revert<C: ConnectionTrait>(conn: &C, ticket_id: i64) -> AppResult<bool> {
        Self::transition(conn, ticket_id, TicketStatus::Used, TicketStatus::New).await
    }

    async fn transition<C: ConnectionTrait>(
        conn: &C,
        ticket_id: i64,
        from: TicketStatus,
        to: TicketStatus,
    ) -> AppResult<bool> {
        let res = tickets::Entity::update_many()
            .col_expr(tickets::Column::Status, Expr::value(to))
            .col_expr(tickets::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(tickets::Column::Id.eq(ticket_id))
            .filter(tickets::Column::Status.eq(from))
            .exec(conn)
            .await?;
        Ok(res.rows_affected == 1)
    }

    fn usable(user_id: i64) -> Select<tickets::Entity> {
        tickets::Entity::find()
            .filter(tickets::Column::UserId.eq(user_id))
            .filter(tickets::Column::Status.eq(TicketStatus::New))
            .filter(tickets::Column::AvailableAt.lte(Utc::now()))
    }

    pub async fn count_new<C: ConnectionTrait>(conn: &C, user_id: i64) -> AppResult<u64> {
        Ok(Self::usable(user_id).count(conn).await?)
    }

    /// 最早发放的 limit 张可用券
    pub async fn oldest_usable<C: ConnectionTrait>(
        conn: &C,
        user_id: i64,
        limit: u64,
    ) -> AppResult<Vec<tickets::Model>> {
        Ok(Self::usable(user_id)
            .order_by_asc(tickets::Column::Id)
            .limit(limit)
            .all(conn)
            .await?)
    }

    /// 用户自己的可用券
    pub async fn list_own(
        &self,
        user_id: i64,
        query: &ListQuery,
    ) -> AppResult<PaginatedResponse<tickets::Model>> {
        let select = Self::usable(user_id);
        let sort = resolve_sort(query.sort_by.as_deref(), SORTABLE, tickets::Column::CreatedAt);
        paginate_select(self.pool.as_ref(), select, query, sort).await
    }

    pub async fn admin_list(
        &self,
        query: &ListQuery,
        filter: &TicketFilter,
    ) -> AppResult<PaginatedResponse<tickets::Model>> {
        let mut select =
            tickets::Entity::find().filter(tickets::Column::Status.eq(TicketStatus::New));
        if let Some(user_id) = filter.user_id {
            select = select.filter(tickets::Column::UserId.eq(user_id));
        }
        if let Some(ticket_type) = filter.ticket_type {
            select = select.filter(tickets::Column::TicketType.eq(ticket_type));
        }
        let sort = resolve_sort(query.sort_by.as_deref(), SORTABLE, tickets::Column::CreatedAt);
        paginate_select(self.pool.as_ref(), select, query, sort).await
    }

    pub async fn grant(&self, req: GrantTicketsRequest) -> AppResult<Vec<tickets::Model>> {
        if req.quantity == 0 || req.quantity > MAX_GRANT_QUANTITY {
            return Err(AppError::ValidationError(format!(
                "Quantity must be between 1 and {MAX_GRANT_QUANTITY}"
            )));
        }
        users::Entity::find_by_id(req.user_id)
            .filter(users::Column::DeletedAt.is_null())
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let minted = Self::mint(self.pool.as_ref(), req.user_id, TicketType::Grant, req.quantity).await?;
        log::info!("Granted {} tickets to user {}", minted.len(), req.user_id);
        Ok(minted)
    }

    /// 管理员切换券状态；以读取到的状态为条件更新，避免覆盖并发的消费
    pub async fn set_status(&self, id: i64, status: TicketStatus) -> AppResult<tickets::Model> {
        let ticket = tickets::Entity::find_by_id(id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Ticket not found".to_string()))?;

        if !admin_transition_allowed(ticket.status, status) {
            return Err(AppError::ValidationError(format!(
                "Cannot change ticket status from {:?} to {:?}",
                ticket.status, status
            )));
        }

        let now = Utc::now();
        if !Self::transition(self.pool.as_ref(), id, ticket.status, status).await? {
            return Err(AppError::ValidationError(
                "Ticket status changed concurrently, please reload".to_string(),
            ));
        }
        log::info!("Ticket {id} status changed from {:?} to {:?}", ticket.status, status);
        Ok(tickets::Model {
            status,
            updated_at: now,
            ..ticket
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::mock;
    use chrono::Duration;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn ticket(id: i64, status: TicketStatus) -> tickets::Model {
        tickets::Model {
            id,
            user_id: 7,
            status,
            ticket_type: TicketType::Buy,
            available_at: Utc::now() - Duration::minutes(1),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_set_status_is_conditional_on_read_status() {
        let pool = mock::pool(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![ticket(9, TicketStatus::New)]])
                .append_exec_results([mock::affected(1)]),
        );
        let svc = TicketService::new(pool.clone());

        let updated = svc.set_status(9, TicketStatus::Pending).await.unwrap();
        assert_eq!(updated.status, TicketStatus::Pending);
        assert_eq!(updated.id, 9);

        drop(svc);
        let log = mock::statements(pool);
        assert!(log.contains(r#"UPDATE "user_wheel_tickets" SET "status""#));
        // WHERE 中带上读取到的状态
        assert!(log.contains(r#""user_wheel_tickets"."status" = "#));
        assert!(log.contains("PENDING"));
    }

    #[tokio::test]
    async fn test_set_status_loses_to_concurrent_claim() {
        // 读取时为 NEW，写入前已被抽奖消费
        let pool = mock::pool(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![ticket(9, TicketStatus::New)]])
                .append_exec_results([mock::affected(0)]),
        );
        let svc = TicketService::new(pool);

        let err = svc.set_status(9, TicketStatus::Pending).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_set_status_rejects_used_ticket_without_writing() {
        let pool = mock::pool(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![ticket(9, TicketStatus::Used)]]),
        );
        let svc = TicketService::new(pool.clone());

        let err = svc.set_status(9, TicketStatus::New).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        drop(svc);
        assert!(!mock::statements(pool).contains("UPDATE"));
    }

    #[tokio::test]
    async fn test_usable_tickets_respect_available_at() {
        let pool = mock::pool(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![mock::count_row(2)]])
                .append_exec_results([mock::affected(0)]),
        );

        assert_eq!(TicketService::count_new(pool.as_ref(), 7).await.unwrap(), 2);
        // 未到可用时间的券不会被消费
        assert!(!TicketService::claim(pool.as_ref(), 11).await.unwrap());

        let log = mock::statements(pool);
        assert_eq!(log.matches(r#""user_wheel_tickets"."available_at" <= "#).count(), 2);
    }

    #[test]
    fn test_admin_transition_allowed() {
        assert!(admin_transition_allowed(TicketStatus::New, TicketStatus::Pending));
        assert!(admin_transition_allowed(TicketStatus::Pending, TicketStatus::New));
        assert!(!admin_transition_allowed(TicketStatus::Used, TicketStatus::New));
        assert!(!admin_transition_allowed(TicketStatus::New, TicketStatus::Used));
        assert!(!admin_transition_allowed(TicketStatus::New, TicketStatus::New));
    }
}
