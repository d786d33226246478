use crate::database::DbPool;
use crate::entities::notification_entity as notifications;
use crate::error::{AppError, AppResult};
use crate::models::{
    AffectedResponse, CreateNotificationRequest, ListQuery, NotificationFilter,
    NotificationStatus, PaginatedResponse, UnreadCountResponse,
};
use crate::utils::{paginate_select, resolve_sort};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait,
    PaginatorTrait, QueryFilter, Set, TransactionTrait,
};

const SORTABLE: &[(&str, notifications::Column)] = &[
    ("created_at", notifications::Column::CreatedAt),
    ("id", notifications::Column::Id),
];

#[derive(Clone)]
pub struct NotificationService {
    pool: DbPool,
}

impl NotificationService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn create<C: ConnectionTrait>(
        conn: &C,
        user_id: i64,
        name: &str,
        short_description: &str,
        reference: Option<(&str, i64)>,
    ) -> AppResult<notifications::Model> {
        Ok(notifications::ActiveModel {
            user_id: Set(user_id),
            name: Set(name.to_string()),
            short_description: Set(short_description.to_string()),
            status: Set(NotificationStatus::Unread),
            ref_source: Set(reference.map(|(s, _)| s.to_string())),
            ref_id: Set(reference.map(|(_, id)| id)),
            ..Default::default()
        }
        .insert(conn)
        .await?)
    }

    /// 管理端向多个用户发送通知
    pub async fn broadcast(&self, req: CreateNotificationRequest) -> AppResult<AffectedResponse> {
        if req.user_ids.is_empty() {
            return Err(AppError::ValidationError("user_ids is required".to_string()));
        }
        if req.name.trim().is_empty() {
            return Err(AppError::ValidationError("name is required".to_string()));
        }

        let txn = self.pool.begin().await?;
        for user_id in &req.user_ids {
            Self::create(&txn, *user_id, &req.name, &req.short_description, None).await?;
        }
        txn.commit().await?;

        Ok(AffectedResponse {
            affected: req.user_ids.len() as u64,
        })
    }

    pub async fn list(
        &self,
        user_id: i64,
        query: &ListQuery,
        filter: &NotificationFilter,
    ) -> AppResult<PaginatedResponse<notifications::Model>> {
        let mut select = notifications::Entity::find()
            .filter(notifications::Column::UserId.eq(user_id))
            .filter(notifications::Column::Status.ne(NotificationStatus::Deleted));
        if let Some(status) = filter.status {
            select = select.filter(notifications::Column::Status.eq(status));
        }
        let sort = resolve_sort(
            query.sort_by.as_deref(),
            SORTABLE,
            notifications::Column::CreatedAt,
        );
        paginate_select(self.pool.as_ref(), select, query, sort).await
    }

    pub async fn unread_count(&self, user_id: i64) -> AppResult<UnreadCountResponse> {
        let count = notifications::Entity::find()
            .filter(notifications::Column::UserId.eq(user_id))
            .filter(notifications::Column::Status.eq(NotificationStatus::Unread))
            .count(self.pool.as_ref())
            .await?;
        Ok(UnreadCountResponse { count })
    }

    /// 将指定通知标记为已读
    pub async fn mark_read(&self, user_id: i64, ids: &[i64]) -> AppResult<AffectedResponse> {
        if ids.is_empty() {
            return Ok(AffectedResponse { affected: 0 });
        }
        let res = notifications::Entity::update_many()
            .col_expr(
                notifications::Column::Status,
                Expr::value(NotificationStatus::Read),
            )
            .col_expr(notifications::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(notifications::Column::UserId.eq(user_id))
            .filter(notifications::Column::Id.is_in(ids.to_vec()))
            .filter(notifications::Column::Status.eq(NotificationStatus::Unread))
            .exec(self.pool.as_ref())
            .await?;
        Ok(AffectedResponse {
            affected: res.rows_affected,
        })
    }

    pub async fn mark_all_read(&self, user_id: i64) -> AppResult<AffectedResponse> {
        let res = notifications::Entity::update_many()
            .col_expr(
                notifications::Column::Status,
                Expr::value(NotificationStatus::Read),
            )
            .col_expr(notifications::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(notifications::Column::UserId.eq(user_id))
            .filter(notifications::Column::Status.eq(NotificationStatus::Unread))
            .exec(self.pool.as_ref())
            .await?;
        Ok(AffectedResponse {
            affected: res.rows_affected,
        })
    }

    pub async fn delete(&self, user_id: i64, id: i64) -> AppResult<()> {
        let res = notifications::Entity::update_many()
            .col_expr(
                notifications::Column::Status,
                Expr::value(NotificationStatus::Deleted),
            )
            .col_expr(notifications::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(notifications::Column::UserId.eq(user_id))
            .filter(notifications::Column::Id.eq(id))
            .filter(notifications::Column::Status.ne(NotificationStatus::Deleted))
            .exec(self.pool.as_ref())
            .await?;
        if res.rows_affected == 0 {
            return Err(AppError::NotFound("Notification not found".to_string()));
        }
        Ok(())
    }
}
