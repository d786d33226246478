use crate::database::DbPool;
use crate::config::ReferralConfig;
use crate::entities::{user_entity as users, user_referral_entity as referrals};
use crate::error::{AppError, AppResult};
use crate::models::{
    Currency, ListQuery, PaginatedResponse, ReferralResponse, TicketType, TransactionAction,
};
use crate::services::{LedgerEntry, LedgerService, TicketService};
use crate::utils::{paginate_select, resolve_sort};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait,
    PaginatorTrait, QueryFilter, Set,
};

const REF_SOURCE: &str = "user_referrals";

#[derive(Clone)]
pub struct ReferralService {
    pool: DbPool,
    config: ReferralConfig,
}

impl ReferralService {
    pub fn new(pool: DbPool, config: ReferralConfig) -> Self {
        Self { pool, config }
    }

    /// 按推荐码查找推荐人，未知推荐码直接拒绝
    pub async fn find_referrer<C: ConnectionTrait>(conn: &C, code: &str) -> AppResult<users::Model> {
        users::Entity::find()
            .filter(users::Column::ReferralCode.eq(code.trim().to_uppercase()))
            .filter(users::Column::DeletedAt.is_null())
            .one(conn)
            .await?
            .ok_or_else(|| AppError::ValidationError("Referral code is invalid".to_string()))
    }

    /// 记录推荐关系并发放双方奖励
    ///
    /// 需在注册事务内调用；同一被推荐人只会记录一次。
    pub async fn apply<C: ConnectionTrait>(
        &self,
        conn: &C,
        referrer_id: i64,
        referred_id: i64,
    ) -> AppResult<referrals::Model> {
        if referrer_id == referred_id {
            return Err(AppError::ValidationError(
                "Cannot refer yourself".to_string(),
            ));
        }
        let exists = referrals::Entity::find()
            .filter(referrals::Column::ReferredId.eq(referred_id))
            .count(conn)
            .await?;
        if exists > 0 {
            return Err(AppError::ValidationError(
                "User has already been referred".to_string(),
            ));
        }

        let record = referrals::ActiveModel {
            referrer_id: Set(referrer_id),
            referred_id: Set(referred_id),
            ..Default::default()
        }
        .insert(conn)
        .await?;

        if self.config.referrer_reward > 0 {
            LedgerService::apply(
                conn,
                LedgerEntry::credit(
                    referrer_id,
                    Currency::Point,
                    self.config.referrer_reward,
                    TransactionAction::Referral,
                )
                .with_ref(REF_SOURCE, record.id),
            )
            .await?;
        }
        if self.config.referred_reward > 0 {
            LedgerService::apply(
                conn,
                LedgerEntry::credit(
                    referred_id,
                    Currency::Point,
                    self.config.referred_reward,
                    TransactionAction::Referred,
                )
                .with_ref(REF_SOURCE, record.id),
            )
            .await?;
        }
        if self.config.referrer_tickets > 0 {
            TicketService::mint(conn, referrer_id, TicketType::Referral, self.config.referrer_tickets)
                .await?;
        }

        log::info!("User {referred_id} joined via referral of user {referrer_id}");
        Ok(record)
    }

    /// 当前用户推荐的用户列表
    pub async fn list_referred(
        &self,
        user_id: i64,
        query: &ListQuery,
    ) -> AppResult<PaginatedResponse<ReferralResponse>> {
        let select = referrals::Entity::find().filter(referrals::Column::ReferrerId.eq(user_id));
        let sort = resolve_sort(
            query.sort_by.as_deref(),
            &[("created_at", referrals::Column::CreatedAt)],
            referrals::Column::CreatedAt,
        );
        let page = paginate_select(self.pool.as_ref(), select, query, sort).await?;

        let ids: Vec<i64> = page.items.iter().map(|r| r.referred_id).collect();
        let referred = users::Entity::find()
            .filter(users::Column::Id.is_in(ids))
            .all(self.pool.as_ref())
            .await?;

        Ok(page.map(|r| {
            let user = referred.iter().find(|u| u.id == r.referred_id);
            ReferralResponse {
                id: r.id,
                user_id: r.referred_id,
                name: user.map(|u| u.name.clone()).unwrap_or_default(),
                email: user.map(|u| u.email.clone()).unwrap_or_default(),
                created_at: r.created_at,
            }
        }))
    }
}
