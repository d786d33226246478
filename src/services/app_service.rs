use crate::database::DbPool;
use crate::config::AppConfig;
use crate::entities::{
    app_entity as apps, app_tag_entity as app_tags, tag_entity as tags,
    user_entity as users, user_transaction_entity as txs,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    AffectedResponse, AppFilter, AppResponse, AppStatus, AppStatusCount, CreateAppRequest,
    Currency, ListQuery, OpenAppResponse, PaginatedResponse, TransactionAction,
    UpdateAppRequest,
};
use crate::services::{LedgerEntry, LedgerService, MetadataService, tag_response};
use crate::utils::{
    merge_localized, normalize_locale, paginate_select, resolve_localized, resolve_sort,
    unique_slug,
};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait,
    IntoActiveModel, Iterable, PaginatorTrait, QueryFilter, QuerySelect, Select, Set,
    TransactionTrait,
};
use std::collections::HashSet;

const REF_SOURCE: &str = "apps";

const SORTABLE: &[(&str, apps::Column)] = &[
    ("created_at", apps::Column::CreatedAt),
    ("updated_at", apps::Column::UpdatedAt),
    ("reward", apps::Column::Reward),
    ("slug", apps::Column::Slug),
];

fn validate_url(url: &str) -> AppResult<()> {
    let url = url.trim();
    if !(url.starts_with("https://") || url.starts_with("http://")) || url.len() > 2048 {
        return Err(AppError::ValidationError("App url is invalid".to_string()));
    }
    Ok(())
}

fn validate_reward(reward: Option<i64>) -> AppResult<()> {
    if reward.is_some_and(|r| r < 0) {
        return Err(AppError::ValidationError("Reward must not be negative".to_string()));
    }
    Ok(())
}

#[derive(Clone)]
pub struct AppService {
    pool: DbPool,
    app: AppConfig,
}

impl AppService {
    pub fn new(pool: DbPool, app: AppConfig) -> Self {
        Self { pool, app }
    }

    fn locale<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        normalize_locale(requested, &self.app.languages, &self.app.main_language)
    }

    fn filtered(filter: &AppFilter) -> Select<apps::Entity> {
        let mut select = apps::Entity::find().filter(apps::Column::DeletedAt.is_null());
        if let Some(tag_id) = filter.tag_id {
            select = select.filter(
                apps::Column::Id.in_subquery(
                    sea_orm::sea_query::Query::select()
                        .column(app_tags::Column::AppId)
                        .from(app_tags::Entity)
                        .and_where(app_tags::Column::TagId.eq(tag_id))
                        .to_owned(),
                ),
            );
        }
        select
    }

    /// 填充标签与领取状态
    async fn populate(
        &self,
        list: Vec<apps::Model>,
        locale: &str,
        viewer: Option<i64>,
    ) -> AppResult<Vec<AppResponse>> {
        let ids: Vec<i64> = list.iter().map(|a| a.id).collect();
        let links = app_tags::Entity::find()
            .filter(app_tags::Column::AppId.is_in(ids.clone()))
            .all(self.pool.as_ref())
            .await?;
        let tag_ids: Vec<i64> = links.iter().map(|l| l.tag_id).collect();
        let tag_list = tags::Entity::find()
            .filter(tags::Column::Id.is_in(tag_ids))
            .filter(tags::Column::DeletedAt.is_null())
            .all(self.pool.as_ref())
            .await?;

        let received: HashSet<i64> = match viewer {
            Some(user_id) => txs::Entity::find()
                .filter(txs::Column::UserId.eq(user_id))
                .filter(txs::Column::Action.eq(TransactionAction::OpenApp))
                .filter(txs::Column::AppId.is_in(ids))
                .all(self.pool.as_ref())
                .await?
                .into_iter()
                .filter_map(|t| t.app_id)
                .collect(),
            None => HashSet::new(),
        };

        let main = self.app.main_language.as_str();
        Ok(list
            .into_iter()
            .map(|a| {
                let tags = links
                    .iter()
                    .filter(|l| l.app_id == a.id)
                    .filter_map(|l| tag_list.iter().find(|t| t.id == l.tag_id))
                    .map(|t| tag_response(t.clone(), locale, main))
                    .collect();
                AppResponse {
                    id: a.id,
                    name: resolve_localized(&a.name, Some(locale), main),
                    short_description: resolve_localized(&a.short_description, Some(locale), main),
                    slug: a.slug,
                    url: a.url,
                    image: a.image,
                    status: a.status,
                    reward: a.reward,
                    tags,
                    is_received_reward: viewer.map(|_| received.contains(&a.id)),
                    name_i18n: a.name,
                    short_description_i18n: a.short_description,
                    created_at: a.created_at,
                    updated_at: a.updated_at,
                }
            })
            .collect())
    }

    async fn populate_one(
        &self,
        app: apps::Model,
        locale: &str,
        viewer: Option<i64>,
    ) -> AppResult<AppResponse> {
        self.populate(vec![app], locale, viewer)
            .await?
            .pop()
            .ok_or_else(|| AppError::InternalError("App population failed".to_string()))
    }

    async fn list_page(
        &self,
        select: Select<apps::Entity>,
        query: &ListQuery,
        viewer: Option<i64>,
    ) -> AppResult<PaginatedResponse<AppResponse>> {
        let sort = resolve_sort(query.sort_by.as_deref(), SORTABLE, apps::Column::CreatedAt);
        let page = paginate_select(self.pool.as_ref(), select, query, sort).await?;
        let locale = self.locale(query.locale.as_deref()).to_string();
        let items = self.populate(page.items, &locale, viewer).await?;
        Ok(PaginatedResponse {
            items,
            meta: page.meta,
        })
    }

    // -----------------------------
    // 前台
    // -----------------------------

    /// 仅展示已审核通过的应用
    pub async fn list(
        &self,
        user_id: i64,
        query: &ListQuery,
        filter: &AppFilter,
    ) -> AppResult<PaginatedResponse<AppResponse>> {
        let select = Self::filtered(filter).filter(apps::Column::Status.eq(AppStatus::Approved));
        self.list_page(select, query, Some(user_id)).await
    }

    async fn find_approved<C: ConnectionTrait>(conn: &C, id_or_slug: &str) -> AppResult<apps::Model> {
        let mut select = apps::Entity::find()
            .filter(apps::Column::DeletedAt.is_null())
            .filter(apps::Column::Status.eq(AppStatus::Approved));
        select = match id_or_slug.parse::<i64>() {
            Ok(id) => select.filter(apps::Column::Id.eq(id)),
            Err(_) => select.filter(apps::Column::Slug.eq(id_or_slug)),
        };
        select
            .one(conn)
            .await?
            .ok_or_else(|| AppError::NotFound("App not found".to_string()))
    }

    pub async fn get(&self, user_id: i64, id_or_slug: &str, locale: Option<&str>) -> AppResult<AppResponse> {
        let app = Self::find_approved(self.pool.as_ref(), id_or_slug).await?;
        let locale = self.locale(locale).to_string();
        self.populate_one(app, &locale, Some(user_id)).await
    }

    /// 打开应用：每个用户每个应用只奖励一次
    pub async fn open(
        &self,
        user_id: i64,
        id_or_slug: &str,
        origin: Option<String>,
    ) -> AppResult<OpenAppResponse> {
        let txn = self.pool.begin().await?;
        let app = Self::find_approved(&txn, id_or_slug).await?;
        let user = users::Entity::find_by_id(user_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let reward = if app.reward > 0 {
            app.reward
        } else {
            MetadataService::open_app_reward(&txn).await?
        };

        let received = txs::Entity::find()
            .filter(txs::Column::UserId.eq(user_id))
            .filter(txs::Column::Action.eq(TransactionAction::OpenApp))
            .filter(txs::Column::AppId.eq(app.id))
            .count(&txn)
            .await?;
        if received > 0 || reward <= 0 {
            txn.commit().await?;
            return Ok(OpenAppResponse {
                rewarded: false,
                reward: 0,
                balance: user.balance,
            });
        }

        let entry = LedgerService::apply(
            &txn,
            LedgerEntry::credit(user_id, Currency::Point, reward, TransactionAction::OpenApp)
                .with_app(app.id)
                .with_ref(REF_SOURCE, app.id)
                .with_origin(origin),
        )
        .await?;
        txn.commit().await?;

        log::info!("User {user_id} received {reward} points for opening app {}", app.id);
        Ok(OpenAppResponse {
            rewarded: true,
            reward,
            balance: entry.balance_after,
        })
    }

    // -----------------------------
    // 管理端
    // -----------------------------

    pub async fn admin_list(
        &self,
        query: &ListQuery,
        filter: &AppFilter,
    ) -> AppResult<PaginatedResponse<AppResponse>> {
        let mut select = Self::filtered(filter);
        if let Some(status) = filter.status {
            select = select.filter(apps::Column::Status.eq(status));
        }
        self.list_page(select, query, None).await
    }

    async fn find_any(&self, id: i64) -> AppResult<apps::Model> {
        apps::Entity::find_by_id(id)
            .filter(apps::Column::DeletedAt.is_null())
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("App not found".to_string()))
    }

    pub async fn admin_get(&self, id: i64, locale: Option<&str>) -> AppResult<AppResponse> {
        let app = self.find_any(id).await?;
        let locale = self.locale(locale).to_string();
        self.populate_one(app, &locale, None).await
    }

    async fn replace_tags<C: ConnectionTrait>(conn: &C, app_id: i64, tag_ids: &[i64]) -> AppResult<()> {
        let unique: Vec<i64> = tag_ids
            .iter()
            .copied()
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let found = tags::Entity::find()
            .filter(tags::Column::Id.is_in(unique.clone()))
            .filter(tags::Column::DeletedAt.is_null())
            .count(conn)
            .await?;
        if found != unique.len() as u64 {
            return Err(AppError::ValidationError("Some tags do not exist".to_string()));
        }

        app_tags::Entity::delete_many()
            .filter(app_tags::Column::AppId.eq(app_id))
            .exec(conn)
            .await?;
        for tag_id in unique {
            app_tags::ActiveModel {
                app_id: Set(app_id),
                tag_id: Set(tag_id),
            }
            .insert(conn)
            .await?;
        }
        Ok(())
    }

    pub async fn admin_create(
        &self,
        admin_id: i64,
        req: CreateAppRequest,
        locale: Option<&str>,
    ) -> AppResult<AppResponse> {
        if req.name.trim().is_empty() {
            return Err(AppError::ValidationError("App name is required".to_string()));
        }
        validate_url(&req.url)?;
        validate_reward(req.reward)?;
        let locale = self.locale(locale).to_string();

        let name = merge_localized(None, req.name.trim(), &locale);
        let slug_source = resolve_localized(&name, Some(&self.app.main_language), &self.app.main_language);

        let txn = self.pool.begin().await?;
        let slug = unique_slug::<apps::Entity, _>(
            &txn,
            &slug_source,
            apps::Column::Slug,
            apps::Column::Id,
            None,
        )
        .await?;
        let app = apps::ActiveModel {
            name: Set(name),
            short_description: Set(merge_localized(
                None,
                req.short_description.as_deref().unwrap_or_default(),
                &locale,
            )),
            slug: Set(slug),
            url: Set(req.url.trim().to_string()),
            image: Set(req.image),
            status: Set(req.status.unwrap_or(AppStatus::Draft)),
            reward: Set(req.reward.unwrap_or(0)),
            created_by: Set(Some(admin_id)),
            updated_by: Set(Some(admin_id)),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        Self::replace_tags(&txn, app.id, &req.tag_ids).await?;
        txn.commit().await?;

        log::info!("App {} created by admin {admin_id}", app.id);
        self.populate_one(app, &locale, None).await
    }

    pub async fn admin_update(
        &self,
        id: i64,
        admin_id: i64,
        req: UpdateAppRequest,
        locale: Option<&str>,
    ) -> AppResult<AppResponse> {
        if let Some(url) = req.url.as_deref() {
            validate_url(url)?;
        }
        validate_reward(req.reward)?;
        let locale = self.locale(locale).to_string();
        let app = self.find_any(id).await?;

        let txn = self.pool.begin().await?;
        let mut am = app.clone().into_active_model();
        if let Some(name) = req.name.as_deref().map(str::trim) {
            if name.is_empty() {
                return Err(AppError::ValidationError("App name is required".to_string()));
            }
            am.name = Set(merge_localized(Some(&app.name), name, &locale));
            if locale == self.app.main_language {
                am.slug = Set(unique_slug::<apps::Entity, _>(
                    &txn,
                    name,
                    apps::Column::Slug,
                    apps::Column::Id,
                    Some(id),
                )
                .await?);
            }
        }
        if let Some(d) = req.short_description.as_deref() {
            am.short_description = Set(merge_localized(Some(&app.short_description), d, &locale));
        }
        if let Some(url) = req.url {
            am.url = Set(url.trim().to_string());
        }
        if let Some(image) = req.image {
            am.image = Set(Some(image));
        }
        if let Some(status) = req.status {
            am.status = Set(status);
        }
        if let Some(reward) = req.reward {
            am.reward = Set(reward);
        }
        am.updated_by = Set(Some(admin_id));
        am.updated_at = Set(Utc::now());
        let app = am.update(&txn).await?;

        if let Some(tag_ids) = &req.tag_ids {
            Self::replace_tags(&txn, id, tag_ids).await?;
        }
        txn.commit().await?;

        self.populate_one(app, &locale, None).await
    }

    pub async fn delete_many(&self, ids: &[i64]) -> AppResult<AffectedResponse> {
        if ids.is_empty() {
            return Err(AppError::ValidationError("ids is required".to_string()));
        }
        let res = apps::Entity::update_many()
            .col_expr(apps::Column::DeletedAt, Expr::value(Utc::now()))
            .filter(apps::Column::Id.is_in(ids.to_vec()))
            .filter(apps::Column::DeletedAt.is_null())
            .exec(self.pool.as_ref())
            .await?;
        Ok(AffectedResponse {
            affected: res.rows_affected,
        })
    }

    /// 各状态应用数量，没有记录的状态返回 0
    pub async fn count_by_status(&self) -> AppResult<Vec<AppStatusCount>> {
        let rows: Vec<(AppStatus, i64)> = apps::Entity::find()
            .select_only()
            .column(apps::Column::Status)
            .column_as(apps::Column::Id.count(), "count")
            .filter(apps::Column::DeletedAt.is_null())
            .group_by(apps::Column::Status)
            .into_tuple()
            .all(self.pool.as_ref())
            .await?;

        Ok(AppStatus::iter()
            .map(|status| AppStatusCount {
                status,
                count: rows
                    .iter()
                    .find(|(s, _)| *s == status)
                    .map(|(_, c)| (*c).max(0) as u64)
                    .unwrap_or(0),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://t.me/bot").is_ok());
        assert!(validate_url("ftp://example.com").is_err());
        assert!(validate_url("").is_err());
    }

    #[test]
    fn test_validate_reward() {
        assert!(validate_reward(None).is_ok());
        assert!(validate_reward(Some(0)).is_ok());
        assert!(validate_reward(Some(-1)).is_err());
    }
}
