use crate::database::DbPool;
use crate::config::AppConfig;
use crate::entities::tag_entity as tags;
use crate::error::{AppError, AppResult};
use crate::models::{
    AffectedResponse, CreateTagRequest, ListQuery, PaginatedResponse, TagResponse,
    UpdateTagRequest,
};
use crate::utils::{
    merge_localized, normalize_locale, paginate_select, resolve_localized, resolve_sort,
    unique_slug,
};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter,
    Set,
};

pub const TAG_NAME_MAX: usize = 50;
pub const TAG_DESCRIPTION_MAX: usize = 1000;

const SORTABLE: &[(&str, tags::Column)] = &[
    ("created_at", tags::Column::CreatedAt),
    ("slug", tags::Column::Slug),
];

pub fn validate_tag_text(name: Option<&str>, description: Option<&str>) -> AppResult<()> {
    if let Some(name) = name {
        let len = name.trim().chars().count();
        if len == 0 || len > TAG_NAME_MAX {
            return Err(AppError::ValidationError(format!(
                "Tag name must be between 1 and {TAG_NAME_MAX} characters"
            )));
        }
    }
    if let Some(d) = description
        && d.chars().count() > TAG_DESCRIPTION_MAX
    {
        return Err(AppError::ValidationError(format!(
            "Tag description must be at most {TAG_DESCRIPTION_MAX} characters"
        )));
    }
    Ok(())
}

pub fn tag_response(m: tags::Model, locale: &str, main_language: &str) -> TagResponse {
    TagResponse {
        id: m.id,
        name: resolve_localized(&m.name, Some(locale), main_language),
        short_description: resolve_localized(&m.short_description, Some(locale), main_language),
        slug: m.slug,
        name_i18n: m.name,
        short_description_i18n: m.short_description,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

#[derive(Clone)]
pub struct TagService {
    pool: DbPool,
    app: AppConfig,
}

impl TagService {
    pub fn new(pool: DbPool, app: AppConfig) -> Self {
        Self { pool, app }
    }

    fn locale<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        normalize_locale(requested, &self.app.languages, &self.app.main_language)
    }

    fn respond(&self, m: tags::Model, locale: Option<&str>) -> TagResponse {
        tag_response(m, self.locale(locale), &self.app.main_language)
    }

    pub async fn list(&self, query: &ListQuery) -> AppResult<PaginatedResponse<TagResponse>> {
        let select = tags::Entity::find().filter(tags::Column::DeletedAt.is_null());
        let sort = resolve_sort(query.sort_by.as_deref(), SORTABLE, tags::Column::CreatedAt);
        let page = paginate_select(self.pool.as_ref(), select, query, sort).await?;
        let locale = query.locale.as_deref();
        Ok(page.map(|m| self.respond(m, locale)))
    }

    /// 按 id 或 slug 查询
    pub async fn get(&self, id_or_slug: &str, locale: Option<&str>) -> AppResult<TagResponse> {
        let mut select = tags::Entity::find().filter(tags::Column::DeletedAt.is_null());
        select = match id_or_slug.parse::<i64>() {
            Ok(id) => select.filter(tags::Column::Id.eq(id)),
            Err(_) => select.filter(tags::Column::Slug.eq(id_or_slug)),
        };
        let tag = select
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Tag not found".to_string()))?;
        Ok(self.respond(tag, locale))
    }

    pub async fn create(
        &self,
        admin_id: i64,
        req: CreateTagRequest,
        locale: Option<&str>,
    ) -> AppResult<TagResponse> {
        validate_tag_text(Some(&req.name), req.short_description.as_deref())?;
        let locale = self.locale(locale);

        let name = merge_localized(None, req.name.trim(), locale);
        let slug_source = resolve_localized(&name, Some(&self.app.main_language), &self.app.main_language);
        let slug = unique_slug::<tags::Entity, _>(
            self.pool.as_ref(),
            &slug_source,
            tags::Column::Slug,
            tags::Column::Id,
            None,
        )
        .await?;

        let tag = tags::ActiveModel {
            name: Set(name),
            short_description: Set(merge_localized(
                None,
                req.short_description.as_deref().unwrap_or_default(),
                locale,
            )),
            slug: Set(slug),
            created_by: Set(Some(admin_id)),
            updated_by: Set(Some(admin_id)),
            ..Default::default()
        }
        .insert(self.pool.as_ref())
        .await?;

        log::info!("Tag {} created by admin {admin_id}", tag.id);
        Ok(self.respond(tag, Some(locale)))
    }

    /// 只更新请求语言下的文本；修改主语言名称时重新生成 slug
    pub async fn update(
        &self,
        id: i64,
        admin_id: i64,
        req: UpdateTagRequest,
        locale: Option<&str>,
    ) -> AppResult<TagResponse> {
        validate_tag_text(req.name.as_deref(), req.short_description.as_deref())?;
        let locale = self.locale(locale);

        let tag = tags::Entity::find_by_id(id)
            .filter(tags::Column::DeletedAt.is_null())
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Tag not found".to_string()))?;

        let mut am = tag.clone().into_active_model();
        if let Some(name) = req.name.as_deref() {
            am.name = Set(merge_localized(Some(&tag.name), name.trim(), locale));
            if locale == self.app.main_language {
                am.slug = Set(unique_slug::<tags::Entity, _>(
                    self.pool.as_ref(),
                    name.trim(),
                    tags::Column::Slug,
                    tags::Column::Id,
                    Some(id),
                )
                .await?);
            }
        }
        if let Some(d) = req.short_description.as_deref() {
            am.short_description = Set(merge_localized(Some(&tag.short_description), d, locale));
        }
        am.updated_by = Set(Some(admin_id));
        am.updated_at = Set(Utc::now());

        let tag = am.update(self.pool.as_ref()).await?;
        Ok(self.respond(tag, Some(locale)))
    }

    pub async fn delete_many(&self, ids: &[i64]) -> AppResult<AffectedResponse> {
        if ids.is_empty() {
            return Err(AppError::ValidationError("ids is required".to_string()));
        }
        let res = tags::Entity::update_many()
            .col_expr(tags::Column::DeletedAt, Expr::value(Utc::now()))
            .filter(tags::Column::Id.is_in(ids.to_vec()))
            .filter(tags::Column::DeletedAt.is_null())
            .exec(self.pool.as_ref())
            .await?;
        Ok(AffectedResponse {
            affected: res.rows_affected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_tag_text_limits() {
        assert!(validate_tag_text(Some("Games"), None).is_ok());
        assert!(validate_tag_text(Some("  "), None).is_err());
        assert!(validate_tag_text(Some(&"x".repeat(51)), None).is_err());
        assert!(validate_tag_text(None, Some(&"y".repeat(1000))).is_ok());
        assert!(validate_tag_text(None, Some(&"y".repeat(1001))).is_err());
    }

    #[test]
    fn test_tag_response_resolves_locale() {
        let now = Utc::now();
        let m = tags::Model {
            id: 1,
            name: json!({"en": "Games", "vi": "Trò chơi"}),
            short_description: json!({"en": "Play"}),
            slug: "games".into(),
            created_by: None,
            updated_by: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        let r = tag_response(m, "vi", "en");
        assert_eq!(r.name, "Trò chơi");
        assert_eq!(r.short_description, "Play");
        assert_eq!(r.name_i18n["en"], "Games");
    }
}
