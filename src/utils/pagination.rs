use crate::error::AppResult;
use crate::models::{ListQuery, PaginatedResponse};
use sea_orm::{ConnectionTrait, EntityTrait, PaginatorTrait, QueryOrder, Select};

/// 在白名单中解析排序字段，未命中时使用 fallback
pub fn resolve_sort<C: Copy>(sort_by: Option<&str>, allowed: &[(&str, C)], fallback: C) -> C {
    sort_by
        .and_then(|key| allowed.iter().find(|(name, _)| *name == key))
        .map(|(_, col)| *col)
        .unwrap_or(fallback)
}

/// 对查询执行排序与分页，返回当前页与元信息
pub async fn paginate_select<E, C>(
    db: &C,
    select: Select<E>,
    query: &ListQuery,
    sort: E::Column,
) -> AppResult<PaginatedResponse<E::Model>>
where
    E: EntityTrait,
    E::Model: Send + Sync + 'static,
    C: ConnectionTrait,
{
    let paginator = select.order_by(sort, query.order()).paginate(db, query.limit());
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(query.page() - 1).await?;

    Ok(PaginatedResponse::new(
        items,
        query.page(),
        query.limit(),
        total,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Col {
        CreatedAt,
        Amount,
    }

    #[test]
    fn test_resolve_sort_whitelist() {
        let allowed = [("created_at", Col::CreatedAt), ("amount", Col::Amount)];
        assert_eq!(resolve_sort(Some("amount"), &allowed, Col::CreatedAt), Col::Amount);
        assert_eq!(
            resolve_sort(Some("password_hash"), &allowed, Col::CreatedAt),
            Col::CreatedAt
        );
        assert_eq!(resolve_sort(None, &allowed, Col::CreatedAt), Col::CreatedAt);
    }
}
