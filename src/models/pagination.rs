//! 分页、排序与语言相关的查询参数

use sea_orm::Order;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// 通用列表查询参数
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// 页码 (默认 1)
    pub page: Option<u64>,
    /// 每页数量 (默认 20，最大 100)
    pub limit: Option<u64>,
    /// 排序字段，未知字段回退为 created_at
    pub sort_by: Option<String>,
    /// asc | desc (默认 desc)
    pub sort_direction: Option<SortDirection>,
    /// 语言，例如 en
    pub locale: Option<String>,
}

impl ListQuery {
    pub fn page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> u64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    pub fn order(&self) -> Order {
        match self.sort_direction.unwrap_or_default() {
            SortDirection::Asc => Order::Asc,
            SortDirection::Desc => Order::Desc,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct PageMeta {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
    /// 本页实际条数
    pub item_count: u64,
}

impl PageMeta {
    pub fn new(page: u64, limit: u64, total: u64, item_count: u64) -> Self {
        let limit = limit.max(1);
        Self {
            page,
            limit,
            total,
            total_pages: total.div_ceil(limit),
            item_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, page: u64, limit: u64, total: u64) -> Self {
        let meta = PageMeta::new(page, limit, total, items.len() as u64);
        Self { items, meta }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginatedResponse<U> {
        let items: Vec<U> = self.items.into_iter().map(f).collect();
        PaginatedResponse {
            meta: PageMeta {
                item_count: items.len() as u64,
                ..self.meta
            },
            items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_defaults() {
        let q = ListQuery::default();
        assert_eq!(q.page(), 1);
        assert_eq!(q.limit(), 20);
        assert_eq!(q.order(), Order::Desc);
    }

    #[test]
    fn test_list_query_clamps() {
        let q = ListQuery {
            page: Some(0),
            limit: Some(1000),
            ..Default::default()
        };
        assert_eq!(q.page(), 1);
        assert_eq!(q.limit(), 100);

        let q = ListQuery {
            page: Some(3),
            limit: Some(10),
            sort_direction: Some(SortDirection::Asc),
            ..Default::default()
        };
        assert_eq!(q.page(), 3);
        assert_eq!(q.limit(), 10);
        assert_eq!(q.order(), Order::Asc);
    }

    #[test]
    fn test_page_meta_counts() {
        let meta = PageMeta::new(2, 10, 25, 10);
        assert_eq!(meta.total_pages, 3);
        let meta = PageMeta::new(1, 20, 0, 0);
        assert_eq!(meta.total_pages, 0);
        let meta = PageMeta::new(1, 20, 40, 20);
        assert_eq!(meta.total_pages, 2);
    }

    #[test]
    fn test_paginated_response_item_count_follows_items() {
        let page = PaginatedResponse::new(vec![1, 2, 3], 3, 10, 23);
        assert_eq!(page.meta.item_count, 3);
        let mapped = page.map(|n| n * 2);
        assert_eq!(mapped.items, vec![2, 4, 6]);
        assert_eq!(mapped.meta.item_count, 3);
        assert_eq!(mapped.meta.total, 23);
    }

    #[test]
    fn test_list_query_from_query_string() {
        let q = actix_web::web::Query::<ListQuery>::from_query(
            "page=2&limit=5&sort_by=amount&sort_direction=asc&locale=vi",
        )
        .unwrap()
        .into_inner();
        assert_eq!(q.page(), 2);
        assert_eq!(q.limit(), 5);
        assert_eq!(q.sort_by.as_deref(), Some("amount"));
        assert_eq!(q.locale.as_deref(), Some("vi"));
    }
}
