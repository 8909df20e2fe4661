use serde::{Deserialize, Serialize};

use super::post::PostStatus;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum SortField {
    #[default]
    #[serde(rename = "createdAt")]
    CreatedAt,
    #[serde(rename = "updatedAt")]
    UpdatedAt,
    #[serde(rename = "publishedAt")]
    PublishedAt,
    #[serde(rename = "title")]
    Title,
    #[serde(rename = "viewCount")]
    ViewCount,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Fully resolved list query; `page` and `limit` are always >= 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PostQuery {
    pub(crate) page: u32,
    pub(crate) limit: u32,
    pub(crate) search: String,
    pub(crate) sort_by: SortField,
    pub(crate) sort_order: SortOrder,
    pub(crate) status: Option<PostStatus>,
}

impl PostQuery {
    pub(crate) fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
            search: String::new(),
            sort_by: SortField::default(),
            sort_order: SortOrder::default(),
            status: None,
        }
    }

    pub(crate) fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    /// Trimmed search term, `None` when the text predicate is disabled.
    pub(crate) fn search_term(&self) -> Option<&str> {
        let term = self.search.trim();
        (!term.is_empty()).then_some(term)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PageInfo {
    pub(crate) page: u32,
    pub(crate) limit: u32,
    pub(crate) total: u64,
    pub(crate) total_pages: u64,
}

impl PageInfo {
    pub(crate) fn new(page: u32, limit: u32, total: u64) -> Self {
        let limit = limit.max(1);
        Self {
            page,
            limit,
            total,
            total_pages: total.div_ceil(u64::from(limit)),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Page<T> {
    pub(crate) items: Vec<T>,
    pub(crate) pagination: PageInfo,
}

impl<T> Page<T> {
    pub(crate) fn empty(query: &PostQuery) -> Self {
        Self {
            items: Vec::new(),
            pagination: PageInfo::new(query.page, query.limit, 0),
        }
    }
}
