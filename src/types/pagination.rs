//! Pagination types for list endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::config::{DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Pagination query parameters, shared by every list endpoint.
///
/// `search` does a substring match over the resource's natural text columns.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct PaginationParams {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub search: Option<String>,
}

fn default_page() -> u64 {
    DEFAULT_PAGE_NUMBER
}

fn default_limit() -> u64 {
    DEFAULT_PAGE_SIZE
}

impl PaginationParams {
    /// Calculate offset for database query
    pub fn offset(&self) -> u64 {
        (self.page.saturating_sub(1)) * self.limit()
    }

    /// Get limit capped at maximum
    pub fn limit(&self) -> u64 {
        self.limit.clamp(1, MAX_PAGE_SIZE)
    }

    /// Trimmed search term, if any was supplied
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE_NUMBER,
            limit: DEFAULT_PAGE_SIZE,
            search: None,
        }
    }
}

/// Paginated response envelope:
/// `{items, total, page, limit, totalPages}`
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> Paginated<T> {
    /// Create new paginated response
    pub fn new(items: Vec<T>, params: &PaginationParams, total: u64) -> Self {
        let limit = params.limit();
        let total_pages = if limit > 0 { total.div_ceil(limit) } else { 0 };

        Self {
            items,
            total,
            page: params.page,
            limit,
            total_pages,
        }
    }

    /// Map items to another type, keeping the envelope
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_rounds_up() {
        let params = PaginationParams {
            page: 1,
            limit: 10,
            search: None,
        };
        let page: Paginated<u8> = Paginated::new(vec![], &params, 21);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn limit_is_capped() {
        let params = PaginationParams {
            page: 1,
            limit: 10_000,
            search: None,
        };
        assert_eq!(params.limit(), MAX_PAGE_SIZE);
    }

    #[test]
    fn blank_search_is_ignored() {
        let params = PaginationParams {
            page: 1,
            limit: 10,
            search: Some("   ".to_string()),
        };
        assert_eq!(params.search_term(), None);
    }

    #[test]
    fn offset_uses_capped_limit() {
        let params = PaginationParams {
            page: 3,
            limit: 20,
            search: None,
        };
        assert_eq!(params.offset(), 40);
    }
}
