//! Common API types: response envelope and pagination

use serde::{Deserialize, Serialize};

/// Standard response envelope: `{"success": true, "data": ...}`
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
        }
    }
}

/// Pagination query parameters (1-based page)
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct PaginationQuery {
    pub page: u32,
    pub limit: u32,
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self { page: 1, limit: 10 }
    }
}

impl PaginationQuery {
    /// Clamp to sane bounds: page >= 1, 1 <= limit <= 100
    pub fn normalized(self) -> Self {
        Self {
            page: self.page.max(1),
            limit: self.limit.clamp(1, 100),
        }
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.limit)
    }
}

/// Pagination metadata returned alongside list data
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
}

impl PaginationMeta {
    pub fn new(query: PaginationQuery, total: u64) -> Self {
        let total_pages = (total.div_ceil(u64::from(query.limit))) as u32;
        Self {
            page: query.page,
            limit: query.limit,
            total,
            total_pages,
        }
    }
}

/// Paginated response: `{"success": true, "data": [...], "pagination": {...}}`
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub success: bool,
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, query: PaginationQuery, total: u64) -> Self {
        Self {
            success: true,
            data,
            pagination: PaginationMeta::new(query, total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults() {
        let q = PaginationQuery::default();
        assert_eq!(q.page, 1);
        assert_eq!(q.limit, 10);
        assert_eq!(q.offset(), 0);
    }

    #[test]
    fn test_pagination_normalization() {
        let q = PaginationQuery { page: 0, limit: 500 }.normalized();
        assert_eq!(q.page, 1);
        assert_eq!(q.limit, 100);

        let q = PaginationQuery { page: 3, limit: 25 }.normalized();
        assert_eq!(q.offset(), 50);
    }

    #[test]
    fn test_pagination_meta_total_pages() {
        let q = PaginationQuery { page: 1, limit: 10 };
        assert_eq!(PaginationMeta::new(q, 0).total_pages, 0);
        assert_eq!(PaginationMeta::new(q, 1).total_pages, 1);
        assert_eq!(PaginationMeta::new(q, 10).total_pages, 1);
        assert_eq!(PaginationMeta::new(q, 11).total_pages, 2);
    }
}
