//! List query and pagination types

use serde::{Deserialize, Serialize};

/// Paginated list response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    /// Page of records
    pub data: Vec<T>,
    /// Total record count across all pages
    pub total: u64,
    /// Current page (1-based)
    pub page: u32,
    /// Page size
    pub limit: u32,
    /// Total page count
    pub total_pages: u32,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, total: u64, page: u32, limit: u32) -> Self {
        let total_pages = if limit > 0 {
            ((total as f64) / (limit as f64)).ceil() as u32
        } else {
            1
        };

        Self {
            data,
            total,
            page,
            limit,
            total_pages,
        }
    }

}

/// Clamp a raw `page`/`limit` query pair to sane values.
///
/// Pages are 1-based; `limit` is capped at 100 so one request cannot pull
/// the whole table.
pub fn page_params(page: Option<u32>, limit: Option<u32>, default_limit: u32) -> (u32, u32) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(default_limit).clamp(1, 100);
    (page, limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginated_response() {
        let items = vec!["a", "b", "c"];
        let resp = PaginatedResponse::new(items, 100, 2, 10);

        assert_eq!(resp.total, 100);
        assert_eq!(resp.page, 2);
        assert_eq!(resp.total_pages, 10);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let resp = PaginatedResponse::new(vec![1, 2, 3], 21, 1, 10);
        assert_eq!(resp.total_pages, 3);
    }

    #[test]
    fn test_page_params() {
        assert_eq!(page_params(None, None, 10), (1, 10));
        assert_eq!(page_params(Some(0), Some(0), 10), (1, 1));
        assert_eq!(page_params(Some(3), Some(500), 10), (3, 100));
        assert_eq!(page_params(Some(2), Some(15), 10), (2, 15));
    }
}
