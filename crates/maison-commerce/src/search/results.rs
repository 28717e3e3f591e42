//! Listing results and pagination.

use serde::{Deserialize, Serialize};

/// Pagination info.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    /// Current page (1-indexed).
    pub page: i64,
    pub per_page: i64,
    /// Total number of matching items.
    pub total: i64,
    /// Total number of pages, at least 1.
    pub total_pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    pub fn new(page: i64, per_page: i64, total: i64) -> Self {
        let per_page = per_page.max(1);
        let total_pages = if total <= 0 {
            1
        } else {
            (total + per_page - 1) / per_page
        };

        Self {
            page,
            per_page,
            total,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }

    /// Get start item number (1-indexed), 0 when empty.
    pub fn start_item(&self) -> i64 {
        if self.total == 0 {
            0
        } else {
            self.offset().saturating_add(1)
        }
    }

    pub fn end_item(&self) -> i64 {
        self.page.saturating_mul(self.per_page).min(self.total)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(1, super::query::DEFAULT_PER_PAGE, 0)
    }
}

/// A page of results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResults<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> SearchResults<T> {
    pub fn new(items: Vec<T>, pagination: Pagination) -> Self {
        Self { items, pagination }
    }

    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            pagination: Pagination::default(),
        }
    }

    /// Transform every item, keeping pagination.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> SearchResults<U> {
        SearchResults {
            items: self.items.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_basics() {
        let p = Pagination::new(2, 10, 45);
        assert_eq!(p.total_pages, 5);
        assert!(p.has_next);
        assert!(p.has_prev);
        assert_eq!(p.offset(), 10);
        assert_eq!(p.start_item(), 11);
        assert_eq!(p.end_item(), 20);
    }

    #[test]
    fn test_pagination_last_and_empty() {
        let last = Pagination::new(5, 10, 45);
        assert!(!last.has_next);
        assert_eq!(last.end_item(), 45);

        let empty = Pagination::new(1, 24, 0);
        assert_eq!(empty.total_pages, 1);
        assert!(!empty.has_next);
        assert_eq!(empty.start_item(), 0);
    }

    #[test]
    fn test_pagination_huge_page_saturates() {
        let p = Pagination::new(i64::MAX, 100, 3);
        assert_eq!(p.offset(), i64::MAX);
        assert_eq!(p.start_item(), i64::MAX);
        assert_eq!(p.end_item(), 3);
        assert!(!p.has_next);
    }

    #[test]
    fn test_results_map() {
        let results = SearchResults::new(vec![1, 2, 3], Pagination::new(1, 10, 3));
        let mapped = results.map(|n| n * 2);
        assert_eq!(mapped.items, vec![2, 4, 6]);
        assert_eq!(mapped.pagination.total, 3);
    }
}
