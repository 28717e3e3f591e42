//! Listing query builder.

use crate::search::ProductFilter;
use maison_db::Value;
use serde::{Deserialize, Serialize};

/// Default page size for listings.
pub const DEFAULT_PER_PAGE: i64 = 24;
/// Largest page size a client may request.
pub const MAX_PER_PAGE: i64 = 100;

/// Sort options for product listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOption {
    /// Newest first.
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    NameAsc,
    /// Featured products first, then newest.
    Featured,
}

impl SortOption {
    /// Parse a query-string value. Unknown values yield `None`.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "newest" => Some(Self::Newest),
            "price_asc" => Some(Self::PriceAsc),
            "price_desc" => Some(Self::PriceDesc),
            "name_asc" => Some(Self::NameAsc),
            "featured" => Some(Self::Featured),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::NameAsc => "name_asc",
            Self::Featured => "featured",
        }
    }

    /// SQL ORDER BY clause. Ties break on id so pages are stable.
    pub fn to_sql(&self) -> &'static str {
        match self {
            Self::Newest => "p.created_at DESC, p.id ASC",
            Self::PriceAsc => "p.price_cents ASC, p.id ASC",
            Self::PriceDesc => "p.price_cents DESC, p.id ASC",
            Self::NameAsc => "p.name COLLATE NOCASE ASC, p.id ASC",
            Self::Featured => "p.featured DESC, p.created_at DESC, p.id ASC",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Newest => "Newest",
            Self::PriceAsc => "Price: Low to High",
            Self::PriceDesc => "Price: High to Low",
            Self::NameAsc => "Name: A-Z",
            Self::Featured => "Featured",
        }
    }
}

/// A product listing query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductQuery {
    pub filter: ProductFilter,
    pub sort: SortOption,
    /// Current page (1-indexed).
    pub page: i64,
    pub per_page: i64,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self::new(ProductFilter::default())
    }
}

impl ProductQuery {
    pub fn new(filter: ProductFilter) -> Self {
        Self {
            filter,
            sort: SortOption::Newest,
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }

    pub fn with_sort(mut self, sort: SortOption) -> Self {
        self.sort = sort;
        self
    }

    /// Set pagination, clamping page to ≥ 1 and per_page to 1..=100.
    pub fn with_pagination(mut self, page: i64, per_page: i64) -> Self {
        self.page = page.max(1);
        self.per_page = per_page.clamp(1, MAX_PER_PAGE);
        self
    }

    /// Offset for SQL LIMIT/OFFSET.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }

    /// Build the page query, selecting every product column.
    pub fn build_sql(&self) -> (String, Vec<Value>) {
        let (where_clause, values) = self.filter.to_sql();
        let sql = format!(
            "SELECT p.* FROM products p WHERE {} ORDER BY {} LIMIT {} OFFSET {}",
            where_clause,
            self.sort.to_sql(),
            self.per_page,
            self.offset()
        );
        (sql, values)
    }

    /// Build the total count query for the same filter.
    pub fn build_count_sql(&self) -> (String, Vec<Value>) {
        let (where_clause, values) = self.filter.to_sql();
        let sql = format!("SELECT COUNT(*) AS count FROM products p WHERE {where_clause}");
        (sql, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_parsing() {
        assert_eq!(SortOption::from_str("PRICE_ASC"), Some(SortOption::PriceAsc));
        assert_eq!(SortOption::from_str("featured"), Some(SortOption::Featured));
        assert_eq!(SortOption::from_str("rating"), None);
        assert_eq!(SortOption::default(), SortOption::Newest);
    }

    #[test]
    fn test_pagination_clamps() {
        let q = ProductQuery::default().with_pagination(0, 1000);
        assert_eq!(q.page, 1);
        assert_eq!(q.per_page, MAX_PER_PAGE);

        let q = ProductQuery::default().with_pagination(3, 0);
        assert_eq!(q.per_page, 1);
        assert_eq!(q.offset(), 2);
    }

    #[test]
    fn test_full_sql() {
        let q = ProductQuery::new(ProductFilter::storefront())
            .with_sort(SortOption::PriceDesc)
            .with_pagination(2, 10);
        let (sql, values) = q.build_sql();
        assert!(sql.starts_with("SELECT p.* FROM products p WHERE p.status = ?"));
        assert!(sql.contains("ORDER BY p.price_cents DESC"));
        assert!(sql.ends_with("LIMIT 10 OFFSET 10"));
        assert_eq!(values.len(), 1);

        let (count_sql, count_values) = q.build_count_sql();
        assert!(count_sql.starts_with("SELECT COUNT(*) AS count FROM products p"));
        assert_eq!(count_values, values);
    }
}
