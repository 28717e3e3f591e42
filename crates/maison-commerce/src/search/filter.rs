//! Product listing filters.

use crate::catalog::ProductStatus;
use crate::ids::CategoryId;
use maison_db::Value;
use serde::{Deserialize, Serialize};

/// Storefront listing filter.
///
/// Every field is optional; an empty filter matches every product. SQL is
/// generated against the `products` table aliased as `p`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProductFilter {
    /// Category and its descendants (OR).
    pub category_ids: Vec<CategoryId>,
    /// Minimum price in minor units, inclusive. Prices are per variant,
    /// falling back to the product price where a variant has none.
    pub min_price_cents: Option<i64>,
    /// Maximum price in minor units, inclusive.
    pub max_price_cents: Option<i64>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub brand: Option<String>,
    /// Free-text match against name, description and brand.
    pub text: Option<String>,
    /// Only products with at least one variant in stock.
    pub in_stock_only: bool,
    pub featured_only: bool,
    /// Restrict to one status. Storefront listings use `Active`.
    pub status: Option<ProductStatus>,
}

impl ProductFilter {
    /// Filter for the public storefront: active products only.
    pub fn storefront() -> Self {
        Self {
            status: Some(ProductStatus::Active),
            ..Self::default()
        }
    }

    pub fn with_categories(mut self, ids: Vec<CategoryId>) -> Self {
        self.category_ids = ids;
        self
    }

    pub fn with_price_range(mut self, min: Option<i64>, max: Option<i64>) -> Self {
        self.min_price_cents = min;
        self.max_price_cents = max;
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        let text = text.trim();
        self.text = (!text.is_empty()).then(|| text.to_string());
        self
    }

    /// Build the WHERE fragment and its bound parameters.
    ///
    /// Returns `"1=1"` when no condition applies.
    pub fn to_sql(&self) -> (String, Vec<Value>) {
        let mut clauses: Vec<String> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if let Some(status) = self.status {
            clauses.push("p.status = ?".into());
            values.push(status.as_str().into());
        }

        if !self.category_ids.is_empty() {
            let placeholders = vec!["?"; self.category_ids.len()].join(", ");
            clauses.push(format!("p.category_id IN ({placeholders})"));
            values.extend(self.category_ids.iter().map(Value::from));
        }

        if let Some(brand) = non_blank(&self.brand) {
            clauses.push("p.brand = ? COLLATE NOCASE".into());
            values.push(brand.into());
        }

        if let Some(text) = non_blank(&self.text) {
            let pattern = format!("%{}%", escape_like(text));
            clauses.push(
                "(p.name LIKE ? ESCAPE '\\' OR p.description LIKE ? ESCAPE '\\' \
                 OR p.brand LIKE ? ESCAPE '\\')"
                    .into(),
            );
            values.push(pattern.clone().into());
            values.push(pattern.clone().into());
            values.push(pattern.into());
        }

        if self.featured_only {
            clauses.push("p.featured = 1".into());
        }

        // Size, color, stock and price must hold for the same variant.
        let mut variant_clauses: Vec<&str> = Vec::new();
        if let Some(min) = self.min_price_cents {
            variant_clauses.push("COALESCE(v.price_cents, p.price_cents) >= ?");
            values.push(min.into());
        }
        if let Some(max) = self.max_price_cents {
            variant_clauses.push("COALESCE(v.price_cents, p.price_cents) <= ?");
            values.push(max.into());
        }
        if let Some(size) = non_blank(&self.size) {
            variant_clauses.push("v.size = ? COLLATE NOCASE");
            values.push(size.into());
        }
        if let Some(color) = non_blank(&self.color) {
            variant_clauses.push("v.color = ? COLLATE NOCASE");
            values.push(color.into());
        }
        if self.in_stock_only {
            variant_clauses.push("v.stock > 0");
        }
        if !variant_clauses.is_empty() {
            clauses.push(format!(
                "EXISTS (SELECT 1 FROM product_variants v WHERE v.product_id = p.id AND {})",
                variant_clauses.join(" AND ")
            ));
        }

        if clauses.is_empty() {
            return ("1=1".to_string(), values);
        }
        (clauses.join(" AND "), values)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter_matches_all() {
        let (sql, values) = ProductFilter::default().to_sql();
        assert_eq!(sql, "1=1");
        assert!(values.is_empty());
    }

    #[test]
    fn test_price_and_category_sql() {
        let filter = ProductFilter::storefront()
            .with_categories(vec![CategoryId::new("c1"), CategoryId::new("c2")])
            .with_price_range(Some(1000), Some(5000));
        let (sql, values) = filter.to_sql();
        assert!(sql.contains("p.status = ?"));
        assert!(sql.contains("p.category_id IN (?, ?)"));
        assert!(sql.contains("COALESCE(v.price_cents, p.price_cents) >= ?"));
        assert!(sql.contains("COALESCE(v.price_cents, p.price_cents) <= ?"));
        assert!(!sql.contains("AND p.price_cents"));
        assert_eq!(values.len(), 5);
        assert_eq!(values[0], Value::Text("active".into()));
        assert_eq!(values[3], Value::Integer(1000));
        assert_eq!(values[4], Value::Integer(5000));
    }

    #[test]
    fn test_price_range_shares_the_variant_exists() {
        let filter = ProductFilter {
            size: Some("L".into()),
            ..ProductFilter::default()
        }
        .with_price_range(None, Some(2000));
        let (sql, values) = filter.to_sql();
        assert_eq!(sql.matches("EXISTS").count(), 1);
        assert!(sql.contains("COALESCE(v.price_cents, p.price_cents) <= ? AND v.size = ? COLLATE NOCASE"));
        assert_eq!(values, vec![Value::Integer(2000), Value::Text("L".into())]);
    }

    #[test]
    fn test_variant_conditions_share_one_exists() {
        let filter = ProductFilter {
            size: Some("M".into()),
            color: Some("Black".into()),
            in_stock_only: true,
            ..ProductFilter::default()
        };
        let (sql, values) = filter.to_sql();
        assert_eq!(sql.matches("EXISTS").count(), 1);
        assert!(sql.contains("v.size = ? COLLATE NOCASE AND v.color = ? COLLATE NOCASE AND v.stock > 0"));
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn test_text_filter_escapes_wildcards() {
        let filter = ProductFilter::default().with_text(" 100%_linen ");
        let (sql, values) = filter.to_sql();
        assert!(sql.contains("p.name LIKE ?"));
        assert_eq!(values.len(), 3);
        assert_eq!(values[0], Value::Text("%100\\%\\_linen%".into()));

        let blank = ProductFilter::default().with_text("   ");
        assert!(blank.text.is_none());
    }
}
