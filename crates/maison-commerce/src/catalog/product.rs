//! Product and variant types.

use crate::catalog::validate_slug;
use crate::error::CommerceError;
use crate::ids::{CategoryId, ProductId, VariantId};
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Product status in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    /// Product is in draft mode, not visible to customers.
    Draft,
    /// Product is active and visible.
    #[default]
    Active,
    /// Product is archived, not visible but data preserved.
    Archived,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Draft => "draft",
            ProductStatus::Active => "active",
            ProductStatus::Archived => "archived",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(ProductStatus::Draft),
            "active" => Some(ProductStatus::Active),
            "archived" => Some(ProductStatus::Archived),
            _ => None,
        }
    }
}

/// A product in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Unique product identifier.
    pub id: ProductId,
    /// Category this product is listed under.
    pub category_id: Option<CategoryId>,
    /// Product name.
    pub name: String,
    /// URL-friendly slug (unique).
    pub slug: String,
    /// Full description.
    pub description: Option<String>,
    /// Brand or label.
    pub brand: Option<String>,
    /// Base selling price.
    pub price: Money,
    /// Compare-at price (original price for showing discounts).
    pub compare_at_price: Option<Money>,
    /// Product visibility status.
    pub status: ProductStatus,
    /// Shown in featured listings.
    pub featured: bool,
    /// Tags for filtering/search.
    pub tags: Vec<String>,
    /// Image URLs, first one is the cover.
    pub images: Vec<String>,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl Product {
    /// Create a new active product.
    pub fn new(name: impl Into<String>, slug: impl Into<String>, price: Money) -> Self {
        let now = crate::current_timestamp();
        Self {
            id: ProductId::generate(),
            category_id: None,
            name: name.into(),
            slug: slug.into(),
            description: None,
            brand: None,
            price,
            compare_at_price: None,
            status: ProductStatus::Active,
            featured: false,
            tags: Vec::new(),
            images: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if the product is available for purchase.
    pub fn is_available(&self) -> bool {
        self.status == ProductStatus::Active
    }

    /// Check if this product is on sale (compare-at price above price).
    pub fn is_on_sale(&self) -> bool {
        self.compare_at_price
            .map(|cap| cap.amount_cents > self.price.amount_cents)
            .unwrap_or(false)
    }

    /// Whole-number discount percentage if on sale.
    pub fn discount_percentage(&self) -> Option<i64> {
        let cap = self.compare_at_price?;
        if cap.amount_cents <= self.price.amount_cents || cap.amount_cents <= 0 {
            return None;
        }
        let savings = cap.amount_cents - self.price.amount_cents;
        Some(savings.saturating_mul(100) / cap.amount_cents)
    }

    /// Cover image, if any.
    pub fn cover_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Add a tag to this product.
    pub fn add_tag(&mut self, tag: impl AsRef<str>) {
        let tag = tag.as_ref().trim().to_lowercase();
        if !tag.is_empty() && !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
    }

    /// Check fields an admin can edit.
    pub fn validate(&self) -> Result<(), CommerceError> {
        let name = self.name.trim();
        if name.is_empty() || name.chars().count() > 200 {
            return Err(CommerceError::validation(
                "product name must be 1-200 characters",
            ));
        }
        validate_slug(&self.slug)?;
        if !self.price.is_positive() {
            return Err(CommerceError::validation("price must be positive"));
        }
        if let Some(cap) = self.compare_at_price {
            if cap.currency != self.price.currency {
                return Err(CommerceError::CurrencyMismatch {
                    expected: self.price.currency.code().to_string(),
                    got: cap.currency.code().to_string(),
                });
            }
            if !cap.is_positive() {
                return Err(CommerceError::validation(
                    "compare-at price must be positive",
                ));
            }
        }
        if self.description.as_ref().is_some_and(|d| d.chars().count() > 5000) {
            return Err(CommerceError::validation(
                "description must be at most 5000 characters",
            ));
        }
        Ok(())
    }
}

/// A sellable size/colour combination of a product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductVariant {
    /// Unique variant identifier.
    pub id: VariantId,
    /// Parent product ID.
    pub product_id: ProductId,
    /// Stock keeping unit (unique).
    pub sku: String,
    /// Size label (e.g., "M", "32").
    pub size: Option<String>,
    /// Colour name.
    pub color: Option<String>,
    /// Price replacing the product price for this variant.
    pub price_override: Option<Money>,
    /// Units on hand.
    pub stock: i64,
    /// Sort order position.
    pub position: i64,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl ProductVariant {
    /// Create a new variant.
    pub fn new(product_id: ProductId, sku: impl Into<String>, stock: i64) -> Self {
        let now = crate::current_timestamp();
        Self {
            id: VariantId::generate(),
            product_id,
            sku: sku.into(),
            size: None,
            color: None,
            price_override: None,
            stock,
            position: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set size and colour.
    pub fn with_options(mut self, size: Option<&str>, color: Option<&str>) -> Self {
        self.size = size.map(str::to_string);
        self.color = color.map(str::to_string);
        self
    }

    /// Price a customer pays for this variant.
    pub fn effective_price(&self, product: &Product) -> Money {
        self.price_override.unwrap_or(product.price)
    }

    /// Check if a specific quantity is available.
    pub fn can_fulfill(&self, quantity: i64) -> bool {
        quantity > 0 && self.stock >= quantity
    }

    /// Human label such as "M / Black".
    pub fn display_name(&self) -> String {
        let parts: Vec<&str> = [self.size.as_deref(), self.color.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        if parts.is_empty() {
            "Default".to_string()
        } else {
            parts.join(" / ")
        }
    }

    /// Check fields an admin can edit.
    pub fn validate(&self) -> Result<(), CommerceError> {
        let sku = self.sku.trim();
        if sku.is_empty() || sku.len() > 64 {
            return Err(CommerceError::validation("sku must be 1-64 characters"));
        }
        if self.stock < 0 {
            return Err(CommerceError::validation("stock cannot be negative"));
        }
        if self.price_override.is_some_and(|p| !p.is_positive()) {
            return Err(CommerceError::validation("variant price must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;

    fn product() -> Product {
        Product::new("Linen Shirt", "linen-shirt", Money::new(249900, Currency::INR))
    }

    #[test]
    fn test_product_creation() {
        let product = product();
        assert!(product.is_available());
        assert!(product.validate().is_ok());
        assert_eq!(ProductStatus::from_str("ARCHIVED"), Some(ProductStatus::Archived));
    }

    #[test]
    fn test_product_on_sale() {
        let mut product = product();
        product.compare_at_price = Some(Money::new(399900, Currency::INR));
        assert!(product.is_on_sale());
        assert_eq!(product.discount_percentage(), Some(37));

        product.compare_at_price = Some(Money::new(100, Currency::INR));
        assert!(!product.is_on_sale());
        assert_eq!(product.discount_percentage(), None);
    }

    #[test]
    fn test_product_validation() {
        let mut product = product();
        product.price = Money::zero(Currency::INR);
        assert!(product.validate().is_err());

        let mut product = self::product();
        product.compare_at_price = Some(Money::new(100, Currency::USD));
        assert!(matches!(
            product.validate(),
            Err(CommerceError::CurrencyMismatch { .. })
        ));
    }

    #[test]
    fn test_tags_are_normalized() {
        let mut product = product();
        product.add_tag(" Summer ");
        product.add_tag("summer");
        product.add_tag("");
        assert_eq!(product.tags, vec!["summer".to_string()]);
    }

    #[test]
    fn test_variant_price_and_stock() {
        let product = product();
        let mut variant = ProductVariant::new(product.id.clone(), "LS-M-WHT", 3)
            .with_options(Some("M"), Some("White"));

        assert_eq!(variant.effective_price(&product), product.price);
        variant.price_override = Some(Money::new(199900, Currency::INR));
        assert_eq!(variant.effective_price(&product).amount_cents, 199900);

        assert!(variant.can_fulfill(3));
        assert!(!variant.can_fulfill(4));
        assert!(!variant.can_fulfill(0));
        assert_eq!(variant.display_name(), "M / White");
    }
}
