//! Product catalog module.
//!
//! Contains types for products, variants, categories, and stock rules.

mod category;
mod inventory;
mod product;
mod slug;

pub use category::Category;
pub use inventory::AdjustmentReason;
pub use product::{Product, ProductStatus, ProductVariant};
pub use slug::{slugify, validate_slug};
