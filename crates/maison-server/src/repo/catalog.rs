//! Categories, products, variants and stock.

use maison_commerce::catalog::{Category, Product, ProductStatus, ProductVariant};
use maison_commerce::search::{Pagination, ProductQuery, SearchResults};
use maison_commerce::{CategoryId, Currency, Money, ProductId, VariantId};
use maison_db::{params, Db, DbError, Transaction};
use serde::{Deserialize, Serialize};

use super::{corrupt, parse_currency, parse_json, to_json};

// ---- categories ----

#[derive(Deserialize)]
struct CategoryRow {
    id: String,
    parent_id: Option<String>,
    name: String,
    slug: String,
    description: Option<String>,
    image_url: Option<String>,
    position: i64,
    created_at: i64,
    updated_at: i64,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: CategoryId::new(row.id),
            parent_id: row.parent_id.map(CategoryId::new),
            name: row.name,
            slug: row.slug,
            description: row.description,
            image_url: row.image_url,
            position: row.position,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub async fn list_categories(db: &Db) -> Result<Vec<Category>, DbError> {
    let rows: Vec<CategoryRow> = db
        .query_as(
            "SELECT * FROM categories ORDER BY position ASC, name ASC",
            &[],
        )
        .await?;
    Ok(rows.into_iter().map(Category::from).collect())
}

pub async fn find_category(db: &Db, id: &CategoryId) -> Result<Option<Category>, DbError> {
    let row: Option<CategoryRow> = db
        .query_optional("SELECT * FROM categories WHERE id = ?", params![id])
        .await?;
    Ok(row.map(Category::from))
}

pub async fn find_category_by_slug(db: &Db, slug: &str) -> Result<Option<Category>, DbError> {
    let row: Option<CategoryRow> = db
        .query_optional("SELECT * FROM categories WHERE slug = ?", params![slug])
        .await?;
    Ok(row.map(Category::from))
}

pub async fn insert_category(db: &Db, category: &Category) -> Result<(), DbError> {
    db.execute(
        "INSERT INTO categories
             (id, parent_id, name, slug, description, image_url, position, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            &category.id,
            category.parent_id.as_ref(),
            &category.name,
            &category.slug,
            category.description.as_ref(),
            category.image_url.as_ref(),
            category.position,
            category.created_at,
            category.updated_at
        ],
    )
    .await?;
    Ok(())
}

pub async fn update_category(db: &Db, category: &Category) -> Result<(), DbError> {
    let updated = db
        .execute(
            "UPDATE categories SET parent_id = ?, name = ?, slug = ?, description = ?,
                 image_url = ?, position = ?, updated_at = ?
             WHERE id = ?",
            params![
                category.parent_id.as_ref(),
                &category.name,
                &category.slug,
                category.description.as_ref(),
                category.image_url.as_ref(),
                category.position,
                category.updated_at,
                &category.id
            ],
        )
        .await?;
    if updated == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// Check whether products or child categories still point at a category.
pub async fn category_in_use(db: &Db, id: &CategoryId) -> Result<bool, DbError> {
    let references = db
        .scalar_i64(
            "SELECT (SELECT COUNT(*) FROM products WHERE category_id = ?)
                  + (SELECT COUNT(*) FROM categories WHERE parent_id = ?)",
            params![id, id],
        )
        .await?;
    Ok(references > 0)
}

pub async fn delete_category(db: &Db, id: &CategoryId) -> Result<bool, DbError> {
    let removed = db
        .execute("DELETE FROM categories WHERE id = ?", params![id])
        .await?;
    Ok(removed > 0)
}

// ---- products ----

#[derive(Deserialize)]
struct ProductRow {
    id: String,
    category_id: Option<String>,
    name: String,
    slug: String,
    description: Option<String>,
    brand: Option<String>,
    price_cents: i64,
    compare_at_price_cents: Option<i64>,
    currency: String,
    status: String,
    featured: i64,
    tags: String,
    images: String,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<ProductRow> for Product {
    type Error = DbError;

    fn try_from(row: ProductRow) -> Result<Self, DbError> {
        let currency = parse_currency(&row.currency)?;
        let status =
            ProductStatus::from_str(&row.status).ok_or_else(|| corrupt("status", &row.status))?;
        Ok(Product {
            id: ProductId::new(row.id),
            category_id: row.category_id.map(CategoryId::new),
            name: row.name,
            slug: row.slug,
            description: row.description,
            brand: row.brand,
            price: Money::new(row.price_cents, currency),
            compare_at_price: row
                .compare_at_price_cents
                .map(|cents| Money::new(cents, currency)),
            status,
            featured: row.featured != 0,
            tags: parse_json("tags", &row.tags)?,
            images: parse_json("images", &row.images)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_products(rows: Vec<ProductRow>) -> Result<Vec<Product>, DbError> {
    rows.into_iter().map(Product::try_from).collect()
}

/// Run a listing query and its count.
pub async fn list_products(
    db: &Db,
    query: &ProductQuery,
) -> Result<SearchResults<Product>, DbError> {
    let (count_sql, count_values) = query.build_count_sql();
    let total = db.scalar_i64(&count_sql, &count_values).await?;

    let (sql, values) = query.build_sql();
    let rows: Vec<ProductRow> = db.query_as(&sql, &values).await?;

    Ok(SearchResults::new(
        into_products(rows)?,
        Pagination::new(query.page, query.per_page, total),
    ))
}

pub async fn find_product(db: &Db, id: &ProductId) -> Result<Option<Product>, DbError> {
    db.query_optional::<ProductRow>("SELECT * FROM products WHERE id = ?", params![id])
        .await?
        .map(Product::try_from)
        .transpose()
}

pub async fn find_product_by_slug(db: &Db, slug: &str) -> Result<Option<Product>, DbError> {
    db.query_optional::<ProductRow>("SELECT * FROM products WHERE slug = ?", params![slug])
        .await?
        .map(Product::try_from)
        .transpose()
}

pub async fn insert_product(db: &Db, product: &Product) -> Result<(), DbError> {
    db.execute(
        "INSERT INTO products
             (id, category_id, name, slug, description, brand, price_cents,
              compare_at_price_cents, currency, status, featured, tags, images,
              created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            &product.id,
            product.category_id.as_ref(),
            &product.name,
            &product.slug,
            product.description.as_ref(),
            product.brand.as_ref(),
            product.price.amount_cents,
            product.compare_at_price.map(|m| m.amount_cents),
            product.price.currency.code(),
            product.status.as_str(),
            product.featured,
            to_json(&product.tags)?,
            to_json(&product.images)?,
            product.created_at,
            product.updated_at
        ],
    )
    .await?;
    Ok(())
}

pub async fn update_product(db: &Db, product: &Product) -> Result<(), DbError> {
    let updated = db
        .execute(
            "UPDATE products SET category_id = ?, name = ?, slug = ?, description = ?,
                 brand = ?, price_cents = ?, compare_at_price_cents = ?, status = ?,
                 featured = ?, tags = ?, images = ?, updated_at = ?
             WHERE id = ?",
            params![
                product.category_id.as_ref(),
                &product.name,
                &product.slug,
                product.description.as_ref(),
                product.brand.as_ref(),
                product.price.amount_cents,
                product.compare_at_price.map(|m| m.amount_cents),
                product.status.as_str(),
                product.featured,
                to_json(&product.tags)?,
                to_json(&product.images)?,
                product.updated_at,
                &product.id
            ],
        )
        .await?;
    if updated == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// Hide a product from the storefront without deleting its history.
pub async fn archive_product(db: &Db, id: &ProductId, now: i64) -> Result<bool, DbError> {
    let updated = db
        .execute(
            "UPDATE products SET status = 'archived', featured = 0, updated_at = ? WHERE id = ?",
            params![now, id],
        )
        .await?;
    Ok(updated > 0)
}

/// Products that are not archived.
pub async fn count_products(db: &Db) -> Result<i64, DbError> {
    db.scalar_i64(
        "SELECT COUNT(*) FROM products WHERE status != 'archived'",
        &[],
    )
    .await
}

// ---- variants ----

/// Variant columns plus the owning product's currency.
const SELECT_VARIANT: &str = "SELECT v.id, v.product_id, v.sku, v.size, v.color, v.price_cents,
        v.stock, v.position, v.created_at, v.updated_at, p.currency
     FROM product_variants v JOIN products p ON p.id = v.product_id";

#[derive(Deserialize)]
struct VariantRow {
    id: String,
    product_id: String,
    sku: String,
    size: Option<String>,
    color: Option<String>,
    price_cents: Option<i64>,
    stock: i64,
    position: i64,
    created_at: i64,
    updated_at: i64,
    currency: String,
}

impl TryFrom<VariantRow> for ProductVariant {
    type Error = DbError;

    fn try_from(row: VariantRow) -> Result<Self, DbError> {
        let currency: Currency = parse_currency(&row.currency)?;
        Ok(ProductVariant {
            id: VariantId::new(row.id),
            product_id: ProductId::new(row.product_id),
            sku: row.sku,
            size: row.size,
            color: row.color,
            price_override: row.price_cents.map(|cents| Money::new(cents, currency)),
            stock: row.stock,
            position: row.position,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub async fn list_variants(db: &Db, product_id: &ProductId) -> Result<Vec<ProductVariant>, DbError> {
    let sql = format!("{SELECT_VARIANT} WHERE v.product_id = ? ORDER BY v.position ASC, v.sku ASC");
    let rows: Vec<VariantRow> = db.query_as(&sql, params![product_id]).await?;
    rows.into_iter().map(ProductVariant::try_from).collect()
}

pub async fn find_variant(db: &Db, id: &VariantId) -> Result<Option<ProductVariant>, DbError> {
    let sql = format!("{SELECT_VARIANT} WHERE v.id = ?");
    db.query_optional::<VariantRow>(&sql, params![id])
        .await?
        .map(ProductVariant::try_from)
        .transpose()
}

/// Load a variant together with its product.
pub async fn find_variant_with_product(
    db: &Db,
    id: &VariantId,
) -> Result<Option<(Product, ProductVariant)>, DbError> {
    let Some(variant) = find_variant(db, id).await? else {
        return Ok(None);
    };
    let product = find_product(db, &variant.product_id)
        .await?
        .ok_or(DbError::NotFound)?;
    Ok(Some((product, variant)))
}

pub async fn insert_variant(db: &Db, variant: &ProductVariant) -> Result<(), DbError> {
    db.execute(
        "INSERT INTO product_variants
             (id, product_id, sku, size, color, price_cents, stock, position, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            &variant.id,
            &variant.product_id,
            &variant.sku,
            variant.size.as_ref(),
            variant.color.as_ref(),
            variant.price_override.map(|m| m.amount_cents),
            variant.stock,
            variant.position,
            variant.created_at,
            variant.updated_at
        ],
    )
    .await?;
    Ok(())
}

/// Save an edited variant. Stock only moves through the stock helpers.
pub async fn update_variant(db: &Db, variant: &ProductVariant) -> Result<(), DbError> {
    let updated = db
        .execute(
            "UPDATE product_variants SET sku = ?, size = ?, color = ?, price_cents = ?,
                 position = ?, updated_at = ?
             WHERE id = ?",
            params![
                &variant.sku,
                variant.size.as_ref(),
                variant.color.as_ref(),
                variant.price_override.map(|m| m.amount_cents),
                variant.position,
                variant.updated_at,
                &variant.id
            ],
        )
        .await?;
    if updated == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

pub async fn delete_variant(db: &Db, id: &VariantId) -> Result<bool, DbError> {
    let removed = db
        .execute("DELETE FROM product_variants WHERE id = ?", params![id])
        .await?;
    Ok(removed > 0)
}

// ---- stock ----

/// Write a stock level computed from `expected`.
///
/// Returns `false` when the stored stock no longer equals `expected`.
pub async fn set_stock(
    db: &Db,
    id: &VariantId,
    expected: i64,
    stock: i64,
    now: i64,
) -> Result<bool, DbError> {
    let updated = db
        .execute(
            "UPDATE product_variants SET stock = ?, updated_at = ? WHERE id = ? AND stock = ?",
            params![stock, now, id, expected],
        )
        .await?;
    Ok(updated == 1)
}

/// A variant at or below the low-stock threshold.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LowStockVariant {
    pub variant_id: String,
    pub product_id: String,
    pub product_name: String,
    pub sku: String,
    pub size: Option<String>,
    pub color: Option<String>,
    pub stock: i64,
}

pub async fn low_stock(db: &Db, threshold: i64, limit: i64) -> Result<Vec<LowStockVariant>, DbError> {
    db.query_as(
        "SELECT v.id AS variant_id, p.id AS product_id, p.name AS product_name, v.sku,
                v.size, v.color, v.stock
         FROM product_variants v JOIN products p ON p.id = v.product_id
         WHERE p.status != 'archived' AND v.stock <= ?
         ORDER BY v.stock ASC, v.sku ASC
         LIMIT ?",
        params![threshold, limit],
    )
    .await
}

/// Take `quantity` units if that many are on hand.
///
/// Checkout reserves through this guarded update so concurrent orders
/// cannot oversell. Returns `false` and leaves stock untouched when it
/// is short.
pub async fn reserve_stock(
    tx: &mut Transaction,
    id: &VariantId,
    quantity: i64,
    now: i64,
) -> Result<bool, DbError> {
    let updated = tx
        .execute(
            "UPDATE product_variants SET stock = stock - ?, updated_at = ?
             WHERE id = ? AND stock >= ?",
            params![quantity, now, id, quantity],
        )
        .await?;
    Ok(updated == 1)
}

/// Current stock, 0 for a variant that no longer exists.
pub async fn stock_in_tx(tx: &mut Transaction, id: &VariantId) -> Result<i64, DbError> {
    tx.scalar_i64("SELECT stock FROM product_variants WHERE id = ?", params![id])
        .await
}

/// Put units back. Variants deleted since the sale are skipped.
pub async fn restore_stock(
    tx: &mut Transaction,
    id: &VariantId,
    quantity: i64,
    now: i64,
) -> Result<bool, DbError> {
    let updated = tx
        .execute(
            "UPDATE product_variants SET stock = stock + ?, updated_at = ? WHERE id = ?",
            params![quantity, now, id],
        )
        .await?;
    Ok(updated == 1)
}
