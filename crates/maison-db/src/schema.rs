//! Storefront schema bootstrap.
//!
//! Every statement is idempotent, so `migrate` runs on each startup.
//! Money columns hold integer minor units; timestamps are Unix seconds;
//! list-valued columns (tags, images, address snapshots) hold JSON text.

use tracing::info;

use crate::{Db, DbError};

const STATEMENTS: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        name TEXT,
        password_hash TEXT NOT NULL,
        role TEXT NOT NULL DEFAULT 'customer',
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS sessions (
        token TEXT PRIMARY KEY,
        user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        created_at INTEGER NOT NULL,
        expires_at INTEGER NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS categories (
        id TEXT PRIMARY KEY,
        parent_id TEXT REFERENCES categories(id),
        name TEXT NOT NULL,
        slug TEXT NOT NULL UNIQUE,
        description TEXT,
        image_url TEXT,
        position INTEGER NOT NULL DEFAULT 0,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS products (
        id TEXT PRIMARY KEY,
        category_id TEXT REFERENCES categories(id),
        name TEXT NOT NULL,
        slug TEXT NOT NULL UNIQUE,
        description TEXT,
        brand TEXT,
        price_cents INTEGER NOT NULL,
        compare_at_price_cents INTEGER,
        currency TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'active',
        featured INTEGER NOT NULL DEFAULT 0,
        tags TEXT NOT NULL DEFAULT '[]',
        images TEXT NOT NULL DEFAULT '[]',
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_products_category ON products(category_id)",
    "CREATE INDEX IF NOT EXISTS idx_products_status ON products(status)",
    r#"CREATE TABLE IF NOT EXISTS product_variants (
        id TEXT PRIMARY KEY,
        product_id TEXT NOT NULL REFERENCES products(id) ON DELETE CASCADE,
        sku TEXT NOT NULL UNIQUE,
        size TEXT,
        color TEXT,
        price_cents INTEGER,
        stock INTEGER NOT NULL DEFAULT 0 CHECK (stock >= 0),
        position INTEGER NOT NULL DEFAULT 0,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_variants_product ON product_variants(product_id)",
    r#"CREATE TABLE IF NOT EXISTS cart_items (
        user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        variant_id TEXT NOT NULL REFERENCES product_variants(id) ON DELETE CASCADE,
        quantity INTEGER NOT NULL CHECK (quantity > 0),
        added_at INTEGER NOT NULL,
        PRIMARY KEY (user_id, variant_id)
    )"#,
    r#"CREATE TABLE IF NOT EXISTS addresses (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        full_name TEXT NOT NULL,
        phone TEXT NOT NULL,
        line1 TEXT NOT NULL,
        line2 TEXT,
        city TEXT NOT NULL,
        state TEXT NOT NULL,
        postal_code TEXT NOT NULL,
        country TEXT NOT NULL,
        is_default INTEGER NOT NULL DEFAULT 0,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_addresses_user ON addresses(user_id)",
    r#"CREATE TABLE IF NOT EXISTS coupons (
        id TEXT PRIMARY KEY,
        code TEXT NOT NULL UNIQUE,
        description TEXT,
        kind TEXT NOT NULL,
        value INTEGER NOT NULL,
        min_order_cents INTEGER NOT NULL DEFAULT 0,
        max_discount_cents INTEGER,
        usage_limit INTEGER,
        usage_count INTEGER NOT NULL DEFAULT 0,
        starts_at INTEGER,
        expires_at INTEGER,
        active INTEGER NOT NULL DEFAULT 1,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS orders (
        id TEXT PRIMARY KEY,
        order_number TEXT NOT NULL UNIQUE,
        user_id TEXT NOT NULL REFERENCES users(id),
        email TEXT NOT NULL,
        status TEXT NOT NULL,
        payment_status TEXT NOT NULL,
        payment_method TEXT NOT NULL,
        shipping_address TEXT NOT NULL,
        subtotal_cents INTEGER NOT NULL,
        discount_cents INTEGER NOT NULL,
        shipping_cents INTEGER NOT NULL,
        total_cents INTEGER NOT NULL,
        currency TEXT NOT NULL,
        coupon_code TEXT,
        note TEXT,
        tracking_number TEXT,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL,
        cancelled_at INTEGER
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_orders_user ON orders(user_id)",
    "CREATE INDEX IF NOT EXISTS idx_orders_status ON orders(status)",
    r#"CREATE TABLE IF NOT EXISTS order_items (
        id TEXT PRIMARY KEY,
        order_id TEXT NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
        product_id TEXT NOT NULL,
        variant_id TEXT NOT NULL,
        sku TEXT NOT NULL,
        name TEXT NOT NULL,
        size TEXT,
        color TEXT,
        quantity INTEGER NOT NULL,
        unit_price_cents INTEGER NOT NULL,
        total_cents INTEGER NOT NULL
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_order_items_order ON order_items(order_id)",
    r#"CREATE TABLE IF NOT EXISTS payments (
        id TEXT PRIMARY KEY,
        order_id TEXT NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
        provider TEXT NOT NULL,
        gateway_order_id TEXT NOT NULL UNIQUE,
        gateway_payment_id TEXT,
        amount_cents INTEGER NOT NULL,
        currency TEXT NOT NULL,
        status TEXT NOT NULL,
        signature TEXT,
        failure_reason TEXT,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_payments_order ON payments(order_id)",
    r#"CREATE TABLE IF NOT EXISTS wishlists (
        user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        product_id TEXT NOT NULL REFERENCES products(id) ON DELETE CASCADE,
        created_at INTEGER NOT NULL,
        PRIMARY KEY (user_id, product_id)
    )"#,
    r#"CREATE TABLE IF NOT EXISTS reviews (
        id TEXT PRIMARY KEY,
        product_id TEXT NOT NULL REFERENCES products(id) ON DELETE CASCADE,
        user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
        title TEXT,
        body TEXT,
        verified_purchase INTEGER NOT NULL DEFAULT 0,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL,
        UNIQUE (product_id, user_id)
    )"#,
    r#"CREATE TABLE IF NOT EXISTS newsletter_subscribers (
        email TEXT PRIMARY KEY,
        subscribed_at INTEGER NOT NULL,
        unsubscribed_at INTEGER
    )"#,
];

/// Create all storefront tables and indexes if they don't exist yet.
pub async fn migrate(db: &Db) -> Result<(), DbError> {
    for statement in STATEMENTS {
        db.execute(statement, &[]).await?;
    }
    info!(statements = STATEMENTS.len(), "schema ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params;

    #[tokio::test]
    async fn test_migrate_is_idempotent() {
        let db = Db::in_memory().await.unwrap();
        migrate(&db).await.unwrap();
        migrate(&db).await.unwrap();

        let tables = db
            .scalar_i64(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
                params![],
            )
            .await
            .unwrap();
        assert_eq!(tables, 14);
    }

    #[tokio::test]
    async fn test_negative_stock_rejected() {
        let db = Db::in_memory().await.unwrap();
        migrate(&db).await.unwrap();
        db.execute(
            "INSERT INTO products (id, name, slug, price_cents, currency, created_at, updated_at) VALUES ('p', 'P', 'p', 100, 'INR', 0, 0)",
            params![],
        )
        .await
        .unwrap();
        let result = db
            .execute(
                "INSERT INTO product_variants (id, product_id, sku, stock, created_at, updated_at) VALUES ('v', 'p', 'SKU', -1, 0, 0)",
                params![],
            )
            .await;
        assert!(result.is_err());
    }
}
