//! Product, variant, stock and category management.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use maison_commerce::catalog::{
    slugify, AdjustmentReason, Category, Product, ProductStatus, ProductVariant,
};
use maison_commerce::search::{ProductFilter, ProductQuery, SearchResults, DEFAULT_PER_PAGE};
use maison_commerce::{
    current_timestamp, CategoryId, CommerceError, Currency, Money, ProductId, VariantId,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ApiError;
use crate::extract::{AdminUser, ApiJson, ApiQuery};
use crate::repo::catalog;
use crate::state::AppState;

// ---- products ----

#[derive(Debug, Default, Deserialize)]
pub struct AdminProductParams {
    pub status: Option<String>,
    pub q: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Editable product fields. Prices are in minor units of the store currency.
#[derive(Debug, Deserialize)]
pub struct ProductInput {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    pub price_cents: i64,
    #[serde(default)]
    pub compare_at_price_cents: Option<i64>,
    #[serde(default)]
    pub status: ProductStatus,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

impl ProductInput {
    fn apply(self, product: &mut Product, currency: Currency) {
        product.slug = self
            .slug
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| slugify(&self.name));
        product.name = self.name.trim().to_string();
        product.category_id = self.category_id;
        product.description = self.description;
        product.brand = self.brand.map(|b| b.trim().to_string()).filter(|b| !b.is_empty());
        product.price = Money::new(self.price_cents, currency);
        product.compare_at_price = self
            .compare_at_price_cents
            .map(|cents| Money::new(cents, currency));
        product.status = self.status;
        product.featured = self.featured;
        product.tags.clear();
        for tag in &self.tags {
            product.add_tag(tag);
        }
        product.images = self.images;
    }
}

async fn check_category(state: &AppState, id: Option<&CategoryId>) -> Result<(), ApiError> {
    if let Some(id) = id {
        if catalog::find_category(&state.db, id).await?.is_none() {
            return Err(ApiError::validation(format!("unknown category: {id}")));
        }
    }
    Ok(())
}

/// Every product regardless of status.
pub async fn list_products(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiQuery(params): ApiQuery<AdminProductParams>,
) -> Result<Json<SearchResults<Product>>, ApiError> {
    let mut filter = ProductFilter::default();
    if let Some(raw) = params.status.as_deref().filter(|s| !s.is_empty()) {
        filter.status = Some(
            ProductStatus::from_str(raw)
                .ok_or_else(|| ApiError::BadRequest(format!("unknown product status: {raw}")))?,
        );
    }
    if let Some(q) = params.q {
        filter = filter.with_text(q);
    }
    let query = ProductQuery::new(filter).with_pagination(
        params.page.unwrap_or(1),
        params.per_page.unwrap_or(DEFAULT_PER_PAGE),
    );
    Ok(Json(catalog::list_products(&state.db, &query).await?))
}

pub async fn create_product(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ApiJson(input): ApiJson<ProductInput>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    check_category(&state, input.category_id.as_ref()).await?;
    let currency = state.currency();
    let mut product = Product::new("", "", Money::zero(currency));
    input.apply(&mut product, currency);
    product.validate()?;
    catalog::insert_product(&state.db, &product).await?;

    info!(product_id = %product.id, slug = %product.slug, admin = %admin.id, "product created");
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<ProductId>,
    ApiJson(input): ApiJson<ProductInput>,
) -> Result<Json<Product>, ApiError> {
    let mut product = catalog::find_product(&state.db, &id)
        .await?
        .ok_or_else(|| CommerceError::ProductNotFound(id.to_string()))?;
    check_category(&state, input.category_id.as_ref()).await?;
    input.apply(&mut product, state.currency());
    product.updated_at = current_timestamp();
    product.validate()?;
    catalog::update_product(&state.db, &product).await?;

    info!(product_id = %product.id, admin = %admin.id, "product updated");
    Ok(Json(product))
}

/// Products are archived, never deleted, so past orders keep their links.
pub async fn archive_product(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<ProductId>,
) -> Result<StatusCode, ApiError> {
    if !catalog::archive_product(&state.db, &id, current_timestamp()).await? {
        return Err(CommerceError::ProductNotFound(id.to_string()).into());
    }
    info!(product_id = %id, admin = %admin.id, "product archived");
    Ok(StatusCode::NO_CONTENT)
}

// ---- variants ----

#[derive(Debug, Deserialize)]
pub struct VariantInput {
    pub sku: String,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub price_cents: Option<i64>,
    /// Opening stock; ignored on update.
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub position: i64,
}

impl VariantInput {
    fn apply(self, variant: &mut ProductVariant, currency: Currency) {
        variant.sku = self.sku.trim().to_string();
        variant.size = self.size.filter(|s| !s.trim().is_empty());
        variant.color = self.color.filter(|c| !c.trim().is_empty());
        variant.price_override = self.price_cents.map(|cents| Money::new(cents, currency));
        variant.position = self.position;
    }
}

pub async fn create_variant(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(product_id): Path<ProductId>,
    ApiJson(input): ApiJson<VariantInput>,
) -> Result<(StatusCode, Json<ProductVariant>), ApiError> {
    let product = catalog::find_product(&state.db, &product_id)
        .await?
        .ok_or_else(|| CommerceError::ProductNotFound(product_id.to_string()))?;

    let mut variant = ProductVariant::new(product.id.clone(), "", input.stock);
    input.apply(&mut variant, product.price.currency);
    variant.validate()?;
    catalog::insert_variant(&state.db, &variant).await?;

    info!(variant_id = %variant.id, sku = %variant.sku, stock = variant.stock, "variant created");
    Ok((StatusCode::CREATED, Json(variant)))
}

pub async fn update_variant(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<VariantId>,
    ApiJson(input): ApiJson<VariantInput>,
) -> Result<Json<ProductVariant>, ApiError> {
    let mut variant = catalog::find_variant(&state.db, &id)
        .await?
        .ok_or_else(|| CommerceError::VariantNotFound(id.to_string()))?;
    let currency = variant
        .price_override
        .map(|m| m.currency)
        .unwrap_or_else(|| state.currency());
    input.apply(&mut variant, currency);
    variant.updated_at = current_timestamp();
    variant.validate()?;
    catalog::update_variant(&state.db, &variant).await?;
    Ok(Json(variant))
}

pub async fn delete_variant(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<VariantId>,
) -> Result<StatusCode, ApiError> {
    if catalog::delete_variant(&state.db, &id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(CommerceError::VariantNotFound(id.to_string()).into())
    }
}

#[derive(Debug, Deserialize)]
pub struct StockAdjustment {
    pub delta: i64,
    #[serde(default = "default_reason")]
    pub reason: AdjustmentReason,
}

fn default_reason() -> AdjustmentReason {
    AdjustmentReason::Correction
}

#[derive(Debug, Serialize)]
pub struct StockLevel {
    pub variant_id: VariantId,
    pub stock: i64,
}

/// Apply a signed correction; stock never drops below zero.
pub async fn adjust_stock(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<VariantId>,
    ApiJson(adjustment): ApiJson<StockAdjustment>,
) -> Result<Json<StockLevel>, ApiError> {
    let mut variant = catalog::find_variant(&state.db, &id)
        .await?
        .ok_or_else(|| CommerceError::VariantNotFound(id.to_string()))?;
    let before = variant.stock;
    let stock = variant.adjust(adjustment.delta);
    if !catalog::set_stock(&state.db, &id, before, stock, variant.updated_at).await? {
        return Err(ApiError::Conflict(format!(
            "stock for variant {id} changed during the adjustment"
        )));
    }

    info!(
        variant_id = %id,
        delta = adjustment.delta,
        reason = adjustment.reason.as_str(),
        stock,
        admin = %admin.id,
        "stock adjusted"
    );
    Ok(Json(StockLevel {
        variant_id: id,
        stock,
    }))
}

// ---- categories ----

#[derive(Debug, Deserialize)]
pub struct CategoryInput {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub parent_id: Option<CategoryId>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub position: i64,
}

impl CategoryInput {
    fn apply(self, category: &mut Category) {
        category.slug = self
            .slug
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| slugify(&self.name));
        category.name = self.name.trim().to_string();
        category.parent_id = self.parent_id;
        category.description = self.description;
        category.image_url = self.image_url;
        category.position = self.position;
    }
}

pub async fn create_category(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiJson(input): ApiJson<CategoryInput>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    check_category(&state, input.parent_id.as_ref()).await?;
    let mut category = Category::new_root("", "");
    input.apply(&mut category);
    category.validate()?;
    catalog::insert_category(&state.db, &category).await?;

    info!(category_id = %category.id, slug = %category.slug, "category created");
    Ok((StatusCode::CREATED, Json(category)))
}

/// Moving a category under one of its own descendants is rejected.
pub async fn update_category(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<CategoryId>,
    ApiJson(input): ApiJson<CategoryInput>,
) -> Result<Json<Category>, ApiError> {
    let all = catalog::list_categories(&state.db).await?;
    let mut category = all
        .iter()
        .find(|c| c.id == id)
        .cloned()
        .ok_or_else(|| CommerceError::CategoryNotFound(id.to_string()))?;

    if let Some(parent) = &input.parent_id {
        if !all.iter().any(|c| &c.id == parent) {
            return Err(ApiError::validation(format!("unknown category: {parent}")));
        }
        if category.would_cycle(parent, &all) {
            return Err(ApiError::validation(
                "a category cannot be moved below itself",
            ));
        }
    }

    input.apply(&mut category);
    category.updated_at = current_timestamp();
    category.validate()?;
    catalog::update_category(&state.db, &category).await?;
    Ok(Json(category))
}

pub async fn delete_category(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<CategoryId>,
) -> Result<StatusCode, ApiError> {
    if catalog::category_in_use(&state.db, &id).await? {
        return Err(ApiError::Conflict(
            "category still has products or subcategories".to_string(),
        ));
    }
    if !catalog::delete_category(&state.db, &id).await? {
        return Err(CommerceError::CategoryNotFound(id.to_string()).into());
    }
    info!(category_id = %id, "category deleted");
    Ok(StatusCode::NO_CONTENT)
}
