//! Public catalog: categories, product listing and product detail.

use axum::extract::{Path, State};
use axum::Json;
use maison_commerce::catalog::{Category, Product, ProductVariant};
use maison_commerce::engagement::RatingSummary;
use maison_commerce::search::{
    ProductFilter, ProductQuery, SearchResults, SortOption, DEFAULT_PER_PAGE,
};
use maison_commerce::ProductId;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::extract::ApiQuery;
use crate::repo::{catalog, engagement};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CategoryDetail {
    pub category: Category,
    pub children: Vec<Category>,
}

/// Query string of `GET /api/products`. Prices are in minor units.
#[derive(Debug, Default, Deserialize)]
pub struct ProductListParams {
    pub category: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub brand: Option<String>,
    pub q: Option<String>,
    #[serde(default)]
    pub in_stock: bool,
    #[serde(default)]
    pub featured: bool,
    pub sort: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ProductDetail {
    pub product: Product,
    pub variants: Vec<ProductVariant>,
    pub rating: RatingSummary,
}

pub async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(catalog::list_categories(&state.db).await?))
}

pub async fn get_category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<CategoryDetail>, ApiError> {
    let category = catalog::find_category_by_slug(&state.db, &slug)
        .await?
        .ok_or_else(|| ApiError::not_found("category"))?;
    let children = catalog::list_categories(&state.db)
        .await?
        .into_iter()
        .filter(|c| c.parent_id.as_ref() == Some(&category.id))
        .collect();
    Ok(Json(CategoryDetail { category, children }))
}

/// Turn query parameters into a storefront listing query.
///
/// A category slug selects the category and everything below it.
async fn build_query(state: &AppState, params: ProductListParams) -> Result<ProductQuery, ApiError> {
    let mut filter = ProductFilter::storefront()
        .with_price_range(params.min_price, params.max_price);
    if let Some(q) = params.q {
        filter = filter.with_text(q);
    }
    filter.size = params.size;
    filter.color = params.color;
    filter.brand = params.brand;
    filter.in_stock_only = params.in_stock;
    filter.featured_only = params.featured;

    if let Some(slug) = params.category.as_deref().filter(|s| !s.trim().is_empty()) {
        let category = catalog::find_category_by_slug(&state.db, slug.trim())
            .await?
            .ok_or_else(|| ApiError::not_found("category"))?;
        let all = catalog::list_categories(&state.db).await?;
        let mut ids = category.descendant_ids(&all);
        ids.push(category.id);
        filter = filter.with_categories(ids);
    }

    let sort = match params.sort.as_deref() {
        None | Some("") => SortOption::default(),
        Some(raw) => SortOption::from_str(raw)
            .ok_or_else(|| ApiError::BadRequest(format!("unknown sort: {raw}")))?,
    };

    Ok(ProductQuery::new(filter).with_sort(sort).with_pagination(
        params.page.unwrap_or(1),
        params.per_page.unwrap_or(DEFAULT_PER_PAGE),
    ))
}

pub async fn list_products(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ProductListParams>,
) -> Result<Json<SearchResults<Product>>, ApiError> {
    let query = build_query(&state, params).await?;
    Ok(Json(catalog::list_products(&state.db, &query).await?))
}

/// Resolve a path segment as a slug first, then as an ID.
pub(crate) async fn resolve_product(state: &AppState, key: &str) -> Result<Option<Product>, ApiError> {
    if let Some(product) = catalog::find_product_by_slug(&state.db, key).await? {
        return Ok(Some(product));
    }
    Ok(catalog::find_product(&state.db, &ProductId::new(key)).await?)
}

/// A product customers can see, or 404.
pub(crate) async fn visible_product(state: &AppState, key: &str) -> Result<Product, ApiError> {
    resolve_product(state, key)
        .await?
        .filter(Product::is_available)
        .ok_or_else(|| ApiError::not_found("product"))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ProductDetail>, ApiError> {
    let product = visible_product(&state, &key).await?;
    let variants = catalog::list_variants(&state.db, &product.id).await?;
    let rating = engagement::rating_summary(&state.db, &product.id).await?;
    Ok(Json(ProductDetail {
        product,
        variants,
        rating,
    }))
}
