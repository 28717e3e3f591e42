//! Back-office routes, mounted under `/api/admin`.
//!
//! Every handler takes [`AdminUser`](crate::extract::AdminUser), so
//! customers get 403 and anonymous callers 401.

mod catalog;
mod coupons;
mod dashboard;
mod engagement;
mod orders;

use axum::routing::{delete, get, patch, post, put};
use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard::dashboard))
        // catalog
        .route(
            "/products",
            get(catalog::list_products).post(catalog::create_product),
        )
        .route(
            "/products/{id}",
            put(catalog::update_product).delete(catalog::archive_product),
        )
        .route("/products/{id}/variants", post(catalog::create_variant))
        .route(
            "/variants/{id}",
            put(catalog::update_variant).delete(catalog::delete_variant),
        )
        .route("/variants/{id}/stock", post(catalog::adjust_stock))
        .route("/categories", post(catalog::create_category))
        .route(
            "/categories/{id}",
            put(catalog::update_category).delete(catalog::delete_category),
        )
        // orders
        .route("/orders", get(orders::list_orders))
        .route("/orders/{id}", get(orders::get_order))
        .route("/orders/{id}/status", patch(orders::update_status))
        // promotions and engagement
        .route(
            "/coupons",
            get(coupons::list_coupons).post(coupons::create_coupon),
        )
        .route(
            "/coupons/{id}",
            put(coupons::update_coupon).delete(coupons::delete_coupon),
        )
        .route("/newsletter", get(engagement::list_subscribers))
        .route("/reviews/{id}", delete(engagement::delete_review))
}
