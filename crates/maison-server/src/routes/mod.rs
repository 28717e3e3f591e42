//! HTTP routes.

mod addresses;
mod admin;
mod auth;
mod cart;
mod catalog;
mod coupons;
mod newsletter;
mod orders;
pub mod payments;
mod reviews;
mod wishlist;

use axum::routing::{delete, get, patch, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::state::AppState;

/// Page parameters shared by paginated listings.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub(crate) struct PageParams {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl PageParams {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn per_page(&self, default: i64) -> i64 {
        self.per_page.unwrap_or(default).clamp(1, 100)
    }
}

/// Every storefront and back-office route.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        // auth
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        // catalog
        .route("/api/categories", get(catalog::list_categories))
        .route("/api/categories/{slug}", get(catalog::get_category))
        .route("/api/products", get(catalog::list_products))
        .route("/api/products/{product}", get(catalog::get_product))
        .route(
            "/api/products/{product}/reviews",
            get(reviews::list_reviews).post(reviews::create_review),
        )
        // cart
        .route("/api/cart", get(cart::get_cart).delete(cart::clear_cart))
        .route("/api/cart/items", post(cart::add_item))
        .route(
            "/api/cart/items/{variant_id}",
            patch(cart::update_item).delete(cart::remove_item),
        )
        .route("/api/coupons/validate", post(coupons::validate_coupon))
        // account
        .route(
            "/api/addresses",
            get(addresses::list_addresses).post(addresses::create_address),
        )
        .route(
            "/api/addresses/{id}",
            put(addresses::update_address).delete(addresses::delete_address),
        )
        .route("/api/addresses/{id}/default", post(addresses::set_default))
        .route(
            "/api/wishlist",
            get(wishlist::get_wishlist).post(wishlist::add_to_wishlist),
        )
        .route(
            "/api/wishlist/{product_id}",
            delete(wishlist::remove_from_wishlist),
        )
        // orders and payments
        .route(
            "/api/orders",
            get(orders::list_orders).post(orders::place_order),
        )
        .route("/api/orders/{id}", get(orders::get_order))
        .route("/api/orders/{id}/cancel", post(orders::cancel_order))
        .route("/api/payments/verify", post(payments::verify_payment))
        .route("/api/payments/webhook", post(payments::webhook))
        // newsletter
        .route("/api/newsletter/subscribe", post(newsletter::subscribe))
        .route("/api/newsletter/unsubscribe", post(newsletter::unsubscribe))
        .nest("/api/admin", admin::router())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}
