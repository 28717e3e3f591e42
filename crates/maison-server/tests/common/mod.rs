//! Shared harness: the full router over in-memory SQLite and a mock
//! gateway.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use maison_commerce::catalog::{Product, ProductVariant};
use maison_commerce::{Currency, Money};
use maison_db::Db;
use maison_server::gateway::MockGateway;
use maison_server::repo::catalog;
use maison_server::{build_router, ensure_admin, AppConfig, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

pub const PASSWORD: &str = "Secret123";
pub const ADMIN_EMAIL: &str = "admin@maison.test";

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub gateway: Arc<MockGateway>,
}

impl TestApp {
    pub async fn new() -> Self {
        let db = Db::in_memory().await.unwrap();
        maison_db::schema::migrate(&db).await.unwrap();
        ensure_admin(&db, ADMIN_EMAIL, PASSWORD).await.unwrap();

        let config = AppConfig::default();
        let gateway = Arc::new(MockGateway::new(config.payment.key_id.clone()));
        let state = AppState::new(db, config, gateway.clone());
        TestApp {
            app: build_router(state.clone()),
            state,
            gateway,
        }
    }

    pub fn db(&self) -> &Db {
        &self.state.db
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.call(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.call(Method::POST, uri, token, Some(body)).await
    }

    /// Register a customer and return the session token.
    pub async fn customer(&self, email: &str) -> String {
        let (status, body) = self
            .post(
                "/api/auth/register",
                None,
                json!({ "email": email, "password": PASSWORD, "name": "Test Customer" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["token"].as_str().unwrap().to_string()
    }

    pub async fn admin(&self) -> String {
        let (status, body) = self
            .post(
                "/api/auth/login",
                None,
                json!({ "email": ADMIN_EMAIL, "password": PASSWORD }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["token"].as_str().unwrap().to_string()
    }

    /// Insert an active product with one variant straight into the store.
    pub async fn product(&self, name: &str, price_cents: i64, stock: i64) -> (Product, ProductVariant) {
        let slug = maison_commerce::catalog::slugify(name);
        let product = Product::new(name, slug.clone(), Money::new(price_cents, Currency::INR));
        catalog::insert_product(self.db(), &product).await.unwrap();
        let variant = ProductVariant::new(product.id.clone(), format!("{}-M", slug.to_uppercase()), stock)
            .with_options(Some("M"), Some("Black"));
        catalog::insert_variant(self.db(), &variant).await.unwrap();
        (product, variant)
    }

    pub async fn stock_of(&self, variant: &ProductVariant) -> i64 {
        catalog::find_variant(self.db(), &variant.id)
            .await
            .unwrap()
            .unwrap()
            .stock
    }

    pub async fn add_to_cart(&self, token: &str, variant: &ProductVariant, quantity: i64) {
        let (status, body) = self
            .post(
                "/api/cart/items",
                Some(token),
                json!({ "variant_id": variant.id, "quantity": quantity }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
    }

    /// Save an address and return its ID.
    pub async fn address(&self, token: &str) -> String {
        let (status, body) = self
            .post("/api/addresses", Some(token), sample_address())
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_str().unwrap().to_string()
    }

    pub async fn checkout(&self, token: &str, request: Value) -> (StatusCode, Value) {
        self.post("/api/orders", Some(token), request).await
    }
}

pub fn sample_address() -> Value {
    json!({
        "full_name": "Asha Rao",
        "phone": "+91 98765 43210",
        "line1": "12 MG Road",
        "city": "Bengaluru",
        "state": "Karnataka",
        "postal_code": "560001",
        "country": "IN"
    })
}
