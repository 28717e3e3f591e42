//! Back-office catalog and promotion management.

mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn test_admin_manages_catalog() {
    let app = TestApp::new().await;
    let admin = app.admin().await;

    let (status, women) = app
        .post("/api/admin/categories", Some(&admin), json!({ "name": "Women" }))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{women}");
    assert_eq!(women["slug"], "women");
    let women_id = women["id"].as_str().unwrap().to_string();

    let (status, tops) = app
        .post(
            "/api/admin/categories",
            Some(&admin),
            json!({ "name": "Tops", "parent_id": women_id }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let tops_id = tops["id"].as_str().unwrap().to_string();

    // Women cannot move below its own child.
    let (status, _) = app
        .call(
            Method::PUT,
            &format!("/api/admin/categories/{women_id}"),
            Some(&admin),
            Some(json!({ "name": "Women", "parent_id": tops_id })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = app
        .post(
            "/api/admin/products",
            Some(&admin),
            json!({ "name": "Ghost", "price_cents": 100, "category_id": "missing" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, product) = app
        .post(
            "/api/admin/products",
            Some(&admin),
            json!({
                "name": "Wrap Blouse",
                "category_id": tops_id,
                "brand": "Maison",
                "price_cents": 249_900,
                "tags": ["summer"],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{product}");
    assert_eq!(product["slug"], "wrap-blouse");
    assert_eq!(product["status"], "active");
    let product_id = product["id"].as_str().unwrap().to_string();

    let variants_uri = format!("/api/admin/products/{product_id}/variants");
    let (status, variant) = app
        .post(
            &variants_uri,
            Some(&admin),
            json!({ "sku": "WRAP-S", "size": "S", "color": "Ivory", "stock": 4 }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{variant}");
    let variant_id = variant["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .post(&variants_uri, Some(&admin), json!({ "sku": "WRAP-S", "stock": 1 }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let stock_uri = format!("/api/admin/variants/{variant_id}/stock");
    let (status, level) = app
        .post(&stock_uri, Some(&admin), json!({ "delta": -10, "reason": "correction" }))
        .await;
    assert_eq!(status, StatusCode::OK, "{level}");
    assert_eq!(level["stock"], 0);
    let (_, level) = app
        .post(&stock_uri, Some(&admin), json!({ "delta": 3 }))
        .await;
    assert_eq!(level["stock"], 3);

    let (_, dashboard) = app.get("/api/admin/dashboard", Some(&admin)).await;
    assert_eq!(dashboard["product_count"], 1);
    assert_eq!(dashboard["low_stock"][0]["sku"], "WRAP-S");

    let (status, detail) = app.get("/api/products/wrap-blouse", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["variants"][0]["stock"], 3);

    let (_, listing) = app.get("/api/products?category=women", None).await;
    assert_eq!(listing["pagination"]["total"], 1);

    let (status, _) = app
        .call(
            Method::DELETE,
            &format!("/api/admin/categories/{tops_id}"),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .call(
            Method::DELETE,
            &format!("/api/admin/products/{product_id}"),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.get("/api/products/wrap-blouse", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Archived products stay visible to admins.
    let (_, listing) = app
        .get("/api/admin/products?status=archived", Some(&admin))
        .await;
    assert_eq!(listing["items"][0]["id"], product_id.as_str());
}

#[tokio::test]
async fn test_admin_manages_coupons() {
    let app = TestApp::new().await;
    let admin = app.admin().await;

    let (status, _) = app
        .post(
            "/api/admin/coupons",
            Some(&admin),
            json!({ "code": "BIG", "kind": "percentage", "value": 150 }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, coupon) = app
        .post(
            "/api/admin/coupons",
            Some(&admin),
            json!({ "code": "festive", "kind": "percentage", "value": 20, "max_discount_cents": 50_000 }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{coupon}");
    let coupon_id = coupon["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .post(
            "/api/admin/coupons",
            Some(&admin),
            json!({ "code": "FESTIVE", "kind": "fixed", "value": 100 }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let coupon_uri = format!("/api/admin/coupons/{coupon_id}");
    let (status, updated) = app
        .call(
            Method::PUT,
            &coupon_uri,
            Some(&admin),
            Some(json!({ "code": "FESTIVE", "kind": "percentage", "value": 20, "active": false })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{updated}");
    assert_eq!(updated["active"], false);

    let token = app.customer("shopper@maison.test").await;
    let (_, variant) = app.product("Kurta Set", 300_000, 5).await;
    app.add_to_cart(&token, &variant, 1).await;
    let (status, _) = app
        .post("/api/coupons/validate", Some(&token), json!({ "code": "FESTIVE" }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, list) = app.get("/api/admin/coupons", Some(&admin)).await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, _) = app.call(Method::DELETE, &coupon_uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.call(Method::DELETE, &coupon_uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stock_adjustment_saturates() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let (_, variant) = app.product("Silk Scarf", 89_900, 2).await;
    let stock_uri = format!("/api/admin/variants/{}/stock", variant.id);

    let (status, level) = app
        .post(&stock_uri, Some(&admin), json!({ "delta": i64::MIN, "reason": "correction" }))
        .await;
    assert_eq!(status, StatusCode::OK, "{level}");
    assert_eq!(level["stock"], 0);
    assert_eq!(app.stock_of(&variant).await, 0);

    let (_, level) = app
        .post(&stock_uri, Some(&admin), json!({ "delta": 5, "reason": "restock" }))
        .await;
    assert_eq!(level["stock"], 5);

    let (status, _) = app
        .post("/api/admin/variants/missing/stock", Some(&admin), json!({ "delta": 1 }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
