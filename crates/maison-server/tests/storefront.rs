//! Catalog, cart, coupons and account endpoints.

mod common;

use axum::http::{Method, StatusCode};
use common::{sample_address, TestApp, PASSWORD};
use maison_commerce::catalog::{Category, Product, ProductStatus, ProductVariant};
use maison_commerce::{Currency, Money};
use maison_server::repo::catalog;
use serde_json::json;

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let (status, body) = app.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_catalog_listing_and_detail() {
    let app = TestApp::new().await;
    let dresses = Category::new_root("Dresses", "dresses");
    let maxi = Category::new_child(&dresses, "Maxi", "maxi");
    catalog::insert_category(app.db(), &dresses).await.unwrap();
    catalog::insert_category(app.db(), &maxi).await.unwrap();

    let mut gown = Product::new("Silk Gown", "silk-gown", Money::new(899_900, Currency::INR));
    gown.category_id = Some(maxi.id.clone());
    catalog::insert_product(app.db(), &gown).await.unwrap();

    let mut draft = Product::new("Secret Drop", "secret-drop", Money::new(99_900, Currency::INR));
    draft.status = ProductStatus::Draft;
    catalog::insert_product(app.db(), &draft).await.unwrap();

    let (tee, _) = app.product("Linen Tee", 149_900, 5).await;

    let (status, body) = app.get("/api/products", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], 2);

    // Parent category includes its children.
    let (status, body) = app.get("/api/products?category=dresses", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["items"][0]["slug"], "silk-gown");

    let (_, body) = app.get("/api/products?sort=price_asc", None).await;
    assert_eq!(body["items"][0]["slug"], "linen-tee");

    let (status, _) = app.get("/api/products?sort=rating", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = app.get("/api/products?category=shoes", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.get("/api/products/linen-tee", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["product"]["id"], tee.id.as_str());
    assert_eq!(body["variants"].as_array().unwrap().len(), 1);
    assert_eq!(body["rating"]["count"], 0);

    let (status, _) = app.get("/api/products/secret-drop", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.get("/api/categories/dresses", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["children"][0]["slug"], "maxi");
}

#[tokio::test]
async fn test_cart_merges_and_enforces_stock() {
    let app = TestApp::new().await;
    let token = app.customer("cart@maison.test").await;
    let (_, variant) = app.product("Linen Tee", 149_900, 5).await;

    app.add_to_cart(&token, &variant, 2).await;
    app.add_to_cart(&token, &variant, 1).await;
    let (status, body) = app.get("/api/cart", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cart"]["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["cart"]["items"][0]["quantity"], 3);
    assert_eq!(body["pricing"]["subtotal"]["amount_cents"], 449_700);
    assert_eq!(body["pricing"]["shipping_total"]["amount_cents"], 0);

    let (status, _) = app
        .post(
            "/api/cart/items",
            Some(&token),
            json!({ "variant_id": variant.id, "quantity": 3 }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let item_uri = format!("/api/cart/items/{}", variant.id);
    let (status, body) = app
        .call(Method::PATCH, &item_uri, Some(&token), Some(json!({ "quantity": 1 })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pricing"]["subtotal"]["amount_cents"], 149_900);
    assert_eq!(body["pricing"]["shipping_total"]["amount_cents"], 9_900);

    let (status, _) = app
        .call(Method::PATCH, &item_uri, Some(&token), Some(json!({ "quantity": 11 })))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = app
        .call(Method::PATCH, &item_uri, Some(&token), Some(json!({ "quantity": 0 })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["cart"]["items"].as_array().unwrap().is_empty());

    let (status, _) = app.call(Method::DELETE, &item_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_coupon_preview() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let token = app.customer("coupon@maison.test").await;
    let (_, variant) = app.product("Linen Tee", 149_900, 5).await;

    let (status, _) = app
        .post("/api/coupons/validate", Some(&token), json!({ "code": "SAVE10" }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "empty cart");

    let (status, body) = app
        .post(
            "/api/admin/coupons",
            Some(&admin),
            json!({ "code": "save10", "kind": "percentage", "value": 10 }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["code"], "SAVE10");

    app.add_to_cart(&token, &variant, 1).await;
    let (status, body) = app
        .post("/api/coupons/validate", Some(&token), json!({ "code": " save10 " }))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["discount"]["amount_cents"], 14_990);
    assert_eq!(body["pricing"]["grand_total"]["amount_cents"], 149_900 - 14_990 + 9_900);

    let (status, body) = app
        .post("/api/coupons/validate", Some(&token), json!({ "code": "NOPE" }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "validation_failed");
}

#[tokio::test]
async fn test_auth_guards() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api/cart", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "unauthorized");
    let (status, _) = app.get("/api/cart", Some("not-a-token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = app.customer("guard@maison.test").await;
    let (status, body) = app.get("/api/auth/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "guard@maison.test");
    assert_eq!(body["role"], "customer");

    let (status, _) = app.get("/api/admin/dashboard", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let admin = app.admin().await;
    let (status, body) = app.get("/api/admin/dashboard", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["orders_by_status"].as_object().unwrap().len(), 7);
    assert_eq!(body["customer_count"], 1);

    let (status, _) = app
        .post(
            "/api/auth/register",
            None,
            json!({ "email": "GUARD@maison.test", "password": PASSWORD }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .post(
            "/api/auth/login",
            None,
            json!({ "email": "guard@maison.test", "password": "Wrong1234" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .call(Method::POST, "/api/auth/logout", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.get("/api/auth/me", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_address_book_defaults() {
    let app = TestApp::new().await;
    let token = app.customer("home@maison.test").await;

    let first = app.address(&token).await;
    let second = app.address(&token).await;
    let (_, body) = app.get("/api/addresses", Some(&token)).await;
    assert_eq!(body[0]["id"], first.as_str());
    assert_eq!(body[0]["is_default"], true);
    assert_eq!(body[1]["is_default"], false);

    let (status, body) = app
        .call(
            Method::POST,
            &format!("/api/addresses/{second}/default"),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["id"], second.as_str());

    let (status, _) = app
        .call(Method::DELETE, &format!("/api/addresses/{second}"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, body) = app.get("/api/addresses", Some(&token)).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], first.as_str());
    assert_eq!(body[0]["is_default"], true);

    let mut bad = sample_address();
    bad["phone"] = json!("12");
    let (status, _) = app.post("/api/addresses", Some(&token), bad).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let other = app.customer("other@maison.test").await;
    let (status, _) = app
        .call(Method::DELETE, &format!("/api/addresses/{first}"), Some(&other), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_wishlist_reviews_and_newsletter() {
    let app = TestApp::new().await;
    let token = app.customer("fan@maison.test").await;
    let (product, _) = app.product("Linen Tee", 149_900, 5).await;

    let (status, _) = app
        .post("/api/wishlist", Some(&token), json!({ "product_id": product.id }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = app
        .post("/api/wishlist", Some(&token), json!({ "product_id": product.id }))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = app.get("/api/wishlist", Some(&token)).await;
    assert_eq!(body["items"][0]["product"]["slug"], "linen-tee");

    let reviews_uri = "/api/products/linen-tee/reviews";
    let (status, body) = app
        .post(reviews_uri, Some(&token), json!({ "rating": 4, "title": "Soft" }))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["verified_purchase"], false);
    let review_id = body["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .post(reviews_uri, Some(&token), json!({ "rating": 5 }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = app
        .post(reviews_uri, Some(&token), json!({ "rating": 6 }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, body) = app.get(reviews_uri, None).await;
    assert_eq!(body["summary"]["count"], 1);
    assert_eq!(body["reviews"][0]["author"], "Test Customer");

    let admin = app.admin().await;
    let (status, _) = app
        .call(
            Method::DELETE,
            &format!("/api/admin/reviews/{review_id}"),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app
        .post(
            "/api/newsletter/subscribe",
            None,
            json!({ "email": " News@Maison.test " }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "news@maison.test");
    let (_, body) = app.get("/api/admin/newsletter", Some(&admin)).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    app.post(
        "/api/newsletter/unsubscribe",
        None,
        json!({ "email": "news@maison.test" }),
    )
    .await;
    let (_, body) = app.get("/api/admin/newsletter", Some(&admin)).await;
    assert!(body.as_array().unwrap().is_empty());
    let (_, body) = app.get("/api/admin/newsletter?all=true", Some(&admin)).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_price_filter_uses_variant_prices() {
    let app = TestApp::new().await;
    let (gown, _) = app.product("Silk Gown", 900_000, 2).await;
    let mut sample = ProductVariant::new(gown.id.clone(), "SILK-GOWN-XS", 1)
        .with_options(Some("XS"), Some("Ivory"));
    sample.price_override = Some(Money::new(450_000, Currency::INR));
    catalog::insert_variant(app.db(), &sample).await.unwrap();
    app.product("Linen Tee", 149_900, 5).await;

    let (status, body) = app.get("/api/products?min_price=400000&max_price=500000", None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["items"][0]["slug"], "silk-gown");

    // The discounted variant is XS only.
    let (_, body) = app
        .get("/api/products?max_price=500000&size=M", None)
        .await;
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["items"][0]["slug"], "linen-tee");
}
