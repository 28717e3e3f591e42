//! Wishlists, reviews and newsletter subscribers.

use maison_commerce::engagement::{RatingSummary, Review, Subscriber, Wishlist, WishlistItem};
use maison_commerce::{ProductId, ReviewId, UserId};
use maison_db::{params, Db, DbError};
use serde::Deserialize;

// ---- wishlist ----

/// Saved products, newest first.
pub async fn load_wishlist(db: &Db, user_id: &UserId) -> Result<Wishlist, DbError> {
    let items: Vec<WishlistItem> = db
        .query_as(
            "SELECT product_id, created_at AS added_at FROM wishlists
             WHERE user_id = ? ORDER BY created_at DESC, product_id ASC",
            params![user_id],
        )
        .await?;
    Ok(Wishlist {
        user_id: user_id.clone(),
        items,
    })
}

/// Returns `false` if the product was already saved.
pub async fn add_to_wishlist(
    db: &Db,
    user_id: &UserId,
    product_id: &ProductId,
    now: i64,
) -> Result<bool, DbError> {
    let inserted = db
        .execute(
            "INSERT OR IGNORE INTO wishlists (user_id, product_id, created_at) VALUES (?, ?, ?)",
            params![user_id, product_id, now],
        )
        .await?;
    Ok(inserted > 0)
}

pub async fn remove_from_wishlist(
    db: &Db,
    user_id: &UserId,
    product_id: &ProductId,
) -> Result<bool, DbError> {
    let removed = db
        .execute(
            "DELETE FROM wishlists WHERE user_id = ? AND product_id = ?",
            params![user_id, product_id],
        )
        .await?;
    Ok(removed > 0)
}

// ---- reviews ----

#[derive(Deserialize)]
struct ReviewRow {
    id: String,
    product_id: String,
    user_id: String,
    author: Option<String>,
    rating: i64,
    title: Option<String>,
    body: Option<String>,
    verified_purchase: i64,
    created_at: i64,
    updated_at: i64,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Review {
            id: ReviewId::new(row.id),
            product_id: ProductId::new(row.product_id),
            user_id: UserId::new(row.user_id),
            author: row.author,
            rating: row.rating,
            title: row.title,
            body: row.body,
            verified_purchase: row.verified_purchase != 0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Reviews for a product, newest first, with the reviewer's name.
pub async fn list_reviews(
    db: &Db,
    product_id: &ProductId,
    limit: i64,
    offset: i64,
) -> Result<Vec<Review>, DbError> {
    let rows: Vec<ReviewRow> = db
        .query_as(
            "SELECT r.id, r.product_id, r.user_id, u.name AS author, r.rating, r.title, r.body,
                    r.verified_purchase, r.created_at, r.updated_at
             FROM reviews r JOIN users u ON u.id = r.user_id
             WHERE r.product_id = ?
             ORDER BY r.created_at DESC, r.id ASC
             LIMIT ? OFFSET ?",
            params![product_id, limit, offset],
        )
        .await?;
    Ok(rows.into_iter().map(Review::from).collect())
}

/// Insert a review. A second review by the same user is a
/// [`DbError::Conflict`].
pub async fn insert_review(db: &Db, review: &Review) -> Result<(), DbError> {
    db.execute(
        "INSERT INTO reviews
             (id, product_id, user_id, rating, title, body, verified_purchase, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            &review.id,
            &review.product_id,
            &review.user_id,
            review.rating,
            review.title.as_ref(),
            review.body.as_ref(),
            review.verified_purchase,
            review.created_at,
            review.updated_at
        ],
    )
    .await?;
    Ok(())
}

pub async fn delete_review(db: &Db, id: &ReviewId) -> Result<bool, DbError> {
    let removed = db
        .execute("DELETE FROM reviews WHERE id = ?", params![id])
        .await?;
    Ok(removed > 0)
}

pub async fn rating_summary(db: &Db, product_id: &ProductId) -> Result<RatingSummary, DbError> {
    #[derive(Deserialize)]
    struct Rating {
        rating: i64,
    }

    let ratings: Vec<Rating> = db
        .query_as(
            "SELECT rating FROM reviews WHERE product_id = ?",
            params![product_id],
        )
        .await?;
    Ok(RatingSummary::from_ratings(ratings.into_iter().map(|r| r.rating)))
}

// ---- newsletter ----

pub async fn find_subscriber(db: &Db, email: &str) -> Result<Option<Subscriber>, DbError> {
    db.query_optional(
        "SELECT email, subscribed_at, unsubscribed_at FROM newsletter_subscribers WHERE email = ?",
        params![email],
    )
    .await
}

pub async fn save_subscriber(db: &Db, subscriber: &Subscriber) -> Result<(), DbError> {
    db.execute(
        "INSERT INTO newsletter_subscribers (email, subscribed_at, unsubscribed_at)
         VALUES (?, ?, ?)
         ON CONFLICT(email) DO UPDATE SET
             subscribed_at = excluded.subscribed_at,
             unsubscribed_at = excluded.unsubscribed_at",
        params![
            &subscriber.email,
            subscriber.subscribed_at,
            subscriber.unsubscribed_at
        ],
    )
    .await?;
    Ok(())
}

/// Subscribers, newest first.
pub async fn list_subscribers(db: &Db, active_only: bool) -> Result<Vec<Subscriber>, DbError> {
    let sql = if active_only {
        "SELECT email, subscribed_at, unsubscribed_at FROM newsletter_subscribers
         WHERE unsubscribed_at IS NULL ORDER BY subscribed_at DESC, email ASC"
    } else {
        "SELECT email, subscribed_at, unsubscribed_at FROM newsletter_subscribers
         ORDER BY subscribed_at DESC, email ASC"
    };
    db.query_as(sql, &[]).await
}
