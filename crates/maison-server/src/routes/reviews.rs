//! Product reviews.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use maison_commerce::engagement::{RatingSummary, Review, ReviewDraft};
use maison_db::DbError;
use serde::Serialize;
use tracing::info;

use super::catalog::visible_product;
use super::PageParams;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiQuery, CurrentUser};
use crate::repo::{engagement, orders};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ReviewPage {
    pub reviews: Vec<Review>,
    pub summary: RatingSummary,
}

pub async fn list_reviews(
    State(state): State<AppState>,
    Path(key): Path<String>,
    ApiQuery(params): ApiQuery<PageParams>,
) -> Result<Json<ReviewPage>, ApiError> {
    let product = visible_product(&state, &key).await?;
    let per_page = params.per_page(20);
    let offset = (params.page() - 1) * per_page;
    let reviews = engagement::list_reviews(&state.db, &product.id, per_page, offset).await?;
    let summary = engagement::rating_summary(&state.db, &product.id).await?;
    Ok(Json(ReviewPage { reviews, summary }))
}

/// One review per customer per product; purchases delivered to the
/// reviewer mark it verified.
pub async fn create_review(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(key): Path<String>,
    ApiJson(draft): ApiJson<ReviewDraft>,
) -> Result<(StatusCode, Json<Review>), ApiError> {
    let product = visible_product(&state, &key).await?;
    let user = current.user;
    let verified = orders::user_has_delivered_product(&state.db, &user.id, &product.id).await?;

    let mut review = Review::new(product.id.clone(), user.id.clone(), draft, verified)?;
    match engagement::insert_review(&state.db, &review).await {
        Ok(()) => {}
        Err(DbError::Conflict(_)) => {
            return Err(ApiError::Conflict(
                "you have already reviewed this product".to_string(),
            ));
        }
        Err(e) => return Err(e.into()),
    }
    review.author = user.name;

    info!(
        review_id = %review.id,
        product_id = %product.id,
        rating = review.rating,
        verified,
        "review posted"
    );
    Ok((StatusCode::CREATED, Json(review)))
}
