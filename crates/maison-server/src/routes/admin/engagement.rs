use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use maison_commerce::engagement::Subscriber;
use maison_commerce::ReviewId;
use serde::Deserialize;
use tracing::info;

use crate::error::ApiError;
use crate::extract::{AdminUser, ApiQuery};
use crate::repo::engagement;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SubscriberParams {
    /// Include unsubscribed addresses.
    #[serde(default)]
    pub all: bool,
}

pub async fn list_subscribers(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiQuery(params): ApiQuery<SubscriberParams>,
) -> Result<Json<Vec<Subscriber>>, ApiError> {
    Ok(Json(engagement::list_subscribers(&state.db, !params.all).await?))
}

/// Moderation: remove a review.
pub async fn delete_review(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<ReviewId>,
) -> Result<StatusCode, ApiError> {
    if !engagement::delete_review(&state.db, &id).await? {
        return Err(ApiError::not_found("review"));
    }
    info!(review_id = %id, admin = %admin.id, "review removed");
    Ok(StatusCode::NO_CONTENT)
}
