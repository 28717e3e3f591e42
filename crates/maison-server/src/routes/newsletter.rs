//! Newsletter sign-up.

use axum::extract::State;
use axum::Json;
use maison_commerce::current_timestamp;
use maison_commerce::engagement::{normalize_email, Subscriber};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::repo::engagement;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct NewsletterRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct SubscriptionStatus {
    pub email: String,
    pub subscribed: bool,
}

/// Subscribe, or re-activate an earlier subscription.
pub async fn subscribe(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<NewsletterRequest>,
) -> Result<Json<SubscriptionStatus>, ApiError> {
    let now = current_timestamp();
    let email = normalize_email(&request.email)?;

    let changed = match engagement::find_subscriber(&state.db, &email).await? {
        Some(mut subscriber) => {
            let changed = subscriber.resubscribe(now);
            if changed {
                engagement::save_subscriber(&state.db, &subscriber).await?;
            }
            changed
        }
        None => {
            engagement::save_subscriber(&state.db, &Subscriber::new(&email, now)?).await?;
            true
        }
    };
    if changed {
        info!("newsletter subscription added");
    }

    Ok(Json(SubscriptionStatus {
        email,
        subscribed: true,
    }))
}

/// Unknown addresses get the same answer as known ones.
pub async fn unsubscribe(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<NewsletterRequest>,
) -> Result<Json<SubscriptionStatus>, ApiError> {
    let email = normalize_email(&request.email)?;
    if let Some(mut subscriber) = engagement::find_subscriber(&state.db, &email).await? {
        if subscriber.unsubscribe(current_timestamp()) {
            engagement::save_subscriber(&state.db, &subscriber).await?;
            info!("newsletter subscription removed");
        }
    }
    Ok(Json(SubscriptionStatus {
        email,
        subscribed: false,
    }))
}
