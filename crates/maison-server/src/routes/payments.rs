//! Payment confirmation endpoints.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use maison_commerce::checkout::Order;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::extract::{ApiJson, CurrentUser};
use crate::services::payments::{self, VerifyRequest};
use crate::state::AppState;

/// Header carrying the hex HMAC of a webhook body.
pub const WEBHOOK_SIGNATURE_HEADER: &str = "x-gateway-signature";

pub async fn verify_payment(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiJson(request): ApiJson<VerifyRequest>,
) -> Result<Json<Order>, ApiError> {
    Ok(Json(payments::verify(&state, &current.user, request).await?))
}

/// Gateway-to-server notification. Authenticated by signature, not session.
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let signature = headers
        .get(WEBHOOK_SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());
    let outcome = payments::handle_webhook(&state, signature, &body).await?;
    Ok(Json(json!({ "status": outcome })))
}
