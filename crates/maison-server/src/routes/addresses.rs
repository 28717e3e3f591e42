//! Address book.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use maison_commerce::checkout::Address;
use maison_commerce::{current_timestamp, AddressId};

use crate::error::ApiError;
use crate::extract::{ApiJson, CurrentUser};
use crate::repo::addresses::{self, SavedAddress};
use crate::state::AppState;

fn clean(address: Address) -> Result<Address, ApiError> {
    let address = address.normalized();
    address.validate()?;
    Ok(address)
}

pub async fn list_addresses(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<Vec<SavedAddress>>, ApiError> {
    Ok(Json(addresses::list(&state.db, &current.user.id).await?))
}

pub async fn create_address(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiJson(address): ApiJson<Address>,
) -> Result<(StatusCode, Json<SavedAddress>), ApiError> {
    let address = clean(address)?;
    let saved =
        addresses::create(&state.db, &current.user.id, address, current_timestamp()).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

pub async fn update_address(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<AddressId>,
    ApiJson(address): ApiJson<Address>,
) -> Result<Json<SavedAddress>, ApiError> {
    let address = clean(address)?;
    let user_id = &current.user.id;
    if !addresses::update(&state.db, user_id, &id, &address, current_timestamp()).await? {
        return Err(ApiError::not_found("address"));
    }
    addresses::find(&state.db, user_id, &id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("address"))
}

pub async fn delete_address(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<AddressId>,
) -> Result<StatusCode, ApiError> {
    if addresses::delete(&state.db, &current.user.id, &id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("address"))
    }
}

/// Make one address the default; returns the updated book.
pub async fn set_default(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<AddressId>,
) -> Result<Json<Vec<SavedAddress>>, ApiError> {
    let user_id = &current.user.id;
    if !addresses::set_default(&state.db, user_id, &id, current_timestamp()).await? {
        return Err(ApiError::not_found("address"));
    }
    Ok(Json(addresses::list(&state.db, user_id).await?))
}
