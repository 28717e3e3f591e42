//! Account registration and bearer sessions.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use maison_auth::{AuthError, AuthToken, Role, User, UserCredentials};
use maison_commerce::current_timestamp;
use maison_commerce::engagement::normalize_email;
use maison_db::DbError;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::extract::{ApiJson, CurrentUser};
use crate::repo::{sessions, users};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// A freshly issued session.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub expires_at: i64,
    pub user: User,
}

async fn open_session(state: &AppState, user: User) -> Result<SessionResponse, ApiError> {
    let now = current_timestamp();
    let token = AuthToken::issue(user.id.clone(), state.config.auth.session_ttl_secs, now);
    sessions::create(&state.db, &token).await?;
    Ok(SessionResponse {
        token: token.token,
        expires_at: token.expires_at,
        user,
    })
}

pub async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let credentials = UserCredentials::register(
        &request.email,
        request.name.as_deref(),
        &request.password,
        Role::Customer,
        current_timestamp(),
    )?;

    match users::insert(&state.db, &credentials).await {
        Ok(()) => {}
        Err(DbError::Conflict(_)) => {
            return Err(AuthError::UserAlreadyExists(credentials.user.email).into());
        }
        Err(e) => return Err(e.into()),
    }
    info!(user_id = %credentials.user.id, "account registered");

    let session = open_session(&state, credentials.user).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let email = normalize_email(&request.email).map_err(|_| AuthError::InvalidCredentials)?;
    let credentials = users::find_by_email(&state.db, &email)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;
    credentials.verify(&request.password)?;

    let purged = sessions::purge_expired(&state.db, current_timestamp()).await?;
    if purged > 0 {
        debug!(purged, "expired sessions removed");
    }

    info!(user_id = %credentials.user.id, "signed in");
    Ok(Json(open_session(&state, credentials.user).await?))
}

pub async fn logout(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<StatusCode, ApiError> {
    sessions::delete(&state.db, &current.session.token).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn me(current: CurrentUser) -> Json<User> {
    Json(current.user)
}
