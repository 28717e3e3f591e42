//! Request extractors: bearer sessions and JSON/query bodies that reject
//! with [`ApiError`].

use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::Json;
use maison_auth::{AuthError, AuthToken, Role, User};
use maison_commerce::current_timestamp;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::ApiError;
use crate::repo::{sessions, users};
use crate::state::AppState;

/// The signed-in user, resolved from `Authorization: Bearer <token>`.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub session: AuthToken,
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("missing bearer token".to_string()))?;
        let token = AuthToken::from_bearer_header(header)?;

        let session = sessions::find(&state.db, token)
            .await?
            .ok_or(AuthError::SessionNotFound)?;
        if let Err(e) = session.validate(current_timestamp()) {
            debug!(user_id = %session.user_id, "session expired");
            sessions::delete(&state.db, &session.token).await?;
            return Err(e.into());
        }

        let user = users::find_by_id(&state.db, &session.user_id)
            .await?
            .ok_or(AuthError::SessionNotFound)?;
        Ok(CurrentUser { user, session })
    }
}

/// A signed-in administrator.
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let CurrentUser { user, .. } = CurrentUser::from_request_parts(parts, state).await?;
        user.require(Role::Admin)?;
        Ok(AdminUser(user))
    }
}

/// `Json` whose rejection renders as an API error.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, ApiError> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ApiJson(value))
    }
}

/// `Query` whose rejection renders as an API error.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, ApiError> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(ApiQuery(value))
    }
}
