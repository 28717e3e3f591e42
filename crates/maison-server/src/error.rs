//! API error type and its JSON rendering.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use maison_auth::AuthError;
use maison_commerce::CommerceError;
use maison_db::DbError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::gateway::GatewayError;

/// Errors returned by handlers.
///
/// Rendered as `{"error": {"code": "...", "message": "..."}}`.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed request (400).
    #[error("{0}")]
    BadRequest(String),

    /// Missing or invalid session (401).
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but not allowed (403).
    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// State conflict: stock, duplicates, illegal transitions (409).
    #[error("{0}")]
    Conflict(String),

    /// Well-formed input that breaks a business rule (422).
    #[error("{0}")]
    Validation(String),

    /// The payment gateway failed or refused (502).
    #[error("{0}")]
    Gateway(String),

    /// Anything else (500). The message is logged, not returned.
    #[error("{0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: ErrorDetail<'a>,
}

#[derive(Serialize)]
struct ErrorDetail<'a> {
    code: &'static str,
    message: &'a str,
}

impl ApiError {
    pub fn not_found(what: impl Into<String>) -> Self {
        ApiError::NotFound(format!("{} not found", what.into()))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Gateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::Validation(_) => "validation_failed",
            ApiError::Gateway(_) => "payment_gateway_error",
            ApiError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            ApiError::Internal(detail) => {
                error!(error = %detail, "request failed");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code(),
                message: &message,
            },
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<CommerceError> for ApiError {
    fn from(e: CommerceError) -> Self {
        let message = e.to_string();
        match e {
            e if e.is_not_found() => ApiError::NotFound(message),
            CommerceError::InsufficientStock { .. }
            | CommerceError::InvalidStatusTransition { .. } => ApiError::Conflict(message),
            CommerceError::InvalidSignature => ApiError::BadRequest(message),
            CommerceError::DatabaseError(_) | CommerceError::SerializationError(_) => {
                ApiError::Internal(message)
            }
            _ => ApiError::Validation(message),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound => ApiError::NotFound("record not found".to_string()),
            DbError::Conflict(detail) => {
                ApiError::Conflict(format!("conflicts with an existing record: {}", detail))
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        let message = e.to_string();
        if e.is_auth_failure() {
            return ApiError::Unauthorized(message);
        }
        if e.is_permission_error() {
            return ApiError::Forbidden(message);
        }
        match e {
            AuthError::UserAlreadyExists(_) => ApiError::Conflict(message),
            AuthError::WeakPassword(_) | AuthError::Validation(_) => ApiError::Validation(message),
            _ => ApiError::Internal(message),
        }
    }
}

impl From<GatewayError> for ApiError {
    fn from(e: GatewayError) -> Self {
        ApiError::Gateway(e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maison_commerce::{Currency, Money};

    #[test]
    fn test_commerce_error_mapping() {
        let stock = CommerceError::InsufficientStock {
            variant_id: "v".into(),
            requested: 3,
            available: 1,
        };
        assert_eq!(ApiError::from(stock).status(), StatusCode::CONFLICT);

        let coupon = CommerceError::CouponMinimumNotMet {
            code: "SAVE".into(),
            required: Money::new(100, Currency::INR),
        };
        assert_eq!(
            ApiError::from(coupon).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );

        assert_eq!(
            ApiError::from(CommerceError::OrderNotFound("o".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(CommerceError::InvalidSignature).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_db_and_auth_mapping() {
        assert_eq!(
            ApiError::from(DbError::Conflict("UNIQUE".into())).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(DbError::QueryError("boom".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(AuthError::TokenExpired).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(AuthError::InsufficientPermissions).status(),
            StatusCode::FORBIDDEN
        );
    }
}
