use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use super::ErrorBody;
use crate::services::AccountError;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    DatabaseError(String),

    ValidationError(String),

    Conflict(String),

    InternalError(String),

    Unauthorized(String),

    Forbidden(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::ValidationError(msg) => write!(f, "Validation error: {msg}"),
            Self::Conflict(msg) => write!(f, "Conflict: {msg}"),
            Self::InternalError(msg) => write!(f, "Internal error: {msg}"),
            Self::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
            Self::Forbidden(msg) => write!(f, "Forbidden: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
            Self::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg),
            Self::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
        };

        (status, Json(ErrorBody::new(error_message))).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError(format!("{err:#}"))
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        let message = err.to_string();
        match err {
            AccountError::Validation(msg) => Self::ValidationError(msg),
            AccountError::UsernameTaken | AccountError::EmailTaken => Self::Conflict(message),
            AccountError::InvalidCredentials | AccountError::RequesterNotFound => {
                Self::Unauthorized(message)
            }
            AccountError::UserNotFound => Self::NotFound(message),
            AccountError::Forbidden => Self::Forbidden(message),
            AccountError::MissingDefaultRole(_) | AccountError::Internal(_) => {
                Self::InternalError(message)
            }
            AccountError::Database(msg) => Self::DatabaseError(msg),
        }
    }
}

impl ApiError {
    pub fn not_found(resource: &str, id: impl fmt::Display) -> Self {
        Self::NotFound(format!("{resource} {id} not found"))
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_error_status_codes() {
        let cases = [
            (AccountError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (AccountError::UsernameTaken, StatusCode::CONFLICT),
            (AccountError::EmailTaken, StatusCode::CONFLICT),
            (AccountError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (AccountError::RequesterNotFound, StatusCode::UNAUTHORIZED),
            (AccountError::UserNotFound, StatusCode::NOT_FOUND),
            (AccountError::Forbidden, StatusCode::FORBIDDEN),
            (
                AccountError::MissingDefaultRole(2),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            let response = ApiError::from(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }

    #[test]
    fn test_conflict_message() {
        match ApiError::from(AccountError::UsernameTaken) {
            ApiError::Conflict(msg) => assert_eq!(msg, "Username already exists"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
