//! Unified application error model and its HTTP mapping.
//! Domain modules raise their own typed errors (`AuthError`, `StoreError`); this enum is
//! the one shape handlers return, and it renders as `{"error": "<message>"}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use tracing::{error, warn};

use crate::identity::AuthError;
use crate::storage::StoreError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppError {
    UserInput { code: String, message: String },
    NotFound { code: String, message: String },
    Auth { code: String, message: String },
    Internal { code: String, message: String },
}

impl AppError {
    pub fn code_str(&self) -> &str {
        match self {
            AppError::UserInput { code, .. }
            | AppError::NotFound { code, .. }
            | AppError::Auth { code, .. }
            | AppError::Internal { code, .. } => code.as_str(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::UserInput { message, .. }
            | AppError::NotFound { message, .. }
            | AppError::Auth { message, .. }
            | AppError::Internal { message, .. } => message.as_str(),
        }
    }

    pub fn user<S: Into<String>>(code: S, msg: S) -> Self { AppError::UserInput { code: code.into(), message: msg.into() } }
    pub fn not_found<S: Into<String>>(code: S, msg: S) -> Self { AppError::NotFound { code: code.into(), message: msg.into() } }
    pub fn auth<S: Into<String>>(code: S, msg: S) -> Self { AppError::Auth { code: code.into(), message: msg.into() } }
    pub fn internal<S: Into<String>>(code: S, msg: S) -> Self { AppError::Internal { code: code.into(), message: msg.into() } }

    /// Map to HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            AppError::UserInput { .. } => 400,
            AppError::NotFound { .. } => 404,
            AppError::Auth { .. } => 401,
            AppError::Internal { .. } => 500,
        }
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code_str(), self.message())
    }
}

impl std::error::Error for AppError {}

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ErrorBody { error: self.message() })).into_response()
    }
}

/// Every token or header failure collapses to the same 401 so clients cannot tell a
/// missing token from an expired or forged one. The precise cause only reaches the log.
impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::PasswordMismatch => {
                warn!(target: "chirpy::auth", reason = %err, "login rejected");
                AppError::auth("invalid_credentials", "Incorrect email or password")
            }
            ref internal if internal.is_internal() => {
                error!(target: "chirpy::auth", reason = %err, "credential operation failed");
                AppError::internal("internal", "Something went wrong")
            }
            _ => {
                warn!(target: "chirpy::auth", reason = %err, "request unauthorized");
                AppError::auth("unauthorized", "Unauthorized")
            }
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => AppError::not_found("not_found".to_string(), format!("No {what} found")),
            StoreError::DuplicateEmail(_) => {
                error!(target: "chirpy::storage", reason = %err, "user insert failed");
                AppError::internal("storage", "Could not create user")
            }
            StoreError::Unavailable(_) => {
                error!(target: "chirpy::storage", reason = %err, "store operation failed");
                AppError::internal("storage", "Something went wrong")
            }
        }
    }
}
