/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / JSON error body)
 * - token / repo / auth error を統一的に変換
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::middleware::http::current_trace_id;
use crate::repos::error::RepoError;
use crate::services::auth::jwt::TokenError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{code}: {message}")]
    InvalidRequest { code: &'static str, message: String },
    #[error("authentication required")]
    Unauthenticated,
    #[error("access denied")]
    Forbidden,
    #[error("refresh token is missing")]
    MissingRefreshToken,
    #[error("token expired")]
    TokenExpired,
    #[error("token invalid")]
    TokenInvalid,
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::bad_request("VALIDATION_ERROR", message)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated
            | AppError::MissingRefreshToken
            | AppError::TokenExpired
            | AppError::TokenInvalid => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidRequest { code, .. } => *code,
            AppError::Unauthenticated => "INVALID_AUTHENTICATION",
            AppError::Forbidden => "INVALID_AUTHORIZATION",
            AppError::MissingRefreshToken => "MISSING_REFRESH_TOKEN",
            AppError::TokenExpired => "TOKEN_EXPIRED",
            AppError::TokenInvalid => "TOKEN_INVALID",
            AppError::Internal => "INTERNAL_SERVER_ERROR",
        }
    }

    fn message(self) -> String {
        match self {
            AppError::InvalidRequest { message, .. } => message,
            AppError::Unauthenticated => "authentication is missing or invalid".into(),
            AppError::Forbidden => "you do not have permission to access this resource".into(),
            AppError::MissingRefreshToken => "refresh token cookie is not present".into(),
            AppError::TokenExpired => "token has expired".into(),
            AppError::TokenInvalid => "token is invalid".into(),
            AppError::Internal => "internal server error".into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let body = ErrorResponse {
            error: ErrorBody {
                code,
                message: self.message(),
                trace_id: current_trace_id(),
                timestamp: Utc::now(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Conflict => AppError::bad_request("BAD_REQUEST_001", "username is already taken"),
            RepoError::Db(err) => {
                tracing::error!(error = %err, "database error");
                AppError::Internal
            }
        }
    }
}

impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Expired => AppError::TokenExpired,
            TokenError::Malformed | TokenError::SignatureInvalid | TokenError::EmptyClaim(_) => {
                AppError::TokenInvalid
            }
            // Signing failures are server-side
            TokenError::Encoding(_) | TokenError::LifetimeOutOfRange(_) => AppError::Internal,
        }
    }
}
