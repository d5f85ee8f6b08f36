/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / JSON error body)
 * - token / 認可 / 転送前バリデーション / repo のエラーを統一的に変換
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::repos::RepoError;
use crate::services::auth::{Denied, TokenError};
use crate::services::forward::ForwardError;
use crate::services::swagger::SwaggerFetchError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{code}: {message}")]
    BadRequest { code: &'static str, message: String },
    #[error("{code}: {message}")]
    Forbidden { code: &'static str, message: String },
    #[error("not found: {resource}")]
    NotFound { resource: &'static str },
    #[error("conflict: {message}")]
    Conflict { message: String },
    #[error("upstream {status}: {message}")]
    Upstream { status: StatusCode, message: String },
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            message: message.into(),
        }
    }

    /// Token missing, malformed or failing verification.
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Forbidden {
            code: "UNAUTHENTICATED",
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            code: "FORBIDDEN",
            message: message.into(),
        }
    }

    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::BadRequest { code, message } => (StatusCode::BAD_REQUEST, code, message),
            AppError::Forbidden { code, message } => (StatusCode::FORBIDDEN, code, message),
            AppError::NotFound { resource } => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{resource} not found."),
            ),
            AppError::Conflict { message } => (StatusCode::CONFLICT, "CONFLICT", message),
            AppError::Upstream { status, message } => (status, "UPSTREAM_ERROR", message),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_SERVER_ERROR",
                "internal server error".into(),
            ),
        };

        let body = ErrorResponse {
            error: ErrorBody { code, message },
        };

        (status, Json(body)).into_response()
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Conflict => AppError::conflict("conflict"),
            RepoError::Db(err) => {
                tracing::error!(error = ?err, "database error");
                AppError::Internal
            }
        }
    }
}

impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Jwt(_) => AppError::unauthenticated("Invalid token or expired token."),
            TokenError::MissingGrants | TokenError::Claims(_) => {
                AppError::unauthenticated("Invalid authorization code.")
            }
        }
    }
}

impl From<Denied> for AppError {
    fn from(e: Denied) -> Self {
        AppError::Forbidden {
            code: "UNAUTHORIZED",
            message: e.to_string(),
        }
    }
}

impl From<ForwardError> for AppError {
    fn from(e: ForwardError) -> Self {
        let code = match e {
            ForwardError::MissingTarget => "MISSING_TARGET",
            ForwardError::InvalidTargetFormat => "INVALID_TARGET_FORMAT",
            ForwardError::InvalidPayload => "INVALID_PAYLOAD",
        };
        AppError::bad_request(code, e.to_string())
    }
}

impl From<SwaggerFetchError> for AppError {
    fn from(e: SwaggerFetchError) -> Self {
        let status = match &e {
            SwaggerFetchError::Upstream { status, .. } => *status,
            SwaggerFetchError::Transport { .. } => StatusCode::BAD_GATEWAY,
        };
        AppError::Upstream {
            status,
            message: e.to_string(),
        }
    }
}
