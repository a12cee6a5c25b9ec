use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::lifecycle::TranslationStatus;

/// Errors surfaced synchronously to API callers.
///
/// Translation-unit failures and job-fatal failures never appear here: those
/// are handled inside the detached job (skip-and-continue, or lifecycle
/// status `Error`) and are only observable by polling the language status.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("tenant not found")]
    TenantNotFound,

    #[error("language '{0}' not found")]
    LanguageNotFound(String),

    #[error("language code must not be empty")]
    EmptyLanguageCode,

    #[error("'{0}' is the default language and is always available")]
    DefaultLanguageAdd(String),

    #[error("the default language cannot be removed")]
    DefaultLanguageDeletion,

    #[error("language '{code}' cannot be published while {status}")]
    PublishNotAllowed {
        code: String,
        status: TranslationStatus,
    },

    #[error("a translation job for '{0}' is already running")]
    JobAlreadyRunning(String),

    #[error("override key must not be empty")]
    EmptyOverrideKey,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::TenantNotFound | ApiError::LanguageNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::EmptyLanguageCode
            | ApiError::DefaultLanguageAdd(_)
            | ApiError::DefaultLanguageDeletion
            | ApiError::EmptyOverrideKey => StatusCode::BAD_REQUEST,
            ApiError::PublishNotAllowed { .. } | ApiError::JobAlreadyRunning(_) => {
                StatusCode::CONFLICT
            }
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("request failed: {:#}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
