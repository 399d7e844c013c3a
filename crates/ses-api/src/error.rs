use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::{borrow::Cow, future::Future};
use thiserror::Error;
use tracing::{error, warn};

use ses_common::db::{MatchResultStorageError, MatchingStorageError, ReconciliationStorageError};
use ses_common::tier::TierViolation;

tokio::task_local! {
    static REQUEST_ID: String;
}

const MAX_MESSAGE_CHARS: usize = 240;

fn sanitize_message(message: &str) -> String {
    let cleaned = message
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .map(|token| {
            if token.contains("://") {
                "[redacted-url]".to_string()
            } else if let Some((base, _)) = token.split_once('?') {
                if base.is_empty() {
                    "[redacted-query]".to_string()
                } else {
                    format!("{base}?[redacted]")
                }
            } else if token.starts_with('/') || token.contains('\\') {
                "[redacted-path]".to_string()
            } else {
                token.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ");

    if cleaned.is_empty() {
        return "unexpected error".to_string();
    }

    // 日本語メッセージを途中で切らないよう文字数で丸める
    if cleaned.chars().count() > MAX_MESSAGE_CHARS {
        let mut truncated = cleaned.chars().take(MAX_MESSAGE_CHARS).collect::<String>();
        truncated.push('…');
        truncated
    } else {
        cleaned
    }
}

pub async fn with_request_id<Fut, T>(request_id: Option<String>, fut: Fut) -> T
where
    Fut: Future<Output = T>,
{
    if let Some(request_id) = request_id {
        REQUEST_ID.scope(request_id, fut).await
    } else {
        fut.await
    }
}

pub fn current_request_id() -> Option<String> {
    REQUEST_ID.try_with(|value| value.clone()).ok()
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("database error: {0}")]
    Database(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    /// 商流制約違反。メッセージは整形済みのものをそのまま返す
    #[error("tier violation: {0}")]
    TierViolation(String),
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("internal server error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    code: &'static str,
    message: String,
    request_id: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let code = self.code();
        let request_id = current_request_id();

        if status.is_server_error() {
            error!(
                code,
                status = %status,
                request_id = request_id.as_deref().unwrap_or(""),
                error = %self,
                "api_error"
            );
        } else {
            warn!(
                code,
                status = %status,
                request_id = request_id.as_deref().unwrap_or(""),
                error = %self,
                "api_error"
            );
        }

        let body = Json(ErrorResponse {
            code,
            message: self.public_message().into_owned(),
            request_id,
        });

        (status, body).into_response()
    }
}

impl ApiError {
    fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::TierViolation(_) => "tier_violation",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::NotFound(_) => "not_found",
            ApiError::ServiceUnavailable(_) => "service_unavailable",
            ApiError::Database(_) => "database_error",
            ApiError::Internal(_) => "internal_error",
        }
    }

    fn public_message(&self) -> Cow<'static, str> {
        match self {
            ApiError::BadRequest(msg) | ApiError::NotFound(msg) => Cow::Owned(sanitize_message(msg)),
            ApiError::TierViolation(msg) => Cow::Owned(msg.clone()),
            ApiError::Unauthorized(_) => Cow::Borrowed("unauthorized"),
            ApiError::ServiceUnavailable(_) => Cow::Borrowed("service unavailable"),
            ApiError::Database(_) | ApiError::Internal(_) => Cow::Borrowed("internal server error"),
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::TierViolation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<TierViolation> for ApiError {
    fn from(value: TierViolation) -> Self {
        ApiError::TierViolation(value.message().to_string())
    }
}

impl From<MatchingStorageError> for ApiError {
    fn from(value: MatchingStorageError) -> Self {
        match value {
            MatchingStorageError::ProjectNotFound(id) => {
                ApiError::NotFound(format!("project not found: {id}"))
            }
            MatchingStorageError::EngineerNotFound(id) => {
                ApiError::NotFound(format!("engineer not found: {id}"))
            }
            other => ApiError::Database(other.to_string()),
        }
    }
}

impl From<MatchResultStorageError> for ApiError {
    fn from(value: MatchResultStorageError) -> Self {
        ApiError::Database(value.to_string())
    }
}

impl From<ReconciliationStorageError> for ApiError {
    fn from(value: ReconciliationStorageError) -> Self {
        match value {
            ReconciliationStorageError::PaymentNotFound(id) => {
                ApiError::NotFound(format!("入金データが見つかりません (payment {id})"))
            }
            ReconciliationStorageError::InvoiceNotFound(id) => {
                ApiError::NotFound(format!("請求書が見つかりません (invoice {id})"))
            }
            ReconciliationStorageError::Lifecycle(err) => ApiError::BadRequest(err.to_string()),
            other => ApiError::Database(other.to_string()),
        }
    }
}
