use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use validator::ValidationErrors;

use crate::validation::field_messages;

const BAD_REQUEST_TYPE: &str = "https://tools.ietf.org/html/rfc9110#section-15.5.1";
const SERVER_ERROR_TYPE: &str = "https://tools.ietf.org/html/rfc9110#section-15.6.1";
const UNAVAILABLE_TYPE: &str = "https://tools.ietf.org/html/rfc9110#section-15.6.4";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("invalid search input")]
    InvalidArgument(ValidationErrors),

    #[error("malformed request body: {0}")]
    MalformedBody(String),

    #[error("data store unavailable: {0}")]
    StoreUnavailable(#[from] sea_orm::DbErr),

    #[error("request cancelled")]
    Cancelled,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<jiff::Error> for AppError {
    fn from(err: jiff::Error) -> Self {
        Self::Internal(anyhow::Error::new(err))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::MalformedBody(rejection.body_text())
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidArgument(_) | AppError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            AppError::StoreUnavailable(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
            AppError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AppError::InvalidArgument(errors) => json!({
                "type": BAD_REQUEST_TYPE,
                "title": "Validation Failed",
                "status": status.as_u16(),
                "detail": "The provided search input is invalid",
                "errors": field_messages(errors),
            }),
            AppError::MalformedBody(message) => json!({
                "type": BAD_REQUEST_TYPE,
                "title": "Validation Error",
                "status": status.as_u16(),
                "detail": "The request body could not be read",
                "errors": { "body": [message] },
            }),
            AppError::StoreUnavailable(err) => {
                tracing::error!(error = %err, "data store failure");
                json!({
                    "type": SERVER_ERROR_TYPE,
                    "title": "Store Unavailable",
                    "status": status.as_u16(),
                    "detail": "The movie catalog could not be queried",
                })
            },
            AppError::Cancelled => {
                tracing::debug!("request cancelled before completion");
                json!({
                    "type": UNAVAILABLE_TYPE,
                    "title": "Cancelled",
                    "status": status.as_u16(),
                    "detail": "The request was cancelled before it completed",
                })
            },
            AppError::Internal(err) => {
                tracing::error!(error = ?err, "internal error");
                json!({
                    "type": SERVER_ERROR_TYPE,
                    "title": "Internal Error",
                    "status": status.as_u16(),
                    "detail": "An unexpected error occurred",
                })
            },
        };

        (status, [(header::CONTENT_TYPE, "application/problem+json")], Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn store_errors_do_not_leak_details() {
        let err = AppError::from(sea_orm::DbErr::Custom("disk I/O error at /var/lib/x".into()));
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["title"], "Store Unavailable");
        assert!(!body.to_string().contains("/var/lib/x"));
    }

    #[tokio::test]
    async fn cancelled_maps_to_service_unavailable() {
        let (status, body) = body_json(AppError::Cancelled).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], 503);
    }

    #[tokio::test]
    async fn malformed_body_is_reported_on_body_field() {
        let (status, body) = body_json(AppError::MalformedBody("expected value".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"]["body"][0], "expected value");
    }
}
