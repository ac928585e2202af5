//! Mapping of failures onto HTTP responses.
//!
//! | Failure | Status |
//! |---------|--------|
//! | Validation | 422 with `details` and `droppedRecords` |
//! | Body rejected by the extractor | the rejection's own status (400/413/415/422) |
//! | Invariant violation | 500, generic message |

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::error::BalancerError;

/// Errors returned by handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Balancer(#[from] BalancerError),
    #[error(transparent)]
    Rejected(#[from] JsonRejection),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Balancer(BalancerError::Validation { errors, dropped }) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({
                    "error": "validation_failed",
                    "details": errors,
                    "droppedRecords": dropped,
                })),
            )
                .into_response(),
            ApiError::Balancer(BalancerError::Invariant(message)) => {
                error!(%message, "internal invariant violated");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "internal_error",
                        "message": "the assignment could not be computed",
                    })),
                )
                    .into_response()
            }
            ApiError::Rejected(rejection) => (
                rejection.status(),
                Json(json!({
                    "error": "invalid_request",
                    "message": rejection.body_text(),
                })),
            )
                .into_response(),
        }
    }
}
