use crate::generation::GenerationError;
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use shared::{StoreError, StoryRequestError};
use thiserror::Error;

/// Startup failures.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

/// Request failures, mapped to an HTTP status and a JSON body.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Story(#[from] StoryRequestError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Body(#[from] JsonRejection),
    #[error(transparent)]
    Path(#[from] PathRejection),
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

impl ApiError {
    fn status_and_kind(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Store(StoreError::Validation(_)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "validation")
            }
            ApiError::Store(StoreError::NotFound(_)) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::Store(StoreError::IdsExhausted) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "ids_exhausted")
            }
            ApiError::Story(_) => (StatusCode::UNPROCESSABLE_ENTITY, "precondition"),
            ApiError::Generation(GenerationError::Busy) => (StatusCode::CONFLICT, "busy"),
            ApiError::Generation(GenerationError::Timeout(_)) => {
                (StatusCode::GATEWAY_TIMEOUT, "generation")
            }
            ApiError::Generation(GenerationError::MissingApiKey) => {
                (StatusCode::UNAUTHORIZED, "generation")
            }
            ApiError::Generation(_) => (StatusCode::BAD_GATEWAY, "generation"),
            ApiError::Body(rejection) => (rejection.status(), "invalid_body"),
            ApiError::Path(rejection) => (rejection.status(), "invalid_path"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = self.status_and_kind();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }

        let body = ErrorBody {
            error: kind.to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
