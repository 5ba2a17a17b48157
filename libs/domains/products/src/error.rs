use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use stream_worker::StreamError;
use strum::AsRefStr;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, AsRefStr)]
pub enum ProductError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Product not found: {0}")]
    NotFound(Uuid),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ProductResult<T> = Result<T, ProductError>;

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ProductError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProductError::Validation(_) => StatusCode::BAD_REQUEST,
            ProductError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProductError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // Backend failures keep their details in the log only.
        let message = match &self {
            ProductError::Validation(_) | ProductError::NotFound(_) => self.to_string(),
            _ => {
                tracing::error!(error = %self, kind = self.as_ref(), "Request failed");
                status
                    .canonical_reason()
                    .unwrap_or("Internal Server Error")
                    .to_string()
            }
        };

        let body = Json(ErrorResponse {
            error: self.as_ref().to_string(),
            message,
        });
        (status, body).into_response()
    }
}

impl From<mongodb::error::Error> for ProductError {
    fn from(err: mongodb::error::Error) -> Self {
        ProductError::Persistence(err.to_string())
    }
}

impl From<redis::RedisError> for ProductError {
    fn from(err: redis::RedisError) -> Self {
        ProductError::Cache(err.to_string())
    }
}

impl From<StreamError> for ProductError {
    fn from(err: StreamError) -> Self {
        ProductError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for ProductError {
    fn from(err: serde_json::Error) -> Self {
        ProductError::Internal(err.to_string())
    }
}

/// Errors handed back to the worker pool. Validation stays distinguishable so
/// the pool can tell bad input from a failed apply.
impl From<ProductError> for StreamError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::Validation(msg) => StreamError::Validation(msg),
            other => StreamError::Processing(other.to_string()),
        }
    }
}
