use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::errors::InvalidArgument;

#[derive(Debug, Serialize)]
pub struct ErrorReply {
    pub status: u16,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Everything that turns a `/search` call into a non-200 reply.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    InvalidArgument(#[from] InvalidArgument),
    #[error("{message}")]
    Internal { message: String, details: String },
    #[error("not found")]
    NotFound,
}

impl ApiError {
    pub fn internal(message: &str, details: impl ToString) -> ApiError {
        ApiError::Internal {
            message: message.to_string(),
            details: details.to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (example, details) = match &self {
            ApiError::InvalidArgument(e) => (e.example().map(str::to_string), None),
            ApiError::Internal { details, .. } => (None, Some(details.clone())),
            ApiError::NotFound => (None, None),
        };
        let body = ErrorReply {
            status: status.as_u16(),
            error: self.to_string(),
            example,
            details,
        };
        (status, Json(body)).into_response()
    }
}
