use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::search::ValidationError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{0}")]
    InvalidRequest(#[from] ValidationError),

    #[error("Document not found")]
    DocumentNotFound,

    #[error("Rate limit exceeded")]
    RateLimited { limit: u32 },

    #[error("search failed: {0}")]
    SearchFailed(String),

    #[error("internal error: {0}")]
    InternalError(String),
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub code: u16,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, error_message, message) = match &self {
            GatewayError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, self.to_string(), None),
            GatewayError::DocumentNotFound => (StatusCode::NOT_FOUND, self.to_string(), None),
            GatewayError::RateLimited { limit } => (
                StatusCode::TOO_MANY_REQUESTS,
                self.to_string(),
                Some(format!("Maximum {} requests per minute allowed", limit)),
            ),
            // Details stay in the log; clients get a generic message.
            GatewayError::SearchFailed(detail) => {
                error!(error = %detail, "Search failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Search failed".to_string(),
                    None,
                )
            }
            GatewayError::InternalError(detail) => {
                error!(error = %detail, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_message,
            message,
            code: status.as_u16(),
        });

        (status, body).into_response()
    }
}
