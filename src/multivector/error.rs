use thiserror::Error;

/// Errors from multi-vector encoding and the tensor backend.
#[derive(Debug, Error)]
pub enum TensorBackendError {
    #[error("invalid multi-vector configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("tensor backend request failed: {message}")]
    Http { message: String },

    #[error("tensor backend rejected request ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("invalid tensor backend response: {message}")]
    InvalidResponse { message: String },
}

impl From<reqwest::Error> for TensorBackendError {
    fn from(err: reqwest::Error) -> Self {
        TensorBackendError::Http {
            message: err.to_string(),
        }
    }
}
