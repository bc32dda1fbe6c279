use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error surface for remote failures: the service either produced a typed
/// [`ApiError`] payload or failed at the transport level.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("remote service rejected the request: {0:?}: {1}")]
    Api(ErrorCode, String),
    #[error("transport failure talking to remote service: {0}")]
    Transport(String),
}

impl From<ApiError> for ServiceError {
    fn from(value: ApiError) -> Self {
        Self::Api(value.code, value.message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    BadRequest,
    NotFound,
    Validation,
    Internal,
}

/// Error payload shape returned by the remote collection service on
/// non-success responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}
