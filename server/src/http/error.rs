use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use harvester_client::{CodecError, TransportError};
use thiserror::Error;
use tracing::{debug, error};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    /// The Harvester answered with an error status
    #[error("{message}")]
    Upstream { status: u16, message: String },

    #[error("{0}")]
    Translation(String),

    #[error("{0}")]
    Transport(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            // Relayed as-is; anything that would not read as a failure becomes 502
            ApiError::Upstream { status, .. } => StatusCode::from_u16(*status)
                .ok()
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::BAD_GATEWAY),
            ApiError::Translation(_) | ApiError::Transport(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        if status.is_server_error() {
            error!("{} {}", status.as_u16(), message);
        } else {
            debug!("{} {}", status.as_u16(), message);
        }

        (status, message).into_response()
    }
}

impl From<CodecError> for ApiError {
    fn from(err: CodecError) -> Self {
        ApiError::Translation(err.to_string())
    }
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        ApiError::Transport(err.message)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
