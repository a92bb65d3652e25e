use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::config::MissingConfig;

/// Terminal failure of a single relay invocation.
///
/// None of these are retried; each maps straight to a response.
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Missing {0}")]
    ConfigurationMissing(MissingConfig),

    #[error("Invalid JSON")]
    InvalidInput(String),

    #[error("Telegram request failed: {0}")]
    TransportFailure(String),

    #[error("Telegram error: {body}")]
    RemoteRejected { status: u16, body: String },
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            RelayError::ConfigurationMissing(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RelayError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            RelayError::TransportFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RelayError::RemoteRejected { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            RelayError::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            RelayError::ConfigurationMissing(_) => "CONFIG_MISSING",
            RelayError::InvalidInput(_) => "INVALID_INPUT",
            RelayError::TransportFailure(_) => "TRANSPORT_FAILURE",
            RelayError::RemoteRejected { .. } => "REMOTE_REJECTED",
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Always log the detailed error server-side
        match &self {
            RelayError::InvalidInput(detail) => tracing::warn!(
                code = %self.code(),
                status = %status.as_u16(),
                detail = %detail,
                "Rejected submission"
            ),
            RelayError::MethodNotAllowed => tracing::warn!(
                code = %self.code(),
                status = %status.as_u16(),
                "Rejected submission"
            ),
            RelayError::RemoteRejected {
                status: remote_status,
                ..
            } => tracing::error!(
                code = %self.code(),
                status = %status.as_u16(),
                remote_status = %remote_status,
                message = %self,
                "Relay error"
            ),
            _ => tracing::error!(
                code = %self.code(),
                status = %status.as_u16(),
                message = %self,
                "Relay error"
            ),
        }

        (status, self.to_string()).into_response()
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
