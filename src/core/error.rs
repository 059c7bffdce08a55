// Centralized error handling for the panel service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

/// Exit code the account store CLI uses for a missing object
const EXIT_OBJECT_NOT_EXISTS: i32 = 3;

/// Failure reported by an Account Store invocation
#[derive(Error, Debug)]
pub enum StoreError {
    /// Command exited non-zero. The message is the CLI's own diagnostic
    /// output, or the generic "Error code: N" fallback when the command
    /// produced none.
    #[error("{message}")]
    Command { status: i32, message: String },

    #[error("Account store command timed out")]
    Timeout,

    #[error("Failed to run account store command: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse account store output: {0}")]
    BadOutput(String),
}

impl StoreError {
    /// Build a command failure from an exit status and captured output lines
    pub fn from_exit(status: i32, output: &[String]) -> Self {
        let message = output
            .iter()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        let message = if message.is_empty() {
            format!("Error code: {}", status)
        } else {
            message
        };

        StoreError::Command { status, message }
    }

    /// Whether this failure means the target account does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::Command {
                status: EXIT_OBJECT_NOT_EXISTS,
                ..
            }
        )
    }
}

#[derive(Error, Debug)]
pub enum PanelError {
    #[error("Session required")]
    SessionRequired,

    #[error("Access denied")]
    Forbidden,

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Account store error: {0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for PanelError {
    fn into_response(self) -> Response {
        use crate::models::response::ErrorResponse;

        let (status, error_message) = match &self {
            PanelError::SessionRequired => (StatusCode::UNAUTHORIZED, self.to_string()),
            PanelError::Forbidden => (StatusCode::FORBIDDEN, self.to_string()),
            PanelError::InvalidApiKey => (StatusCode::UNAUTHORIZED, self.to_string()),
            PanelError::InvalidParameter(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            PanelError::Store(_) => (StatusCode::BAD_GATEWAY, self.to_string()),
        };

        (
            status,
            Json(ErrorResponse {
                success: false,
                error: error_message,
            }),
        )
            .into_response()
    }
}
