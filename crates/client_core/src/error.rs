use shared::error::ErrorCode;
use thiserror::Error;

/// Shown when a failure carries no message of its own.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("request aborted")]
    Aborted,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("server returned {status}: {}", .message.as_deref().unwrap_or("<no message>"))]
    Api {
        status: u16,
        code: ErrorCode,
        message: Option<String>,
    },
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("{}", .0.as_deref().unwrap_or("<no message>"))]
    Other(Option<String>),
}

impl FetchError {
    pub fn api(status: u16, message: Option<String>) -> Self {
        FetchError::Api {
            status,
            code: ErrorCode::from_status(status),
            message,
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        FetchError::Other(Some(message.into()))
    }

    pub fn is_abort(&self) -> bool {
        matches!(self, FetchError::Aborted)
    }

    /// Text suitable for the `error` field of a controller state.
    pub fn user_message(&self) -> String {
        let message = match self {
            FetchError::Aborted => None,
            FetchError::Transport(message) | FetchError::Decode(message) => Some(message.as_str()),
            FetchError::Api { message, .. } | FetchError::Other(message) => message.as_deref(),
        };

        match message.map(str::trim) {
            Some(message) if !message.is_empty() => message.to_string(),
            _ => GENERIC_ERROR_MESSAGE.to_string(),
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            FetchError::api(status.as_u16(), None)
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}
