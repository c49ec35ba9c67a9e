use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The service answered with a non-success status.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),
}

impl ApiError {
    /// IPC error code for failures that aren't a plain rejection.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Rejected { .. } => "api_rejected",
            ApiError::Transport(_) => "api_unavailable",
            ApiError::Decode(_) => "api_bad_response",
            ApiError::InvalidConfig(_) => "bad_config",
        }
    }

    /// Message from the service, when there is one worth showing to the user.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Rejected { message, .. } if !message.trim().is_empty() => Some(message.as_str()),
            _ => None,
        }
    }
}
