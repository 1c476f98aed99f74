use lambda_http::http::StatusCode;
use thiserror::Error;

/// Errors surfaced by the stores, services and catalog clients.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    AlreadyExists(String),

    /// A create collided with an existing primary key.
    #[error("record already exists: {0}")]
    Conflict(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("password hash error: {0}")]
    Hash(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::AlreadyExists(_) => StatusCode::CONFLICT,
            Self::Conflict(_)
            | Self::Storage(_)
            | Self::Upstream(_)
            | Self::Serialization(_)
            | Self::Hash(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to hand back to the caller. Server-side failures only
    /// expose a static description; the detail goes to the logs.
    pub fn client_message(&self) -> String {
        match self {
            Self::Validation(m)
            | Self::Unauthorized(m)
            | Self::NotFound(m)
            | Self::AlreadyExists(m) => m.clone(),
            Self::Conflict(_) | Self::Storage(_) => "Failed to access user store".to_string(),
            Self::Upstream(_) => "Failed to access content details".to_string(),
            Self::Serialization(_) => "Failed to marshal response".to_string(),
            Self::Hash(_) => "Failed to process credentials".to_string(),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        Self::Upstream(e.to_string())
    }
}

/// Missing or malformed process configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
}
