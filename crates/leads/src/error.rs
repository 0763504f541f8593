use thiserror::Error;

#[derive(Debug, Error)]
pub enum LeadError {
    #[error("Invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("Authentication required")]
    Unauthorized,

    #[error("Submission {0} not found")]
    NotFound(i64),

    #[error("Too many requests, try again in {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },

    #[error("Storage error: {0}")]
    Store(String),

    #[error("Notification error: {0}")]
    Notify(String),
}

impl LeadError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        LeadError::Validation {
            field,
            message: message.into(),
        }
    }

    /// Stable machine-readable code, used in API error bodies
    pub fn code(&self) -> &'static str {
        match self {
            LeadError::Validation { .. } => "BAD_REQUEST",
            LeadError::Unauthorized => "UNAUTHORIZED",
            LeadError::NotFound(_) => "NOT_FOUND",
            LeadError::RateLimited { .. } => "TOO_MANY_REQUESTS",
            LeadError::Store(_) | LeadError::Notify(_) => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl From<rusqlite::Error> for LeadError {
    fn from(err: rusqlite::Error) -> Self {
        LeadError::Store(err.to_string())
    }
}

impl From<reqwest::Error> for LeadError {
    fn from(err: reqwest::Error) -> Self {
        LeadError::Notify(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LeadError>;
