use uuid::Uuid;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),

    #[error("Invalid session state: {0}")]
    InvalidState(String),

    #[error("Model provider error: {0}")]
    Provider(String),

    #[error("Malformed model output: {0}")]
    MalformedModelOutput(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Provider and model-output failures are recovered locally by the
    /// deterministic fallback scoring path; everything else surfaces to the
    /// caller.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Provider(_) | Error::MalformedModelOutput(_) | Error::Reqwest(_)
        )
    }
}
