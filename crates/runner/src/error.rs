use odyssey_session::SessionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("Invalid classroom config: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Session(#[from] SessionError),
}

pub type Result<T> = std::result::Result<T, RunnerError>;
