use thiserror::Error;

/// Caller-visible failures. Analyzer failures never surface here; they are
/// absorbed by the orchestrator and turned into fallback scores.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Unknown analysis profile: {0}")]
    UnknownProfile(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid business descriptor: {0}")]
    InvalidBusiness(String),

    #[error("Unknown report format: {0}")]
    UnknownFormat(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
