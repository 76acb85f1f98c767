use sitelens_core::analyzer::AnalyzerError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {url}")]
    StatusError { status: u16, url: String },

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("JSON decode error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("{0} is not configured")]
    MissingCredential(&'static str),

    #[error("Unsupported target: {0}")]
    UnsupportedTarget(String),

    #[error("Upstream API error: {0}")]
    ApiError(String),
}

pub type Result<T> = std::result::Result<T, ScanError>;

impl From<ScanError> for AnalyzerError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::HttpError(ref e) if e.is_decode() => {
                AnalyzerError::MalformedResponse(err.to_string())
            }
            ScanError::HttpError(_) | ScanError::StatusError { .. } | ScanError::ApiError(_) => {
                AnalyzerError::Unavailable(err.to_string())
            }
            ScanError::ParseError(_) | ScanError::JsonError(_) => {
                AnalyzerError::MalformedResponse(err.to_string())
            }
            ScanError::MissingCredential(_) => AnalyzerError::NotConfigured(err.to_string()),
            ScanError::UnsupportedTarget(_) => AnalyzerError::UnsupportedTarget(err.to_string()),
        }
    }
}
