use thiserror::Error;

/// Failure taxonomy for one pipeline run.  Every stage maps its failures
/// into one of these variants and propagates upward; nothing is retried.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("network error: {0}")]
    Network(String),

    #[error("extraction error: {0}")]
    Extraction(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("storage error: {0}")]
    Storage(#[from] duckdb::Error),
}

impl From<reqwest::Error> for PipelineError {
    fn from(e: reqwest::Error) -> Self {
        PipelineError::Network(e.to_string())
    }
}

impl From<csv::Error> for PipelineError {
    fn from(e: csv::Error) -> Self {
        let msg = e.to_string();
        match e.into_kind() {
            csv::ErrorKind::Io(io) => PipelineError::Io(io),
            _ => PipelineError::Parse(msg),
        }
    }
}
