use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised by the retrieval core.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A source corpus file or a persisted artifact is missing.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),
    /// A single source record could not be parsed.
    #[error("malformed record {record}: {reason}")]
    Parse { record: usize, reason: String },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("document not found: {0}")]
    NotFound(String),
    /// Index build parameters or corpus do not allow a vectorizer to be fitted.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Persisted artifacts disagree with each other.
    #[error("corrupt index: {0}")]
    Corrupt(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Bincode(#[from] bincode::Error),
}
