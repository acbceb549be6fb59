/// Error types for cvscout.
///
/// Most conditions the search core meets are not failures at all: an empty
/// corpus, an empty keyword list or a degenerate matcher input each produce
/// an empty, well-typed result. The variants here cover the few places where
/// something can actually go wrong (loading config, reading corpus files) and
/// the recoverable signals the orchestrator acts on, such as an unknown
/// algorithm selector.
///
/// ```rust,ignore
/// match "rabin-karp".parse::<Algorithm>() {
///     Ok(algorithm) => // use it,
///     Err(SearchError::UnrecognizedAlgorithm(name)) => // fall back to KMP,
///     Err(e) => // anything else
/// }
/// ```
use std::path::PathBuf;
use thiserror::Error;

/// Result type for search operations
pub type SearchResult<T> = Result<T, SearchError>;

/// Errors that can occur while configuring or feeding a search
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Unrecognized algorithm: {0}")]
    UnrecognizedAlgorithm(String),
    #[error("Fuzzy threshold out of range [0, 100]: {0}")]
    InvalidThreshold(f64),
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Invalid UTF-8 in file {path}: {source}")]
    EncodingError {
        path: PathBuf,
        source: std::string::FromUtf8Error,
    },
}

impl SearchError {
    pub fn unrecognized_algorithm(name: impl Into<String>) -> Self {
        Self::UnrecognizedAlgorithm(name.into())
    }

    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound(path.into())
    }

    pub fn permission_denied(path: impl Into<PathBuf>) -> Self {
        Self::PermissionDenied(path.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn encoding_error(path: impl Into<PathBuf>, source: std::string::FromUtf8Error) -> Self {
        Self::EncodingError {
            path: path.into(),
            source,
        }
    }

    /// Maps an IO error on `path` to the most specific variant
    pub fn from_io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::file_not_found(path),
            std::io::ErrorKind::PermissionDenied => Self::permission_denied(path),
            _ => Self::IoError(err),
        }
    }
}

impl From<config::ConfigError> for SearchError {
    fn from(err: config::ConfigError) -> Self {
        Self::ConfigError(err.to_string())
    }
}
