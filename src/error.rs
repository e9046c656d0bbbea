//! Error types for grove.

use thiserror::Error;

/// Result type for grove operations
pub type Result<T> = std::result::Result<T, GroveError>;

/// Errors raised by tree builds, hydration, and the storage backends
#[derive(Debug, Error)]
pub enum GroveError {
    /// The backend had no content for a file that must have content.
    #[error("Error reading {path}: backend returned no content")]
    ReadFailure { path: String },

    #[error("Filter evaluation failed for {path}: {source}")]
    FilterEvaluation {
        path: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Content transform failed for {path}: {source}")]
    Transform {
        path: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: Box<GroveError>,
    },

    #[error("Failed to create directory {path}: {source}")]
    DirectoryCreate {
        path: String,
        #[source]
        source: Box<GroveError>,
    },

    #[error("Expected a {expected} node at {path:?}, found a {actual} node")]
    InvalidNodeAssertion {
        expected: &'static str,
        actual: &'static str,
        path: String,
    },

    #[error("Path not found: {path}")]
    NotFound { path: String },

    #[error("Not a directory: {path}")]
    NotADirectory { path: String },

    #[error("Storage I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid ignore pattern {pattern:?}: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl GroveError {
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Map an I/O error, turning `NotFound` into [`GroveError::NotFound`].
    pub fn from_io(path: impl Into<String>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound { path }
        } else {
            Self::Io { path, source }
        }
    }

    pub(crate) fn write(path: impl Into<String>, source: GroveError) -> Self {
        Self::Write {
            path: path.into(),
            source: Box::new(source),
        }
    }

    pub(crate) fn directory_create(path: impl Into<String>, source: GroveError) -> Self {
        Self::DirectoryCreate {
            path: path.into(),
            source: Box::new(source),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<config::ConfigError> for GroveError {
    fn from(err: config::ConfigError) -> Self {
        GroveError::Config(err.to_string())
    }
}
