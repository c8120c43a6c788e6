//! Error types for Pagewise

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for Pagewise operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed cause attached to remote service failures
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur in Pagewise operations
#[derive(Error, Debug)]
pub enum Error {
    /// The document path does not resolve to a readable file
    #[error("document not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The file exists but could not be parsed as a PDF
    #[error("corrupt document {}: {reason}", path.display())]
    CorruptDocument { path: PathBuf, reason: String },

    /// Chunking or service parameters are unusable
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A caller broke an operation precondition (length mismatch, duplicate id, ...)
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The embedding service call failed
    #[error("embedding service error: {message}")]
    EmbeddingService {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// The generation service call failed
    #[error("generation service error: {message}")]
    GenerationService {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Reading from or writing to the session streams failed
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn embedding(message: impl Into<String>) -> Self {
        Self::EmbeddingService {
            message: message.into(),
            source: None,
        }
    }

    pub(crate) fn embedding_with(
        message: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::EmbeddingService {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub(crate) fn generation(message: impl Into<String>) -> Self {
        Self::GenerationService {
            message: message.into(),
            source: None,
        }
    }

    pub(crate) fn generation_with(
        message: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::GenerationService {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Whether an interactive session can report this error and keep going.
    ///
    /// Configuration and stream failures are fatal; everything else is scoped
    /// to the command that raised it.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::InvalidConfig(_) | Self::Io(_))
    }
}
