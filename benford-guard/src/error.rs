//! Error types for the benford-guard analysis engine.
//!
//! This module provides the error handling strategy for the crate using
//! `thiserror`. Only I/O-adjacent boundaries (external producers, file
//! sources) and configuration can fail; the extraction and classification
//! functions are total and degrade malformed input to the invalid digit
//! class instead of erroring.

use thiserror::Error;

/// The main error type for the benford-guard library.
#[derive(Error, Debug)]
pub enum BenfordError {
    /// No numeric tokens could be extracted from the source.
    ///
    /// Surfaced before a run starts; no progress or result events are
    /// emitted for an empty source.
    #[error("No numeric tokens found in {source_type} source")]
    EmptySource {
        /// Type of the source (e.g., "text-file", "in-memory")
        source_type: String,
    },

    /// An external producer (OCR, coefficient decoding, file read)
    /// failed before any tokens were handed to the engine.
    #[error("Producer '{source_type}' failed: {message}")]
    Producer {
        /// Type of the producer that failed
        source_type: String,
        /// Detailed error message
        message: String,
        /// Optional underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Error from I/O operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid gate, strategy, or session configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Error from serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// A type alias for `Result<T, BenfordError>`.
///
/// This is the standard `Result` type used throughout the library.
pub type Result<T> = std::result::Result<T, BenfordError>;

impl BenfordError {
    /// Creates an empty-source error for the given source type.
    pub fn empty_source(source_type: impl Into<String>) -> Self {
        Self::EmptySource {
            source_type: source_type.into(),
        }
    }

    /// Creates a producer failure with the given source type and message.
    pub fn producer(source_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Producer {
            source_type: source_type.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Creates a producer failure wrapping an underlying error.
    pub fn producer_with_source(
        source_type: impl Into<String>,
        message: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Producer {
            source_type: source_type.into(),
            message: message.into(),
            source: Some(source),
        }
    }

    /// Creates an invalid configuration error with the given message.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Returns true if the error is recoverable by submitting a new source.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::EmptySource { .. } | Self::Producer { .. } | Self::Io(_)
        )
    }
}
