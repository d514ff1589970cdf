//! Error types for the skill-pack compiler.
//!
//! Library crates use [`SkillPackError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! Every variant is fatal to the current compile: there is no retry and no
//! partial-success reporting.

use std::path::PathBuf;

/// Top-level error type for all skill-pack operations.
#[derive(Debug, thiserror::Error)]
pub enum SkillPackError {
    /// A declared source document is missing.
    #[error("input not found: {input}")]
    InputNotFound { input: String },

    /// The external text extractor failed on a source document.
    #[error("text extraction failed for {input}: {message}")]
    Extraction { input: String, message: String },

    /// Normalized source text is empty.
    #[error("extracted text is empty after normalization")]
    EmptyExtraction,

    /// No block or chunk survived the length filters.
    #[error("no semantic content: {message}")]
    NoSemanticContent { message: String },

    /// The skill name sanitizes to an empty slug.
    #[error("invalid skill name: {name:?} has no usable characters")]
    InvalidName { name: String },

    /// The folder or zip sink could not be written or verified.
    #[error("serialization failure at {path:?}: {message}")]
    Serialization { path: PathBuf, message: String },

    /// Another compile currently holds the output name.
    #[error("output {name:?} is locked by another compile")]
    OutputLocked { name: String },

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (bad option value, malformed routes file, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SkillPackError>;

impl SkillPackError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create a no-semantic-content error.
    pub fn no_semantic_content(msg: impl Into<String>) -> Self {
        Self::NoSemanticContent {
            message: msg.into(),
        }
    }

    /// Create a serialization failure for a sink path.
    pub fn serialization(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::Serialization {
            path: path.into(),
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
