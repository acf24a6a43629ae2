//! Unified error types for blipswap.
//!
//! This module provides a single error type shared by the box-model (docx)
//! and flow-format (odt) code paths, presenting a consistent API to users.
use thiserror::Error;

/// Main error type for image post-processing operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A part could not be parsed as XML
    #[error("Failed to parse part '{part}': {reason}")]
    ParseFailure { part: String, reason: String },

    /// A blip references a relationship id missing from the owning table
    #[error("Relationship '{id}' not found for part '{part}'")]
    RelationNotFound { part: String, id: String },

    /// A relationship target has no matching media part in the package
    #[error("Media '{target}' referenced from part '{part}' not found in package")]
    MediaNotFound { part: String, target: String },

    /// A required part is missing
    #[error("Part not found: {0}")]
    PartNotFound(String),

    /// A dynamic drawing lacks an element needed to substitute it
    #[error("Malformed drawing in part '{part}': {reason}")]
    MalformedDrawing { part: String, reason: String },

    /// Invalid file format
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// ZIP archive error
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// Invalid processing options
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Build a [`Error::ParseFailure`] for the given part.
    pub(crate) fn parse(part: &str, reason: impl ToString) -> Self {
        Error::ParseFailure {
            part: part.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Name of the part this error is scoped to, if any.
    pub fn part(&self) -> Option<&str> {
        match self {
            Error::ParseFailure { part, .. }
            | Error::RelationNotFound { part, .. }
            | Error::MediaNotFound { part, .. }
            | Error::MalformedDrawing { part, .. } => Some(part),
            Error::PartNotFound(name) => Some(name),
            _ => None,
        }
    }
}

/// Result type for blipswap operations.
pub type Result<T> = std::result::Result<T, Error>;
