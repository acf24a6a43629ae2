//! Common types and utilities shared across formats.
//!
//! This module provides the unified error type and the XML tree used by
//! both the box-model (docx) and flow-format (odt) code paths.

// Submodule declarations
pub mod error;
pub mod xml;

// Re-exports for convenience
pub use error::{Error, Result};
