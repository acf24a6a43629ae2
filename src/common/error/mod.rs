//! Unified error types for blipswap.
//!
//! This module provides a unified error type that encompasses failures from
//! both package formats, presenting a consistent API to users.

// Submodule declarations
pub mod types;
pub mod conversions;

// Re-exports
pub use types::{Error, Result};
