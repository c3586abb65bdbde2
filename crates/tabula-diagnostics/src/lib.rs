//! Tabula diagnostics and error handling
//!
//! This crate provides the error handling infrastructure shared by the type
//! algebra and the catalog layer: structured error codes, the error enum and
//! diagnostic reporting.

mod error;
mod error_code;

pub use error::*;
pub use error_code::*;

/// Result type for tabula operations
pub type Result<T> = std::result::Result<T, TabulaError>;
