//! Tabula error codes following a structured numbering system
//!
//! Error code ranges:
//! - TAB0001-TAB0099: Parameter errors (decimal precision, char lengths, map keys)
//! - TAB0100-TAB0199: Type structure errors (unions, recursion)
//! - TAB0200-TAB0299: Catalog errors (duplicate or unknown names)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Error code identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorCode(u16);

impl ErrorCode {
    /// Create a new error code
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Get the numeric code
    pub const fn code(&self) -> u16 {
        self.0
    }

    /// Get error information for this code
    pub fn info(&self) -> &'static ErrorInfo {
        ERROR_INFO.get(&self.0).unwrap_or(&UNKNOWN_ERROR)
    }

    /// Check if this is a parameter error (0001-0099)
    pub const fn is_parameter_error(&self) -> bool {
        self.0 >= 1 && self.0 < 100
    }

    /// Check if this is a type structure error (0100-0199)
    pub const fn is_structure_error(&self) -> bool {
        self.0 >= 100 && self.0 < 200
    }

    /// Check if this is a catalog error (0200-0299)
    pub const fn is_catalog_error(&self) -> bool {
        self.0 >= 200 && self.0 < 300
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TAB{:04}", self.0)
    }
}

/// Information about an error code
#[derive(Debug, Clone)]
pub struct ErrorInfo {
    /// Short description of the error
    pub description: &'static str,
    /// Detailed help text
    pub help: Option<&'static str>,
}

impl ErrorInfo {
    const fn new(description: &'static str) -> Self {
        Self {
            description,
            help: None,
        }
    }

    const fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }
}

static UNKNOWN_ERROR: ErrorInfo = ErrorInfo::new("Unknown error");

static ERROR_INFO: LazyLock<HashMap<u16, ErrorInfo>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    // Parameter errors (0001-0099)
    map.insert(
        1,
        ErrorInfo::new("Decimal precision out of range")
            .with_help("Decimal precision must be within 1..=38"),
    );
    map.insert(
        2,
        ErrorInfo::new("Decimal scale out of range")
            .with_help("Decimal scale must not exceed its precision"),
    );
    map.insert(
        3,
        ErrorInfo::new("Char length out of range").with_help("Char length must be within 1..=255"),
    );
    map.insert(
        4,
        ErrorInfo::new("Varchar length out of range")
            .with_help("Varchar length must be within 1..=65535"),
    );
    map.insert(5, ErrorInfo::new("Map key must be a scalar type"));
    map.insert(6, ErrorInfo::new("Text value exceeds maximum length"));
    map.insert(7, ErrorInfo::new("Invalid function argument"));

    // Type structure errors (0100-0199)
    map.insert(
        100,
        ErrorInfo::new("Union needs at least two distinct variants"),
    );
    map.insert(
        101,
        ErrorInfo::new("Anonymous type is self-referential")
            .with_help("Give the type a name to allow recursive references"),
    );
    map.insert(
        102,
        ErrorInfo::new("Unconditionally cyclic member")
            .with_help("Break the cycle with an array or map, or add a non-recursive union variant"),
    );

    // Catalog errors (0200-0299)
    map.insert(200, ErrorInfo::new("Duplicate name"));
    map.insert(201, ErrorInfo::new("Unknown name"));

    map
});

// Parameter errors
pub const TAB0001: ErrorCode = ErrorCode::new(1);
pub const TAB0002: ErrorCode = ErrorCode::new(2);
pub const TAB0003: ErrorCode = ErrorCode::new(3);
pub const TAB0004: ErrorCode = ErrorCode::new(4);
pub const TAB0005: ErrorCode = ErrorCode::new(5);
pub const TAB0006: ErrorCode = ErrorCode::new(6);
pub const TAB0007: ErrorCode = ErrorCode::new(7);

// Type structure errors
pub const TAB0100: ErrorCode = ErrorCode::new(100);
pub const TAB0101: ErrorCode = ErrorCode::new(101);
pub const TAB0102: ErrorCode = ErrorCode::new(102);

// Catalog errors
pub const TAB0200: ErrorCode = ErrorCode::new(200);
pub const TAB0201: ErrorCode = ErrorCode::new(201);
