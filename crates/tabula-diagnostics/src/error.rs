//! Tabula error types

use crate::{
    ErrorCode, TAB0001, TAB0002, TAB0003, TAB0004, TAB0005, TAB0006, TAB0007, TAB0100, TAB0101,
    TAB0102, TAB0200, TAB0201,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Error - the requested type or value cannot be built
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A diagnostic message with help text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity level
    pub severity: Severity,
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional context or help
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

impl Diagnostic {
    /// Create a new error diagnostic
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            help: None,
        }
    }

    /// Set help text
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} - {}", self.severity, self.code, self.message)?;
        if let Some(help) = &self.help {
            write!(f, " ({})", help)?;
        }
        Ok(())
    }
}

/// Main tabula error type
///
/// Every failure in the type algebra is a synchronous construction-time
/// validation failure, so each variant names the rule that was violated.
#[derive(Debug, Clone, Error)]
pub enum TabulaError {
    /// A type or value parameter is outside its allowed range
    #[error("{code}: {message}")]
    InvalidParameter { code: ErrorCode, message: String },

    /// A union was built with fewer than two distinct variants
    #[error("{code}: {message}")]
    InvalidUnion { code: ErrorCode, message: String },

    /// A struct or union references itself in a way that cannot be allowed
    #[error("{code}: {message}")]
    InvalidRecursion {
        code: ErrorCode,
        message: String,
        type_name: Option<String>,
    },

    /// Two entries of the same container share a name
    #[error("{code}: duplicate name '{name}' in {container}")]
    DuplicateName {
        code: ErrorCode,
        name: String,
        container: String,
    },

    /// A lookup that must succeed referenced a missing entry
    #[error("{code}: unknown {kind} '{name}'")]
    UnknownName {
        code: ErrorCode,
        kind: String,
        name: String,
    },

    /// Multiple errors collected
    #[error("Multiple errors: {}", .0.len())]
    Multiple(Vec<TabulaError>),
}

impl TabulaError {
    /// Decimal precision outside its bounds
    pub fn decimal_precision(precision: u32, max: u32) -> Self {
        Self::InvalidParameter {
            code: TAB0001,
            message: format!("decimal precision {precision} outside 1..={max}"),
        }
    }

    /// Decimal scale larger than its precision
    pub fn decimal_scale(precision: u32, scale: u32) -> Self {
        Self::InvalidParameter {
            code: TAB0002,
            message: format!("decimal scale {scale} exceeds precision {precision}"),
        }
    }

    /// Char length outside its bounds
    pub fn char_length(length: u32, max: u32) -> Self {
        Self::InvalidParameter {
            code: TAB0003,
            message: format!("char length {length} outside 1..={max}"),
        }
    }

    /// Varchar length outside its bounds
    pub fn varchar_length(length: u32, max: u32) -> Self {
        Self::InvalidParameter {
            code: TAB0004,
            message: format!("varchar length {length} outside 1..={max}"),
        }
    }

    /// Map key that is not a scalar
    pub fn map_key(key: impl fmt::Display) -> Self {
        Self::InvalidParameter {
            code: TAB0005,
            message: format!("map key {key} is not a scalar"),
        }
    }

    /// Text value longer than its type family allows
    pub fn text_too_long(kind: &str, length: usize, max: u32) -> Self {
        Self::InvalidParameter {
            code: TAB0006,
            message: format!("{kind} value of length {length} exceeds maximum {max}"),
        }
    }

    /// Function argument that does not fit the function
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            code: TAB0007,
            message: message.into(),
        }
    }

    /// Union with too few distinct variants
    pub fn union_arity(distinct: usize) -> Self {
        Self::InvalidUnion {
            code: TAB0100,
            message: format!("union needs at least 2 distinct variants, got {distinct}"),
        }
    }

    /// Anonymous struct or union that reaches itself
    pub fn anonymous_recursion(signature: impl Into<String>) -> Self {
        Self::InvalidRecursion {
            code: TAB0101,
            message: format!("anonymous type {} is self-referential", signature.into()),
            type_name: None,
        }
    }

    /// Member that can never be satisfied by a finite value
    pub fn unconditional_cycle(type_name: Option<&str>, member: impl fmt::Display) -> Self {
        let owner = type_name.unwrap_or("<anonymous>");
        Self::InvalidRecursion {
            code: TAB0102,
            message: format!("member {member} of {owner} is unconditionally cyclic"),
            type_name: type_name.map(str::to_string),
        }
    }

    /// Duplicate entry name in a container
    pub fn duplicate_name(name: impl Into<String>, container: impl Into<String>) -> Self {
        Self::DuplicateName {
            code: TAB0200,
            name: name.into(),
            container: container.into(),
        }
    }

    /// Lookup of an entry that does not exist
    pub fn unknown_name(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::UnknownName {
            code: TAB0201,
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidParameter { code, .. } => *code,
            Self::InvalidUnion { code, .. } => *code,
            Self::InvalidRecursion { code, .. } => *code,
            Self::DuplicateName { code, .. } => *code,
            Self::UnknownName { code, .. } => *code,
            Self::Multiple(errors) => errors
                .first()
                .map(|e| e.code())
                .unwrap_or(ErrorCode::new(0)),
        }
    }

    /// Convert to a diagnostic
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            Self::Multiple(errors) => match errors.first() {
                Some(first) => first.to_diagnostic(),
                None => Diagnostic::error(ErrorCode::new(0), "Unknown error"),
            },
            other => {
                let code = other.code();
                let diag = Diagnostic::error(code, other.to_string());
                match code.info().help {
                    Some(help) => diag.with_help(help),
                    None => diag,
                }
            }
        }
    }
}
