//! Fixed bounds of the parameterized types

/// Largest precision a `Decimal(p, s)` type may declare
pub const DECIMAL_MAX_PRECISION: u32 = 38;

/// Largest length a `Char(n)` type may declare
pub const CHAR_MAX_LENGTH: u32 = 255;

/// Largest length a `Varchar(n)` type may declare
pub const VARCHAR_MAX_LENGTH: u32 = 65_535;

/// Smallest number of distinct variants a union may hold
pub const MIN_UNION_VARIANTS: usize = 2;
