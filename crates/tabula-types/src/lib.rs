//! Tabula type and value algebra
//!
//! This crate defines the type system of a SQL-flavored data model including:
//! - Type descriptors (scalar, parameterized, composite, recursive, union)
//! - Construction-time validation of self-referential structs and unions
//! - The subtype relation
//! - Runtime values and the value-to-type membership check
//! - Numeric conversions between the numeric value kinds

pub mod limits;
mod membership;
pub mod numeric;
mod recursion;
mod subtype;
pub mod type_system;
pub mod value;

pub use numeric::{Numeric, NumericKind};
pub use type_system::*;
pub use value::*;

pub use tabula_diagnostics::{Result, TabulaError};
