//! Tabula catalog
//!
//! Named containers and function signatures built on `tabula-types`:
//! - Columns, schemas, tables and databases with unique names
//! - A registry computing function return types from input schemas

pub mod registry;
pub mod schema;

pub use registry::{FunctionRegistry, FunctionSignature, ReturnTypeFn};
pub use schema::{Column, Database, Schema, Table};

pub use tabula_diagnostics::{Result, TabulaError};
