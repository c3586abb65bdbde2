//! Function signature registry
//!
//! Maps function names to signatures whose return type is computed from the
//! schema of the function's input.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tabula_diagnostics::{Result, TabulaError};
use tabula_types::{Type, nullable};

use crate::schema::{Column, Schema};

/// Type alias for return type computations
pub type ReturnTypeFn = Arc<dyn Fn(&Schema) -> Result<Type> + Send + Sync>;

/// A function name with its return type computation
#[derive(Clone)]
pub struct FunctionSignature {
    name: String,
    return_type: ReturnTypeFn,
}

impl FunctionSignature {
    /// Create a new function signature
    pub fn new(
        name: impl Into<String>,
        return_type: impl Fn(&Schema) -> Result<Type> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            return_type: Arc::new(return_type),
        }
    }

    /// Create a signature with a fixed return type
    pub fn constant(name: impl Into<String>, return_type: Type) -> Self {
        Self::new(name, move |_| Ok(return_type.clone()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Compute the return type for the given input schema
    pub fn return_type(&self, input: &Schema) -> Result<Type> {
        (self.return_type)(input)
    }
}

impl fmt::Debug for FunctionSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionSignature")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Registry of function signatures
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, FunctionSignature>,
}

impl FunctionRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in aggregates
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register_builtins();
        registry
    }

    /// Register the built-in aggregates
    ///
    /// - `count` returns `BigInt` for any input
    /// - `min`, `max` and `first` return the column type or `Null`
    /// - `sum` returns the numeric column type or `Null`
    /// - `avg` returns `Double` or `Null` for a numeric column
    pub fn register_builtins(&mut self) {
        let builtins = [
            FunctionSignature::constant("count", Type::BigInt),
            FunctionSignature::new("sum", |input| {
                numeric_column("sum", input).map(|c| nullable(c.ty().clone()))
            }),
            FunctionSignature::new("avg", |input| {
                numeric_column("avg", input).map(|_| nullable(Type::Double))
            }),
            FunctionSignature::new("min", |input| {
                single_column("min", input).map(|c| nullable(c.ty().clone()))
            }),
            FunctionSignature::new("max", |input| {
                single_column("max", input).map(|c| nullable(c.ty().clone()))
            }),
            FunctionSignature::new("first", |input| {
                single_column("first", input).map(|c| nullable(c.ty().clone()))
            }),
        ];
        for signature in builtins {
            self.functions.insert(signature.name.clone(), signature);
        }
    }

    /// Register a function; names must be unique
    pub fn register(&mut self, signature: FunctionSignature) -> Result<()> {
        if self.functions.contains_key(signature.name()) {
            log::debug!("rejected duplicate function {}", signature.name());
            return Err(TabulaError::duplicate_name(signature.name, "function registry"));
        }
        self.functions.insert(signature.name.clone(), signature);
        Ok(())
    }

    /// Get a function signature by name
    pub fn get(&self, name: &str) -> Option<&FunctionSignature> {
        self.functions.get(name)
    }

    /// Check if a function is registered
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Compute the return type of `name` applied to `input`
    pub fn return_type(&self, name: &str, input: &Schema) -> Result<Type> {
        self.get(name)
            .ok_or_else(|| TabulaError::unknown_name("function", name))?
            .return_type(input)
    }

    /// Registered function names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

fn single_column<'a>(function: &str, input: &'a Schema) -> Result<&'a Column> {
    let mut columns = input.columns();
    match (columns.next(), columns.next()) {
        (Some(column), None) => Ok(column),
        _ => Err(TabulaError::invalid_argument(format!(
            "{function} expects exactly one column, got {}",
            input.len()
        ))),
    }
}

fn numeric_column<'a>(function: &str, input: &'a Schema) -> Result<&'a Column> {
    let column = single_column(function, input)?;
    if !column.ty().is_numeric() {
        return Err(TabulaError::invalid_argument(format!(
            "{function} expects a numeric column, got {column}"
        )));
    }
    Ok(column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builtins_registered() {
        let registry = FunctionRegistry::with_builtins();
        assert_eq!(registry.names(), vec!["avg", "count", "first", "max", "min", "sum"]);
    }

    #[test]
    fn test_custom_registration() {
        let mut registry = FunctionRegistry::new();
        registry
            .register(FunctionSignature::constant("now", Type::Timestamp))
            .unwrap();
        let input = Schema::default();
        assert_eq!(registry.return_type("now", &input).unwrap(), Type::Timestamp);

        let err = registry
            .register(FunctionSignature::constant("now", Type::Date))
            .unwrap_err();
        assert!(matches!(err, TabulaError::DuplicateName { .. }));
    }

    #[test]
    fn test_debug_omits_closure() {
        let signature = FunctionSignature::constant("count", Type::BigInt);
        assert_eq!(format!("{signature:?}"), "FunctionSignature { name: \"count\", .. }");
    }
}
