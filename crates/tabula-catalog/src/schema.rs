//! Named containers built on the type algebra
//!
//! Columns group into schemas, schemas back tables, and tables group into
//! databases. Each container rejects duplicate names at construction.

use indexmap::IndexMap;
use std::fmt;
use tabula_diagnostics::{Result, TabulaError};
use tabula_types::Type;

/// A named, typed column
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Column {
    name: String,
    ty: Type,
}

impl Column {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.ty)
    }
}

/// Ordered columns with unique names
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    columns: IndexMap<String, Column>,
}

impl Schema {
    /// Create a schema; column order is preserved
    pub fn new(columns: impl IntoIterator<Item = Column>) -> Result<Self> {
        let mut collected = IndexMap::new();
        for column in columns {
            if collected.contains_key(column.name()) {
                log::debug!("rejected schema: duplicate column {}", column.name());
                return Err(TabulaError::duplicate_name(column.name, "schema"));
            }
            collected.insert(column.name.clone(), column);
        }
        Ok(Self { columns: collected })
    }

    /// Look up a column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    /// Iterate over columns in declaration order
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.values()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Anonymous struct with one field per column, in column order
    pub fn to_struct_type(&self) -> Result<Type> {
        Type::structure(self.fields())
    }

    fn fields(&self) -> impl Iterator<Item = (String, Type)> + '_ {
        self.columns
            .values()
            .map(|column| (column.name.clone(), column.ty.clone()))
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, column) in self.columns.values().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", column)?;
        }
        write!(f, ")")
    }
}

/// A named schema
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    schema: Schema,
}

impl Table {
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Row type: a struct named after the table with one field per column
    pub fn row_type(&self) -> Result<Type> {
        Type::named_struct(&self.name, self.schema.fields())
    }
}

/// A named group of tables with unique names
#[derive(Debug, Clone, PartialEq)]
pub struct Database {
    name: String,
    tables: IndexMap<String, Table>,
}

impl Database {
    pub fn new(name: impl Into<String>, tables: impl IntoIterator<Item = Table>) -> Result<Self> {
        let name = name.into();
        let mut collected = IndexMap::new();
        for table in tables {
            if collected.contains_key(table.name()) {
                log::debug!("rejected database {name}: duplicate table {}", table.name());
                return Err(TabulaError::duplicate_name(
                    table.name,
                    format!("database {name}"),
                ));
            }
            collected.insert(table.name.clone(), table);
        }
        Ok(Self {
            name,
            tables: collected,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a table by name
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// Iterate over tables in declaration order
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }
}
