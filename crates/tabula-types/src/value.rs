//! Tabula Value types - runtime representation of all values
//!
//! This module defines the Value enum and its supporting collection types.
//! Every value reports a natural type for display; whether a value satisfies
//! a given type is decided separately by `Value::instance_of`.

use chrono::{NaiveDate, NaiveDateTime};
use bigdecimal::BigDecimal;
use indexmap::IndexMap;
use num_traits::Zero;
use std::fmt;
use tabula_diagnostics::{Result, TabulaError};

use crate::limits::{CHAR_MAX_LENGTH, VARCHAR_MAX_LENGTH};
use crate::type_system::{CharLength, DecimalSpec, Type, VarcharLength};

/// Shared null returned by lookups of absent keys and fields
static NULL: Value = Value::Null;

/// The primary value type for runtime values.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    // === Primitive Types ===
    /// Null value (represents missing/unknown)
    Null,
    Boolean(bool),
    TinyInt(i8),
    SmallInt(i16),
    Int(i32),
    BigInt(i64),
    Float(f32),
    Double(f64),
    /// Arbitrary-precision decimal; precision and scale come from its digits
    Decimal(BigDecimal),

    // === Temporal Types ===
    Date(NaiveDate),
    Timestamp(NaiveDateTime),

    // === Text Types ===
    /// Text of a `Char` column
    Char(String),
    /// Text of a `Varchar` column
    Varchar(String),
    String(String),

    // === Collection Types ===
    /// Array of values, possibly stored width-specialized
    Array(ArrayValue),
    /// Heterogeneous fixed-arity sequence
    Tuple(Vec<Value>),
    /// Scalar-keyed map
    Map(MapValue),
    /// Record with named fields
    Struct(StructValue),
}

impl Value {
    /// Check if this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Check if this value can be a map key
    pub fn is_scalar(&self) -> bool {
        match self {
            Self::Boolean(_)
            | Self::TinyInt(_)
            | Self::SmallInt(_)
            | Self::Int(_)
            | Self::BigInt(_)
            | Self::Float(_)
            | Self::Double(_)
            | Self::Decimal(_)
            | Self::Date(_)
            | Self::Timestamp(_)
            | Self::Char(_)
            | Self::Varchar(_)
            | Self::String(_) => true,
            Self::Null | Self::Array(_) | Self::Tuple(_) | Self::Map(_) | Self::Struct(_) => false,
        }
    }

    /// Get the natural type of this value
    ///
    /// Composite values report the natural types of their contents; an empty
    /// array reports `Any[]` and an empty map reports `Any`.
    pub fn natural_type(&self) -> Type {
        match self {
            Self::Null => Type::Null,
            Self::Boolean(_) => Type::Boolean,
            Self::TinyInt(_) => Type::TinyInt,
            Self::SmallInt(_) => Type::SmallInt,
            Self::Int(_) => Type::Int,
            Self::BigInt(_) => Type::BigInt,
            Self::Float(_) => Type::Float,
            Self::Double(_) => Type::Double,
            Self::Decimal(d) => Type::Decimal(DecimalSpec::covering(
                decimal_precision(d),
                decimal_scale(d),
            )),
            Self::Date(_) => Type::Date,
            Self::Timestamp(_) => Type::Timestamp,
            Self::Char(s) => Type::Char(CharLength::covering(s.chars().count())),
            Self::Varchar(s) => Type::Varchar(VarcharLength::covering(s.chars().count())),
            Self::String(_) => Type::String,
            Self::Array(array) => Type::array(array.element_natural_type()),
            Self::Tuple(elements) => Type::tuple(elements.iter().map(Value::natural_type)),
            Self::Map(map) => match map.entries.first() {
                Some((key, value)) => {
                    Type::map(key.natural_type(), value.natural_type()).unwrap_or(Type::Any)
                }
                None => Type::Any,
            },
            Self::Struct(record) => Type::structure(
                record
                    .iter()
                    .map(|(name, value)| (name.clone(), value.natural_type())),
            )
            .unwrap_or(Type::Any),
        }
    }

    /// Try to get as Boolean
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get as text (Char, Varchar or String)
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Char(s) | Self::Varchar(s) | Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as Array
    pub fn as_array(&self) -> Option<&ArrayValue> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Try to get as Struct
    pub fn as_struct(&self) -> Option<&StructValue> {
        match self {
            Self::Struct(s) => Some(s),
            _ => None,
        }
    }

    /// Create a decimal value
    pub fn decimal(value: BigDecimal) -> Self {
        Self::Decimal(value)
    }

    /// Create a `Char` value; the text must fit the largest `Char` type
    pub fn char(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        let length = value.chars().count();
        if length > CHAR_MAX_LENGTH as usize {
            return Err(TabulaError::text_too_long("char", length, CHAR_MAX_LENGTH));
        }
        Ok(Self::Char(value))
    }

    /// Create a `Varchar` value; the text must fit the largest `Varchar` type
    pub fn varchar(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        let length = value.chars().count();
        if length > VARCHAR_MAX_LENGTH as usize {
            return Err(TabulaError::text_too_long("varchar", length, VARCHAR_MAX_LENGTH));
        }
        Ok(Self::Varchar(value))
    }

    /// Create a string value
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    /// Create an array of arbitrary values
    pub fn array(values: impl IntoIterator<Item = Value>) -> Self {
        Self::Array(ArrayValue::Values(values.into_iter().collect()))
    }

    /// Create a tuple value
    pub fn tuple(values: impl IntoIterator<Item = Value>) -> Self {
        Self::Tuple(values.into_iter().collect())
    }

    /// Create a struct value from (name, value) pairs
    pub fn structure<N: Into<String>>(fields: impl IntoIterator<Item = (N, Value)>) -> Self {
        Self::Struct(StructValue::from_fields(fields))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::TinyInt(i) => write!(f, "{}", i),
            Self::SmallInt(i) => write!(f, "{}", i),
            Self::Int(i) => write!(f, "{}", i),
            Self::BigInt(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::Double(x) => write!(f, "{}", x),
            Self::Decimal(d) => write!(f, "{}", d),
            Self::Date(d) => write!(f, "{}", d),
            Self::Timestamp(ts) => write!(f, "{}", ts),
            Self::Char(s) | Self::Varchar(s) | Self::String(s) => write!(f, "'{}'", s),
            Self::Array(a) => write!(f, "{}", a),
            Self::Tuple(elements) => {
                write!(f, "(")?;
                for (i, elem) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", elem)?;
                }
                write!(f, ")")
            }
            Self::Map(m) => write!(f, "{}", m),
            Self::Struct(s) => write!(f, "{}", s),
        }
    }
}

/// Number of significant digits of the unscaled value (zero counts as one)
///
/// A negative exponent, as in `12E+3`, adds its implied trailing zeros.
pub fn decimal_precision(value: &BigDecimal) -> u32 {
    let (unscaled, exponent) = value.as_bigint_and_exponent();
    if unscaled.is_zero() {
        return 1;
    }
    let digits = unscaled.magnitude().to_string().len() as u64;
    let implied = if exponent < 0 { exponent.unsigned_abs() } else { 0 };
    u32::try_from(digits + implied).unwrap_or(u32::MAX)
}

/// Number of digits after the decimal point, trailing zeros included
pub fn decimal_scale(value: &BigDecimal) -> u32 {
    let (_, exponent) = value.as_bigint_and_exponent();
    u32::try_from(exponent.max(0)).unwrap_or(u32::MAX)
}

// ============================================================================
// Collection Types
// ============================================================================

/// Array contents
///
/// Numeric arrays may be stored width-specialized; they behave exactly like
/// an array of the corresponding numeric values.
#[derive(Debug, Clone)]
pub enum ArrayValue {
    Values(Vec<Value>),
    TinyInt(Vec<i8>),
    SmallInt(Vec<i16>),
    Int(Vec<i32>),
    BigInt(Vec<i64>),
    Float(Vec<f32>),
    Double(Vec<f64>),
}

impl ArrayValue {
    /// Get the number of elements
    pub fn len(&self) -> usize {
        match self {
            Self::Values(v) => v.len(),
            Self::TinyInt(v) => v.len(),
            Self::SmallInt(v) => v.len(),
            Self::Int(v) => v.len(),
            Self::BigInt(v) => v.len(),
            Self::Float(v) => v.len(),
            Self::Double(v) => v.len(),
        }
    }

    /// Check if the array is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get an element by index (0-based)
    pub fn get(&self, index: usize) -> Option<Value> {
        match self {
            Self::Values(v) => v.get(index).cloned(),
            Self::TinyInt(v) => v.get(index).copied().map(Value::TinyInt),
            Self::SmallInt(v) => v.get(index).copied().map(Value::SmallInt),
            Self::Int(v) => v.get(index).copied().map(Value::Int),
            Self::BigInt(v) => v.get(index).copied().map(Value::BigInt),
            Self::Float(v) => v.get(index).copied().map(Value::Float),
            Self::Double(v) => v.get(index).copied().map(Value::Double),
        }
    }

    /// Iterate over elements as values
    pub fn iter(&self) -> impl Iterator<Item = Value> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }

    /// Element type of a width-specialized array
    pub fn specialized_type(&self) -> Option<Type> {
        match self {
            Self::Values(_) => None,
            Self::TinyInt(_) => Some(Type::TinyInt),
            Self::SmallInt(_) => Some(Type::SmallInt),
            Self::Int(_) => Some(Type::Int),
            Self::BigInt(_) => Some(Type::BigInt),
            Self::Float(_) => Some(Type::Float),
            Self::Double(_) => Some(Type::Double),
        }
    }

    fn element_natural_type(&self) -> Type {
        match self {
            Self::Values(values) => values.first().map_or(Type::Any, Value::natural_type),
            specialized => specialized.specialized_type().unwrap_or(Type::Any),
        }
    }
}

impl PartialEq for ArrayValue {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl fmt::Display for ArrayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, elem) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", elem)?;
        }
        write!(f, "]")
    }
}

/// Map with scalar keys, in insertion order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MapValue {
    entries: Vec<(Value, Value)>,
}

impl MapValue {
    /// Create a map; keys must be scalar values and a repeated key keeps the
    /// last value
    pub fn new(entries: impl IntoIterator<Item = (Value, Value)>) -> Result<Self> {
        let mut map = Self::default();
        for (key, value) in entries {
            if !key.is_scalar() {
                return Err(TabulaError::map_key(&key));
            }
            match map.entries.iter_mut().find(|(existing, _)| *existing == key) {
                Some(slot) => slot.1 = value,
                None => map.entries.push((key, value)),
            }
        }
        Ok(map)
    }

    /// Get the value for a key, or `Null` when absent
    pub fn get(&self, key: &Value) -> &Value {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map_or(&NULL, |(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries
    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }
}

impl fmt::Display for MapValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} => {}", key, value)?;
        }
        write!(f, "}}")
    }
}

/// Record with named fields (insertion order preserved)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StructValue {
    fields: IndexMap<String, Value>,
}

impl StructValue {
    /// Create a struct from an iterator of (name, value) pairs
    pub fn from_fields<N: Into<String>>(fields: impl IntoIterator<Item = (N, Value)>) -> Self {
        Self {
            fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Get a field by name, or `Null` when absent
    pub fn get(&self, name: &str) -> &Value {
        self.fields.get(name).unwrap_or(&NULL)
    }

    /// Check whether the field is present
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over fields
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }
}

impl fmt::Display for StructValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", name, value)?;
        }
        write!(f, "}}")
    }
}
