//! Tabula Type System
//!
//! This module defines the closed set of type descriptors:
//! - Leaf scalars (Boolean, the integer family, Float, Double, Date, Timestamp, String)
//! - Parameterized scalars (Decimal, Char, Varchar) with validated parameters
//! - Composites (Array, Tuple, Map, Struct, Union) and the top type `Any`
//! - Canonical signatures used for display and nominal identity

use indexmap::{IndexMap, IndexSet};
use std::borrow::Cow;
use std::fmt;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::mem;
use std::sync::{Arc, Weak};
use tabula_diagnostics::{Result, TabulaError};

use crate::limits::{CHAR_MAX_LENGTH, DECIMAL_MAX_PRECISION, MIN_UNION_VARIANTS, VARCHAR_MAX_LENGTH};

/// The complete tabula type representation
///
/// Instances are immutable once built. Parameterized and composite variants
/// can only be obtained through the validating constructors on `Type`.
#[derive(Debug, Clone)]
pub enum Type {
    // === Special Types ===
    /// The Any type - supertype of all types
    Any,
    /// The type of the null value
    Null,

    // === Leaf Scalars ===
    Boolean,
    /// 8-bit signed integer
    TinyInt,
    /// 16-bit signed integer
    SmallInt,
    /// 32-bit signed integer
    Int,
    /// 64-bit signed integer
    BigInt,
    /// 32-bit binary floating point
    Float,
    /// 64-bit binary floating point
    Double,
    Date,
    Timestamp,
    /// Unbounded text
    String,

    // === Parameterized Scalars ===
    /// Fixed-point decimal with precision and scale
    Decimal(DecimalSpec),
    /// Fixed-length text
    Char(CharLength),
    /// Variable-length text with an upper bound
    Varchar(VarcharLength),

    // === Composite Types ===
    /// Homogeneous sequence
    Array(Box<Type>),
    /// Heterogeneous fixed-arity sequence
    Tuple(Vec<Type>),
    /// Scalar-keyed association
    Map(MapType),
    /// Record with named fields
    Struct(Arc<StructType>),
    /// Choice between at least two distinct types
    Union(Arc<UnionType>),

    /// Self-reference to a named struct or union, only produced while that
    /// type is being defined
    Ref(TypeRef),
}

impl Type {
    // === Constructors ===

    /// Create a `Decimal(precision, scale)` type
    pub fn decimal(precision: u32, scale: u32) -> Result<Self> {
        DecimalSpec::new(precision, scale).map(Self::Decimal)
    }

    /// Create a `Char(length)` type
    pub fn char(length: u32) -> Result<Self> {
        CharLength::new(length).map(Self::Char)
    }

    /// Create a `Varchar(length)` type
    pub fn varchar(length: u32) -> Result<Self> {
        VarcharLength::new(length).map(Self::Varchar)
    }

    /// Create an array type
    pub fn array(element_type: Type) -> Self {
        Self::Array(Box::new(element_type))
    }

    /// Create a tuple type
    pub fn tuple(element_types: impl IntoIterator<Item = Type>) -> Self {
        Self::Tuple(element_types.into_iter().collect())
    }

    /// Create a map type; the key must be a scalar type
    pub fn map(key: Type, value: Type) -> Result<Self> {
        if !key.is_scalar() {
            let err = TabulaError::map_key(&key);
            log::debug!("rejected map type: {err}");
            return Err(err);
        }
        Ok(Self::Map(MapType {
            key: Box::new(key),
            value: Box::new(value),
        }))
    }

    // === Type Properties ===

    /// Check if this is the Any type
    pub fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }

    /// Check if this is a scalar (a valid map key)
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Self::Boolean
                | Self::TinyInt
                | Self::SmallInt
                | Self::Int
                | Self::BigInt
                | Self::Float
                | Self::Double
                | Self::Date
                | Self::Timestamp
                | Self::String
                | Self::Decimal(_)
                | Self::Char(_)
                | Self::Varchar(_)
        )
    }

    /// Check if this is a numeric type
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::TinyInt
                | Self::SmallInt
                | Self::Int
                | Self::BigInt
                | Self::Float
                | Self::Double
                | Self::Decimal(_)
        )
    }

    /// Check if `Null` is accepted: `Null`, `Any`, or a union with a `Null` variant
    pub fn is_nullable(&self) -> bool {
        match self.resolve().as_ref() {
            Self::Null | Self::Any => true,
            Self::Union(u) => u.variants.contains(&Self::Null),
            _ => false,
        }
    }

    /// Check if this type refers to itself and therefore uses nominal identity
    pub fn is_cyclic(&self) -> bool {
        match self {
            Self::Struct(s) => s.cyclic,
            Self::Union(u) => u.cyclic,
            Self::Ref(_) => true,
            _ => false,
        }
    }

    /// Declared name of a struct, union or self-reference
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Struct(s) => s.name.as_deref(),
            Self::Union(u) => u.name.as_deref(),
            Self::Ref(r) => Some(&r.name),
            _ => None,
        }
    }

    /// Canonical textual signature
    pub fn signature(&self) -> String {
        self.to_string()
    }

    /// Get the element type for Array types
    pub fn element_type(&self) -> Option<&Type> {
        match self {
            Self::Array(elem) => Some(elem),
            _ => None,
        }
    }

    /// Get the positional types for Tuple types
    pub fn tuple_elements(&self) -> Option<&[Type]> {
        match self {
            Self::Tuple(elements) => Some(elements),
            _ => None,
        }
    }

    /// Get the key and value types for Map types
    pub fn map_type(&self) -> Option<&MapType> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Get the fields of a Struct type
    pub fn fields(&self) -> Option<&IndexMap<String, Type>> {
        match self {
            Self::Struct(s) => Some(&s.fields),
            _ => None,
        }
    }

    /// Get the variants of a Union type
    pub fn variants(&self) -> Option<&IndexSet<Type>> {
        match self {
            Self::Union(u) => Some(&u.variants),
            _ => None,
        }
    }

    /// Follow a self-reference to the named type it points to
    ///
    /// Every other variant, and a reference whose target is gone, is returned
    /// unchanged.
    pub fn resolve(&self) -> Cow<'_, Type> {
        match self {
            Self::Ref(r) => match r.target() {
                Some(target) => Cow::Owned(target),
                None => Cow::Borrowed(self),
            },
            _ => Cow::Borrowed(self),
        }
    }

    /// Nominal identity of cyclic named types and self-references
    fn nominal(&self) -> Option<(NominalKind, &str)> {
        match self {
            Self::Struct(s) if s.cyclic => s.name.as_deref().map(|n| (NominalKind::Struct, n)),
            Self::Union(u) if u.cyclic => u.name.as_deref().map(|n| (NominalKind::Union, n)),
            Self::Ref(r) => Some((r.kind(), r.name.as_str())),
            _ => None,
        }
    }

    /// Anonymous union from variants already known to be distinct and free of
    /// self-references
    pub(crate) fn anonymous_union(variants: IndexSet<Type>) -> Self {
        Self::Union(Arc::new(UnionType {
            name: None,
            variants,
            cyclic: false,
        }))
    }
}

/// Union of two types, flattening anonymous union operands
pub fn union_of(a: Type, b: Type) -> Result<Type> {
    let mut variants = IndexSet::new();
    for operand in [a, b] {
        match operand {
            Type::Union(u) if u.name.is_none() => variants.extend(u.variants.iter().cloned()),
            other => {
                variants.insert(other);
            }
        }
    }
    if variants.len() < MIN_UNION_VARIANTS {
        let err = TabulaError::union_arity(variants.len());
        log::debug!("rejected union: {err}");
        return Err(err);
    }
    Ok(Type::anonymous_union(variants))
}

/// `ty | Null`, or `ty` itself when it already accepts `Null`
pub fn nullable(ty: Type) -> Type {
    if ty.is_nullable() {
        return ty;
    }
    let mut variants = IndexSet::new();
    match ty {
        Type::Union(u) if u.name.is_none() => variants.extend(u.variants.iter().cloned()),
        other => {
            variants.insert(other);
        }
    }
    variants.insert(Type::Null);
    Type::anonymous_union(variants)
}

/// Map from `key` to `value`
pub fn map_of(key: Type, value: Type) -> Result<Type> {
    Type::map(key, value)
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        match (self.nominal(), other.nominal()) {
            (Some(a), Some(b)) => return a == b,
            (Some(_), None) | (None, Some(_)) => return false,
            (None, None) => {}
        }

        match (self, other) {
            (Self::Decimal(a), Self::Decimal(b)) => a == b,
            (Self::Char(a), Self::Char(b)) => a == b,
            (Self::Varchar(a), Self::Varchar(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => a == b,
            (Self::Tuple(a), Self::Tuple(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::Struct(a), Self::Struct(b)) => Arc::ptr_eq(a, b) || a.fields == b.fields,
            (Self::Union(a), Self::Union(b)) => Arc::ptr_eq(a, b) || a.variants == b.variants,
            // payload-free variants are equal exactly when their tags are
            _ => mem::discriminant(self) == mem::discriminant(other),
        }
    }
}

impl Eq for Type {}

impl Hash for Type {
    fn hash<H: Hasher>(&self, state: &mut H) {
        if let Some((kind, name)) = self.nominal() {
            kind.hash(state);
            name.hash(state);
            return;
        }

        mem::discriminant(self).hash(state);
        match self {
            Self::Any
            | Self::Null
            | Self::Boolean
            | Self::TinyInt
            | Self::SmallInt
            | Self::Int
            | Self::BigInt
            | Self::Float
            | Self::Double
            | Self::Date
            | Self::Timestamp
            | Self::String => {}
            Self::Decimal(spec) => spec.hash(state),
            Self::Char(length) => length.hash(state),
            Self::Varchar(length) => length.hash(state),
            Self::Array(elem) => elem.hash(state),
            Self::Tuple(elements) => elements.hash(state),
            Self::Map(map) => map.hash(state),
            Self::Struct(s) => hash_unordered(s.fields.iter(), state),
            Self::Union(u) => hash_unordered(u.variants.iter(), state),
            Self::Ref(r) => r.name.hash(state),
        }
    }
}

/// Order-independent hash, matching the order-independent equality of
/// struct fields and union variants
fn hash_unordered<T: Hash, H: Hasher>(items: impl ExactSizeIterator<Item = T>, state: &mut H) {
    items.len().hash(state);
    let combined = items.fold(0u64, |acc, item| {
        let mut hasher = DefaultHasher::new();
        item.hash(&mut hasher);
        acc.wrapping_add(hasher.finish())
    });
    combined.hash(state);
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("Any"),
            Self::Null => f.write_str("Null"),
            Self::Boolean => f.write_str("Boolean"),
            Self::TinyInt => f.write_str("TinyInt"),
            Self::SmallInt => f.write_str("SmallInt"),
            Self::Int => f.write_str("Int"),
            Self::BigInt => f.write_str("BigInt"),
            Self::Float => f.write_str("Float"),
            Self::Double => f.write_str("Double"),
            Self::Date => f.write_str("Date"),
            Self::Timestamp => f.write_str("Timestamp"),
            Self::String => f.write_str("String"),
            Self::Decimal(spec) => write!(f, "Decimal({},{})", spec.precision, spec.scale),
            Self::Char(length) => write!(f, "Char({})", length.0),
            Self::Varchar(length) => write!(f, "Varchar({})", length.0),
            Self::Array(elem) => write!(f, "{}[]", elem),
            Self::Tuple(elements) => {
                f.write_str("(")?;
                for (i, elem) in elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", elem)?;
                }
                f.write_str(")")
            }
            Self::Map(map) => write!(f, "{}=>{}", map.key, map.value),
            Self::Struct(s) => match &s.name {
                Some(name) => f.write_str(name),
                None => write!(f, "{}", FieldList(&s.fields)),
            },
            Self::Union(u) => match &u.name {
                Some(name) => f.write_str(name),
                None => write!(f, "{}", VariantList(&u.variants)),
            },
            Self::Ref(r) => f.write_str(&r.name),
        }
    }
}

/// Signature of an anonymous struct body, `{name:Type,...}`
struct FieldList<'a>(&'a IndexMap<String, Type>);

impl fmt::Display for FieldList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, ty)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}:{}", name, ty)?;
        }
        f.write_str("}")
    }
}

/// Signature of anonymous union variants; `T|Null` prints as `T?`
struct VariantList<'a>(&'a IndexSet<Type>);

impl fmt::Display for VariantList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let variants = self.0;
        if variants.len() == 2 && variants.contains(&Type::Null) {
            if let Some(inner) = variants.iter().find(|v| **v != Type::Null) {
                return write!(f, "{}?", inner);
            }
        }
        for (i, variant) in variants.iter().enumerate() {
            if i > 0 {
                f.write_str("|")?;
            }
            write!(f, "{}", variant)?;
        }
        Ok(())
    }
}

pub(crate) fn fields_signature(fields: &IndexMap<String, Type>) -> String {
    FieldList(fields).to_string()
}

pub(crate) fn variants_signature(variants: &IndexSet<Type>) -> String {
    VariantList(variants).to_string()
}

impl Default for Type {
    fn default() -> Self {
        Self::Any
    }
}

/// Precision and scale of a `Decimal` type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecimalSpec {
    precision: u32,
    scale: u32,
}

impl DecimalSpec {
    /// Validate precision and scale
    pub fn new(precision: u32, scale: u32) -> Result<Self> {
        if precision == 0 || precision > DECIMAL_MAX_PRECISION {
            let err = TabulaError::decimal_precision(precision, DECIMAL_MAX_PRECISION);
            log::debug!("rejected decimal type: {err}");
            return Err(err);
        }
        if scale > precision {
            let err = TabulaError::decimal_scale(precision, scale);
            log::debug!("rejected decimal type: {err}");
            return Err(err);
        }
        Ok(Self { precision, scale })
    }

    /// Precision and scale covering the given digits, clamped into the valid range
    pub(crate) fn covering(precision: u32, scale: u32) -> Self {
        let precision = precision.max(scale).clamp(1, DECIMAL_MAX_PRECISION);
        Self {
            precision,
            scale: scale.min(precision),
        }
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }
}

/// Declared length of a `Char` type, within `1..=255`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CharLength(u32);

impl CharLength {
    pub fn new(length: u32) -> Result<Self> {
        if !(1..=CHAR_MAX_LENGTH).contains(&length) {
            let err = TabulaError::char_length(length, CHAR_MAX_LENGTH);
            log::debug!("rejected char type: {err}");
            return Err(err);
        }
        Ok(Self(length))
    }

    pub(crate) fn covering(length: usize) -> Self {
        Self(u32::try_from(length).unwrap_or(u32::MAX).clamp(1, CHAR_MAX_LENGTH))
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

/// Declared length of a `Varchar` type, within `1..=65535`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarcharLength(u32);

impl VarcharLength {
    pub fn new(length: u32) -> Result<Self> {
        if !(1..=VARCHAR_MAX_LENGTH).contains(&length) {
            let err = TabulaError::varchar_length(length, VARCHAR_MAX_LENGTH);
            log::debug!("rejected varchar type: {err}");
            return Err(err);
        }
        Ok(Self(length))
    }

    pub(crate) fn covering(length: usize) -> Self {
        Self(u32::try_from(length).unwrap_or(u32::MAX).clamp(1, VARCHAR_MAX_LENGTH))
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

/// Key and value types of a `Map`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MapType {
    key: Box<Type>,
    value: Box<Type>,
}

impl MapType {
    pub fn key(&self) -> &Type {
        &self.key
    }

    pub fn value(&self) -> &Type {
        &self.value
    }
}

/// Fields of a struct type
#[derive(Debug)]
pub struct StructType {
    pub(crate) name: Option<String>,
    pub(crate) fields: IndexMap<String, Type>,
    pub(crate) cyclic: bool,
}

impl StructType {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn fields(&self) -> &IndexMap<String, Type> {
        &self.fields
    }

    /// Look up a field type by name
    pub fn field(&self, name: &str) -> Option<&Type> {
        self.fields.get(name)
    }

    pub fn is_cyclic(&self) -> bool {
        self.cyclic
    }
}

/// Variants of a union type
#[derive(Debug)]
pub struct UnionType {
    pub(crate) name: Option<String>,
    pub(crate) variants: IndexSet<Type>,
    pub(crate) cyclic: bool,
}

impl UnionType {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn variants(&self) -> &IndexSet<Type> {
        &self.variants
    }

    pub fn is_cyclic(&self) -> bool {
        self.cyclic
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum NominalKind {
    Struct,
    Union,
}

/// Non-owning handle to the named type a self-reference points to
#[derive(Clone)]
pub(crate) enum RefTarget {
    Struct(Weak<StructType>),
    Union(Weak<UnionType>),
}

impl RefTarget {
    pub(crate) fn same_as(&self, other: &RefTarget) -> bool {
        match (self, other) {
            (Self::Struct(a), Self::Struct(b)) => Weak::ptr_eq(a, b),
            (Self::Union(a), Self::Union(b)) => Weak::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Reference from inside a named struct or union back to itself
///
/// The handle does not keep its target alive; it resolves only after the
/// target finished construction and while the target is still in use.
#[derive(Clone)]
pub struct TypeRef {
    name: String,
    target: RefTarget,
}

impl TypeRef {
    pub(crate) fn new(name: String, target: RefTarget) -> Self {
        Self { name, target }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The referenced type, once it is fully built
    pub fn target(&self) -> Option<Type> {
        match &self.target {
            RefTarget::Struct(weak) => weak.upgrade().map(Type::Struct),
            RefTarget::Union(weak) => weak.upgrade().map(Type::Union),
        }
    }

    pub(crate) fn points_to(&self, target: &RefTarget) -> bool {
        self.target.same_as(target)
    }

    fn kind(&self) -> NominalKind {
        match self.target {
            RefTarget::Struct(_) => NominalKind::Struct,
            RefTarget::Union(_) => NominalKind::Union,
        }
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeRef").field(&self.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parameter_bounds() {
        assert!(Type::decimal(38, 10).is_ok());
        assert!(Type::decimal(39, 0).is_err());
        assert!(Type::decimal(0, 0).is_err());
        assert!(Type::decimal(5, 6).is_err());

        assert!(Type::char(1).is_ok());
        assert!(Type::char(255).is_ok());
        assert!(Type::char(0).is_err());
        assert!(Type::char(256).is_err());

        assert!(Type::varchar(65_535).is_ok());
        assert!(Type::varchar(65_536).is_err());
    }

    #[test]
    fn test_parameter_error_kind() {
        let err = Type::decimal(40, 2).unwrap_err();
        assert!(matches!(err, TabulaError::InvalidParameter { .. }));
    }

    #[test]
    fn test_map_key_must_be_scalar() {
        assert!(Type::map(Type::String, Type::array(Type::Int)).is_ok());
        assert!(Type::map(Type::decimal(10, 2).unwrap(), Type::Int).is_ok());
        assert!(Type::map(Type::array(Type::Int), Type::Int).is_err());
        assert!(Type::map(Type::Any, Type::Int).is_err());
        assert!(Type::map(Type::Null, Type::Int).is_err());
    }

    #[test]
    fn test_leaf_signatures() {
        assert_eq!(Type::Boolean.signature(), "Boolean");
        assert_eq!(Type::BigInt.signature(), "BigInt");
        assert_eq!(Type::decimal(10, 2).unwrap().signature(), "Decimal(10,2)");
        assert_eq!(Type::char(3).unwrap().signature(), "Char(3)");
        assert_eq!(Type::varchar(200).unwrap().signature(), "Varchar(200)");
    }

    #[test]
    fn test_composite_signatures() {
        assert_eq!(Type::array(Type::Int).signature(), "Int[]");
        assert_eq!(
            Type::tuple([Type::Int, Type::String]).signature(),
            "(Int,String)"
        );
        assert_eq!(
            Type::map(Type::String, Type::Double).unwrap().signature(),
            "String=>Double"
        );
    }

    #[test]
    fn test_nullable_combinator() {
        let opt = nullable(Type::Int);
        assert!(opt.is_nullable());
        assert_eq!(opt.signature(), "Int?");
        assert_eq!(nullable(opt.clone()), opt);
        assert_eq!(nullable(Type::Null), Type::Null);
    }

    #[test]
    fn test_union_of_flattens_anonymous_operands() {
        let ab = union_of(Type::Int, Type::String).unwrap();
        let abc = union_of(ab, Type::Boolean).unwrap();
        assert_eq!(abc.variants().map(|v| v.len()), Some(3));
        assert_eq!(abc.signature(), "Int|String|Boolean");

        assert!(union_of(Type::Int, Type::Int).is_err());
    }

    #[test]
    fn test_union_equality_ignores_order() {
        let a = union_of(Type::Int, Type::String).unwrap();
        let b = union_of(Type::String, Type::Int).unwrap();
        assert_eq!(a, b);

        let mut set = std::collections::HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn test_scalar_and_numeric_classification() {
        assert!(Type::Int.is_numeric());
        assert!(Type::decimal(5, 0).unwrap().is_numeric());
        assert!(!Type::String.is_numeric());
        assert!(Type::char(4).unwrap().is_scalar());
        assert!(!Type::array(Type::Int).is_scalar());
        assert!(!Type::Any.is_scalar());
    }

    #[test]
    fn test_parameterized_equality_is_exact() {
        assert_ne!(Type::decimal(10, 2).unwrap(), Type::decimal(10, 3).unwrap());
        assert_ne!(Type::char(3).unwrap(), Type::varchar(3).unwrap());
        assert_eq!(Type::varchar(8).unwrap(), Type::varchar(8).unwrap());
    }
}
