//! Value membership
//!
//! `Value::instance_of` decides whether a runtime value may be treated as an
//! instance of a static type. Unlike subtyping it looks at the actual data:
//! decimal digits are compared against declared precision and scale, and
//! composite values are checked element by element.

use indexmap::IndexMap;
use bigdecimal::BigDecimal;
use smallvec::SmallVec;
use std::sync::Arc;

use crate::type_system::{DecimalSpec, Type, UnionType};
use crate::value::{decimal_precision, decimal_scale, ArrayValue, MapValue, StructValue, Value};

impl Value {
    /// Check if this value is an instance of the given type
    ///
    /// Every value is an instance of `Any`, and of a union when it is an
    /// instance of at least one variant.
    pub fn instance_of(&self, ty: &Type) -> bool {
        Membership::default().check(self, ty)
    }
}

/// Tracks union expansions in progress
///
/// Expanding a recursive union for the same value twice cannot succeed where
/// the first expansion did not, so a repeated expansion answers `false`.
#[derive(Default)]
struct Membership {
    /// (value address, union address)
    expanding: SmallVec<[(usize, usize); 4]>,
}

impl Membership {
    fn check(&mut self, value: &Value, ty: &Type) -> bool {
        let ty = ty.resolve();
        let ty = ty.as_ref();

        match ty {
            Type::Any => return true,
            Type::Union(union) => return self.check_union(value, union),
            _ => {}
        }

        match value {
            Value::Null => matches!(ty, Type::Null),
            Value::Boolean(_) => matches!(ty, Type::Boolean),
            Value::TinyInt(_) => matches!(ty, Type::TinyInt),
            Value::SmallInt(_) => matches!(ty, Type::SmallInt),
            Value::Int(_) => matches!(ty, Type::Int),
            Value::BigInt(_) => matches!(ty, Type::BigInt),
            Value::Float(_) => matches!(ty, Type::Float),
            Value::Double(_) => matches!(ty, Type::Double),
            Value::Date(_) => matches!(ty, Type::Date),
            Value::Timestamp(_) => matches!(ty, Type::Timestamp),
            Value::String(_) => matches!(ty, Type::String),
            Value::Decimal(d) => match ty {
                Type::Decimal(spec) => decimal_fits(d, spec),
                _ => false,
            },
            // declared lengths are not checked against the text
            Value::Char(_) => matches!(ty, Type::Char(_)),
            Value::Varchar(_) => matches!(ty, Type::Varchar(_)),
            Value::Array(array) => match ty {
                Type::Array(element) => self.check_array(array, element),
                _ => false,
            },
            Value::Tuple(values) => match ty {
                Type::Tuple(types) => {
                    values.len() == types.len()
                        && values.iter().zip(types).all(|(v, t)| self.check(v, t))
                }
                _ => false,
            },
            Value::Map(map) => match ty {
                Type::Map(map_type) => self.check_map(map, map_type.key(), map_type.value()),
                _ => false,
            },
            Value::Struct(record) => match ty {
                Type::Struct(struct_type) => self.check_struct(record, struct_type.fields()),
                _ => false,
            },
        }
    }

    fn check_union(&mut self, value: &Value, union: &Arc<UnionType>) -> bool {
        if !union.is_cyclic() {
            return union.variants().iter().any(|variant| self.check(value, variant));
        }
        let key = (
            value as *const Value as usize,
            Arc::as_ptr(union) as *const () as usize,
        );
        if self.expanding.contains(&key) {
            return false;
        }
        self.expanding.push(key);
        let holds = union.variants().iter().any(|variant| self.check(value, variant));
        self.expanding.pop();
        holds
    }

    fn check_array(&mut self, array: &ArrayValue, element: &Type) -> bool {
        match array {
            ArrayValue::Values(values) => values.iter().all(|v| self.check(v, element)),
            // every element of a specialized array has the same tag
            specialized => specialized.get(0).is_none_or(|first| self.check(&first, element)),
        }
    }

    fn check_map(&mut self, map: &MapValue, key: &Type, value: &Type) -> bool {
        map.iter()
            .all(|(k, v)| self.check(k, key) && self.check(v, value))
    }

    fn check_struct(&mut self, record: &StructValue, fields: &IndexMap<String, Type>) -> bool {
        fields
            .iter()
            .all(|(name, field_type)| self.check(record.get(name), field_type))
    }
}

/// A decimal fits when neither its precision nor its scale exceeds the
/// declared one
fn decimal_fits(value: &BigDecimal, spec: &DecimalSpec) -> bool {
    decimal_precision(value) <= spec.precision() && decimal_scale(value) <= spec.scale()
}
