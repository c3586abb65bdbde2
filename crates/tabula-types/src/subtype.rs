//! Subtype relation
//!
//! Rules, tried in order:
//! - equal types are subtypes (recursive named types compare by name)
//! - every type is a subtype of `Any`
//! - `a <: U` when `a` is a subtype of some variant of union `U`
//! - union `U <: b` when every variant of `U` is a subtype of `b`
//! - struct width subtyping: `a` declares every field of `b` with a subtype
//! - nothing else; parameterized types only match with identical parameters
//!
//! Self-references are unfolded so recursive named types take part in the
//! union and struct rules. Re-entering the same union expansion means no
//! progress was made, so it fails; re-entering the same struct comparison
//! is assumed to hold.

use smallvec::SmallVec;
use std::sync::Arc;

use crate::type_system::Type;

/// Pairs of types currently being compared
type Pending = SmallVec<[(Type, Type); 4]>;

impl Type {
    /// Check if this type is a subtype of another type
    pub fn is_subtype_of(&self, other: &Type) -> bool {
        SubtypeCheck::default().check(self, other)
    }

    /// Check if this type is a supertype of another type
    pub fn is_supertype_of(&self, other: &Type) -> bool {
        other.is_subtype_of(self)
    }

    /// Check if types are compatible (one is subtype of the other)
    pub fn is_compatible_with(&self, other: &Type) -> bool {
        self.is_subtype_of(other) || other.is_subtype_of(self)
    }
}

#[derive(Default)]
struct SubtypeCheck {
    union_expansions: Pending,
    struct_assumptions: Pending,
}

impl SubtypeCheck {
    fn check(&mut self, a: &Type, b: &Type) -> bool {
        if a == b || b.is_any() {
            return true;
        }

        let a = a.resolve();
        let b = b.resolve();
        let (a, b) = (a.as_ref(), b.as_ref());

        if let Type::Union(union) = b {
            let holds = self.expand_union(a, b, union.is_cyclic(), |check| {
                union.variants().iter().any(|variant| check.check(a, variant))
            });
            if holds {
                return true;
            }
        }

        if let Type::Union(union) = a {
            let holds = self.expand_union(a, b, union.is_cyclic(), |check| {
                union.variants().iter().all(|variant| check.check(variant, b))
            });
            if holds {
                return true;
            }
        }

        match (a, b) {
            (Type::Struct(sa), Type::Struct(sb)) => {
                if Arc::ptr_eq(sa, sb) {
                    return true;
                }
                let recursive = sa.is_cyclic() || sb.is_cyclic();
                let pair = (a.clone(), b.clone());
                if recursive {
                    if self.struct_assumptions.contains(&pair) {
                        return true;
                    }
                    self.struct_assumptions.push(pair);
                }
                let holds = sb.fields().iter().all(|(name, required)| {
                    sa.field(name)
                        .is_some_and(|declared| self.check(declared, required))
                });
                if recursive {
                    self.struct_assumptions.pop();
                }
                holds
            }
            _ => false,
        }
    }

    fn expand_union(
        &mut self,
        a: &Type,
        b: &Type,
        recursive: bool,
        rule: impl FnOnce(&mut Self) -> bool,
    ) -> bool {
        if !recursive {
            return rule(self);
        }
        let pair = (a.clone(), b.clone());
        if self.union_expansions.contains(&pair) {
            return false;
        }
        self.union_expansions.push(pair);
        let holds = rule(self);
        self.union_expansions.pop();
        holds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::type_system::{nullable, union_of};

    #[test]
    fn test_reflexive_and_top() {
        for ty in [
            Type::Int,
            Type::decimal(12, 4).unwrap(),
            Type::array(Type::String),
            Type::tuple([Type::Int, Type::Date]),
        ] {
            assert!(ty.is_subtype_of(&ty));
            assert!(ty.is_subtype_of(&Type::Any));
        }
        assert!(!Type::Any.is_subtype_of(&Type::Int));
    }

    #[test]
    fn test_no_numeric_widening_at_type_level() {
        assert!(!Type::Int.is_subtype_of(&Type::BigInt));
        assert!(!Type::TinyInt.is_subtype_of(&Type::Int));
        assert!(!Type::decimal(5, 2)
            .unwrap()
            .is_subtype_of(&Type::decimal(10, 2).unwrap()));
    }

    #[test]
    fn test_arrays_are_invariant() {
        let ints = Type::array(Type::Int);
        let nullable_ints = Type::array(nullable(Type::Int));
        assert!(!ints.is_subtype_of(&nullable_ints));
    }

    #[test]
    fn test_member_of_union() {
        let number = union_of(Type::Int, Type::Double).unwrap();
        assert!(Type::Int.is_subtype_of(&number));
        assert!(!Type::String.is_subtype_of(&number));
        assert!(number.is_supertype_of(&Type::Double));
    }

    #[test]
    fn test_compatibility_is_symmetric() {
        let opt = nullable(Type::String);
        assert!(opt.is_compatible_with(&Type::String));
        assert!(Type::String.is_compatible_with(&opt));
        assert!(!Type::Int.is_compatible_with(&Type::String));
    }
}
