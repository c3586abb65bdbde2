//! Struct and union construction with recursive-reference validation
//!
//! Named structs and unions are built in two phases: a handle to the type is
//! created first and handed to a resolver closure, which may embed the handle
//! in the fields or variants it returns. The handle cannot be dereferenced
//! until construction finished, so a half-built type is never observable.
//!
//! Two predicates classify how the type under construction reaches itself:
//! - `referenced_in` follows every containment edge and decides whether the
//!   type is self-referential at all (and therefore needs nominal identity).
//! - `cycles_in` follows only edges that force unbounded nesting (tuple
//!   elements, struct fields, and unions whose every variant cycles). Arrays
//!   and maps can always be empty, so they end a cycle.

use indexmap::{IndexMap, IndexSet};
use std::collections::HashSet;
use std::sync::{Arc, Weak};
use tabula_diagnostics::{Result, TabulaError};

use crate::limits::MIN_UNION_VARIANTS;
use crate::type_system::{fields_signature, variants_signature, RefTarget, StructType, Type, TypeRef, UnionType};

/// Name given to the self handle of an anonymous definition
const ANONYMOUS_SELF: &str = "<self>";

impl Type {
    /// Create an anonymous struct type
    pub fn structure<N: Into<String>>(fields: impl IntoIterator<Item = (N, Type)>) -> Result<Self> {
        Self::define_struct(None, |_| Ok(fields))
    }

    /// Create a named struct type without self-references
    pub fn named_struct<N: Into<String>>(
        name: &str,
        fields: impl IntoIterator<Item = (N, Type)>,
    ) -> Result<Self> {
        Self::define_struct(Some(name), |_| Ok(fields))
    }

    /// Create an anonymous union type
    pub fn union(variants: impl IntoIterator<Item = Type>) -> Result<Self> {
        Self::define_union(None, |_| Ok(variants))
    }

    /// Create a named union type without self-references
    pub fn named_union(name: &str, variants: impl IntoIterator<Item = Type>) -> Result<Self> {
        Self::define_union(Some(name), |_| Ok(variants))
    }

    /// Define a struct whose fields may refer back to the struct itself
    ///
    /// `resolve` receives a handle standing for the struct being defined and
    /// returns the fields. Anonymous structs must not reach the handle at all;
    /// named structs may, as long as no field is unconditionally cyclic.
    pub fn define_struct<F, I, N>(name: Option<&str>, resolve: F) -> Result<Self>
    where
        F: FnOnce(&Type) -> Result<I>,
        I: IntoIterator<Item = (N, Type)>,
        N: Into<String>,
    {
        let mut outcome = Ok(());
        let built = Arc::new_cyclic(|weak: &Weak<StructType>| {
            let target = RefTarget::Struct(weak.clone());
            let handle = self_handle(name, target.clone());
            let checked = resolve(&handle)
                .and_then(|fields| collect_fields(name, fields))
                .and_then(|fields| {
                    let cyclic = validate_struct(name, &target, &fields)?;
                    Ok(StructType {
                        name: name.map(str::to_string),
                        fields,
                        cyclic,
                    })
                });
            checked.unwrap_or_else(|err| {
                outcome = Err(err);
                StructType {
                    name: None,
                    fields: IndexMap::new(),
                    cyclic: false,
                }
            })
        });
        if let Err(err) = outcome {
            log::debug!("rejected struct {}: {err}", name.unwrap_or(ANONYMOUS_SELF));
            return Err(err);
        }
        if built.cyclic {
            log::trace!("defined recursive struct {}", name.unwrap_or(ANONYMOUS_SELF));
        }
        Ok(Self::Struct(built))
    }

    /// Define a union whose variants may refer back to the union itself
    ///
    /// Variants are de-duplicated; at least two distinct ones must remain.
    /// A named union is rejected only when every variant is unconditionally
    /// cyclic, since a value can always pick a variant that terminates.
    pub fn define_union<F, I>(name: Option<&str>, resolve: F) -> Result<Self>
    where
        F: FnOnce(&Type) -> Result<I>,
        I: IntoIterator<Item = Type>,
    {
        let mut outcome = Ok(());
        let built = Arc::new_cyclic(|weak: &Weak<UnionType>| {
            let target = RefTarget::Union(weak.clone());
            let handle = self_handle(name, target.clone());
            let checked = resolve(&handle)
                .and_then(collect_variants)
                .and_then(|variants| {
                    let cyclic = validate_union(name, &target, &variants)?;
                    Ok(UnionType {
                        name: name.map(str::to_string),
                        variants,
                        cyclic,
                    })
                });
            checked.unwrap_or_else(|err| {
                outcome = Err(err);
                UnionType {
                    name: None,
                    variants: IndexSet::new(),
                    cyclic: false,
                }
            })
        });
        if let Err(err) = outcome {
            log::debug!("rejected union {}: {err}", name.unwrap_or(ANONYMOUS_SELF));
            return Err(err);
        }
        if built.cyclic {
            log::trace!("defined recursive union {}", name.unwrap_or(ANONYMOUS_SELF));
        }
        Ok(Self::Union(built))
    }
}

fn self_handle(name: Option<&str>, target: RefTarget) -> Type {
    let name = name.unwrap_or(ANONYMOUS_SELF).to_string();
    Type::Ref(TypeRef::new(name, target))
}

fn collect_fields<N: Into<String>>(
    owner: Option<&str>,
    fields: impl IntoIterator<Item = (N, Type)>,
) -> Result<IndexMap<String, Type>> {
    let mut collected = IndexMap::new();
    for (field_name, ty) in fields {
        let field_name = field_name.into();
        if collected.contains_key(&field_name) {
            let container = format!("struct {}", owner.unwrap_or(ANONYMOUS_SELF));
            return Err(TabulaError::duplicate_name(field_name, container));
        }
        collected.insert(field_name, ty);
    }
    Ok(collected)
}

fn collect_variants(variants: impl IntoIterator<Item = Type>) -> Result<IndexSet<Type>> {
    let collected: IndexSet<Type> = variants.into_iter().collect();
    if collected.len() < MIN_UNION_VARIANTS {
        return Err(TabulaError::union_arity(collected.len()));
    }
    Ok(collected)
}

/// Returns the `cyclic` flag of a valid struct
fn validate_struct(
    name: Option<&str>,
    target: &RefTarget,
    fields: &IndexMap<String, Type>,
) -> Result<bool> {
    let cyclic = fields
        .values()
        .any(|ty| SelfReach::new(target).referenced_in(ty));
    if cyclic && name.is_none() {
        return Err(TabulaError::anonymous_recursion(fields_signature(fields)));
    }
    for (field_name, ty) in fields {
        if SelfReach::new(target).cycles_in(ty) {
            return Err(TabulaError::unconditional_cycle(
                name,
                format_args!("{field_name}:{ty}"),
            ));
        }
    }
    Ok(cyclic)
}

/// Returns the `cyclic` flag of a valid union
fn validate_union(name: Option<&str>, target: &RefTarget, variants: &IndexSet<Type>) -> Result<bool> {
    let cyclic = variants
        .iter()
        .any(|ty| SelfReach::new(target).referenced_in(ty));
    if cyclic && name.is_none() {
        return Err(TabulaError::anonymous_recursion(variants_signature(variants)));
    }
    if variants
        .iter()
        .all(|ty| SelfReach::new(target).cycles_in(ty))
    {
        return Err(TabulaError::unconditional_cycle(name, variants_signature(variants)));
    }
    Ok(cyclic)
}

/// Reachability of the type under construction from a candidate member
///
/// `referenced_in` skips structs and unions it has already visited anywhere,
/// since a node that reached the target would have ended the search.
/// `cycles_in` only skips nodes on the current path: a union needs every
/// variant, so a node shared between variants must be answered each time.
struct SelfReach<'a> {
    target: &'a RefTarget,
    visited: HashSet<usize>,
}

impl<'a> SelfReach<'a> {
    fn new(target: &'a RefTarget) -> Self {
        Self {
            target,
            visited: HashSet::new(),
        }
    }

    fn address<T>(node: &Arc<T>) -> usize {
        Arc::as_ptr(node) as *const () as usize
    }

    /// First visit of a shared struct or union node
    fn enter<T>(&mut self, node: &Arc<T>) -> bool {
        self.visited.insert(Self::address(node))
    }

    /// Evaluates `walk` with `node` on the current path; a node already on
    /// the path answers `false`
    fn along<T>(&mut self, node: &Arc<T>, walk: impl FnOnce(&mut Self) -> bool) -> bool {
        let key = Self::address(node);
        if !self.visited.insert(key) {
            return false;
        }
        let holds = walk(self);
        self.visited.remove(&key);
        holds
    }

    fn referenced_in(&mut self, ty: &Type) -> bool {
        match ty {
            Type::Any
            | Type::Null
            | Type::Boolean
            | Type::TinyInt
            | Type::SmallInt
            | Type::Int
            | Type::BigInt
            | Type::Float
            | Type::Double
            | Type::Date
            | Type::Timestamp
            | Type::String
            | Type::Decimal(_)
            | Type::Char(_)
            | Type::Varchar(_) => false,
            Type::Array(elem) => self.referenced_in(elem),
            Type::Tuple(elements) => elements.iter().any(|e| self.referenced_in(e)),
            Type::Map(map) => self.referenced_in(map.key()) || self.referenced_in(map.value()),
            Type::Struct(s) => self.enter(s) && s.fields.values().any(|f| self.referenced_in(f)),
            Type::Union(u) => self.enter(u) && u.variants.iter().any(|v| self.referenced_in(v)),
            Type::Ref(r) => {
                r.points_to(self.target)
                    || r.target().is_some_and(|resolved| self.referenced_in(&resolved))
            }
        }
    }

    fn cycles_in(&mut self, ty: &Type) -> bool {
        match ty {
            Type::Any
            | Type::Null
            | Type::Boolean
            | Type::TinyInt
            | Type::SmallInt
            | Type::Int
            | Type::BigInt
            | Type::Float
            | Type::Double
            | Type::Date
            | Type::Timestamp
            | Type::String
            | Type::Decimal(_)
            | Type::Char(_)
            | Type::Varchar(_) => false,
            // an empty array or map ends the nesting
            Type::Array(_) | Type::Map(_) => false,
            Type::Tuple(elements) => elements.iter().any(|e| self.cycles_in(e)),
            Type::Struct(s) => self.along(s, |reach| s.fields.values().any(|f| reach.cycles_in(f))),
            Type::Union(u) => self.along(u, |reach| u.variants.iter().all(|v| reach.cycles_in(v))),
            Type::Ref(r) => {
                r.points_to(self.target)
                    || r.target().is_some_and(|resolved| self.cycles_in(&resolved))
            }
        }
    }
}
