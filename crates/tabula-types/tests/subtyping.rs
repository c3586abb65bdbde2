//! Subtype relation tests
//!
//! Tests the subtype rules:
//! - reflexivity and the top type
//! - struct width subtyping
//! - unions on either side
//! - exact parameters for Decimal, Char and Varchar
//! - recursive named types

use rstest::rstest;
use tabula_types::*;

fn union3(a: Type, b: Type, c: Type) -> Type {
    Type::union([a, b, c]).unwrap()
}

// === Structs ===

#[test]
fn test_struct_width_subtyping() {
    let wide = Type::structure([("a", Type::Int), ("b", Type::String)]).unwrap();
    let narrow = Type::structure([("a", Type::Int)]).unwrap();

    assert!(wide.is_subtype_of(&narrow));
    assert!(!narrow.is_subtype_of(&wide));
    assert!(narrow.is_supertype_of(&wide));
}

#[test]
fn test_struct_field_types_must_be_subtypes() {
    let narrow = Type::structure([("a", nullable(Type::Int))]).unwrap();
    let exact = Type::structure([("a", Type::Int), ("b", Type::Date)]).unwrap();
    let wrong = Type::structure([("a", Type::String)]).unwrap();

    assert!(exact.is_subtype_of(&narrow));
    assert!(!wrong.is_subtype_of(&narrow));
}

#[test]
fn test_named_struct_of_matching_shape_is_subtype() {
    let person = Type::named_struct(
        "Person",
        [("name", Type::String), ("age", Type::Int)],
    )
    .unwrap();
    let named = Type::structure([("name", Type::String)]).unwrap();
    assert!(person.is_subtype_of(&named));
}

// === Unions ===

#[test]
fn test_union_subtype_of_wider_union() {
    let narrow = union_of(Type::Int, Type::String).unwrap();
    let wide = union3(Type::Int, Type::String, Type::Boolean);

    assert!(narrow.is_subtype_of(&wide));
    assert!(!wide.is_subtype_of(&narrow));
}

#[test]
fn test_union_subtype_of_non_union_requires_every_variant() {
    let ints = union_of(Type::Int, Type::BigInt).unwrap();
    assert!(!ints.is_subtype_of(&Type::Int));

    let records = union_of(
        Type::structure([("id", Type::Int), ("name", Type::String)]).unwrap(),
        Type::structure([("id", Type::Int), ("at", Type::Timestamp)]).unwrap(),
    )
    .unwrap();
    let keyed = Type::structure([("id", Type::Int)]).unwrap();
    assert!(records.is_subtype_of(&keyed));
}

#[test]
fn test_nullable_accepts_base_and_null() {
    let opt = nullable(Type::Date);
    assert!(Type::Date.is_subtype_of(&opt));
    assert!(Type::Null.is_subtype_of(&opt));
    assert!(!opt.is_subtype_of(&Type::Date));
}

// === Parameterized Types ===

#[rstest]
#[case(Type::decimal(10, 2).unwrap(), Type::decimal(10, 2).unwrap(), true)]
#[case(Type::decimal(5, 2).unwrap(), Type::decimal(10, 2).unwrap(), false)]
#[case(Type::decimal(10, 2).unwrap(), Type::decimal(10, 4).unwrap(), false)]
#[case(Type::char(3).unwrap(), Type::char(3).unwrap(), true)]
#[case(Type::char(3).unwrap(), Type::char(10).unwrap(), false)]
#[case(Type::varchar(3).unwrap(), Type::varchar(10).unwrap(), false)]
#[case(Type::char(3).unwrap(), Type::varchar(3).unwrap(), false)]
#[case(Type::varchar(3).unwrap(), Type::String, false)]
fn test_parameters_must_match_exactly(#[case] a: Type, #[case] b: Type, #[case] expected: bool) {
    assert_eq!(a.is_subtype_of(&b), expected, "{a} <: {b}");
}

#[rstest]
#[case(Type::TinyInt, Type::SmallInt)]
#[case(Type::Int, Type::BigInt)]
#[case(Type::Float, Type::Double)]
#[case(Type::Date, Type::Timestamp)]
#[case(Type::Null, Type::Int)]
fn test_distinct_leaves_are_unrelated(#[case] a: Type, #[case] b: Type) {
    assert!(!a.is_subtype_of(&b));
    assert!(!b.is_subtype_of(&a));
    assert!(!a.is_compatible_with(&b));
}

#[test]
fn test_composites_are_invariant() {
    let ints = Type::array(Type::Int);
    let any = Type::array(Type::Any);
    assert!(!ints.is_subtype_of(&any));

    let pair = Type::tuple([Type::Int, Type::String]);
    assert!(!pair.is_subtype_of(&Type::tuple([Type::Int])));

    let m = map_of(Type::String, Type::Int).unwrap();
    assert!(m.is_subtype_of(&map_of(Type::String, Type::Int).unwrap()));
    assert!(!m.is_subtype_of(&map_of(Type::String, Type::BigInt).unwrap()));
}

// === Recursive Types ===

fn chain(name: &str, extra: Option<(&str, Type)>) -> Type {
    Type::define_struct(Some(name), |me| {
        let mut fields = vec![("value", Type::Int), ("next", nullable(me.clone()))];
        fields.extend(extra);
        Ok(fields)
    })
    .unwrap()
}

#[test]
fn test_recursive_type_is_subtype_of_itself() {
    let a = chain("Chain", None);
    assert!(a.is_subtype_of(&a));
    assert!(a.is_subtype_of(&chain("Chain", None)));
    assert!(a.is_subtype_of(&Type::Any));
}

#[test]
fn test_recursive_width_subtyping() {
    let labelled = chain("Labelled", Some(("label", Type::String)));
    let plain = chain("Plain", None);

    assert!(labelled.is_subtype_of(&plain));
    assert!(!plain.is_subtype_of(&labelled));
}

#[test]
fn test_recursive_union_membership_of_variants() {
    let json = Type::define_union(Some("Json"), |me| {
        Ok([
            Type::Null,
            Type::String,
            Type::Double,
            Type::array(me.clone()),
        ])
    })
    .unwrap();

    assert!(Type::String.is_subtype_of(&json));
    assert!(Type::array(json.clone()).is_subtype_of(&json));
    assert!(!Type::Int.is_subtype_of(&json));
    assert!(json.is_nullable());
}
