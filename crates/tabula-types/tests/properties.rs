//! Property tests for the type algebra

use proptest::prelude::*;
use tabula_types::*;

fn leaf_type() -> impl Strategy<Value = Type> {
    prop_oneof![
        prop::sample::select(vec![
            Type::Null,
            Type::Boolean,
            Type::TinyInt,
            Type::SmallInt,
            Type::Int,
            Type::BigInt,
            Type::Float,
            Type::Double,
            Type::Date,
            Type::Timestamp,
            Type::String,
        ]),
        (1u32..=38)
            .prop_flat_map(|p| (Just(p), 0..=p))
            .prop_map(|(p, s)| Type::decimal(p, s).unwrap()),
        (1u32..=255).prop_map(|n| Type::char(n).unwrap()),
        (1u32..=65_535).prop_map(|n| Type::varchar(n).unwrap()),
    ]
}

fn any_type() -> impl Strategy<Value = Type> {
    leaf_type().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            inner.clone().prop_map(Type::array),
            prop::collection::vec(inner.clone(), 1..4).prop_map(Type::tuple),
            prop::collection::vec(inner.clone(), 1..4).prop_map(|types| {
                Type::structure(
                    types
                        .into_iter()
                        .enumerate()
                        .map(|(i, ty)| (format!("f{i}"), ty)),
                )
                .unwrap()
            }),
            inner.prop_map(nullable),
        ]
    })
}

proptest! {
    #[test]
    fn subtype_is_reflexive(ty in any_type()) {
        prop_assert!(ty.is_subtype_of(&ty));
    }

    #[test]
    fn any_is_the_top_type(ty in any_type()) {
        prop_assert!(ty.is_subtype_of(&Type::Any));
    }

    #[test]
    fn union_is_supertype_of_its_operands(a in leaf_type(), b in leaf_type()) {
        prop_assume!(a != b);
        let union = union_of(a.clone(), b.clone()).unwrap();
        prop_assert!(a.is_subtype_of(&union));
        prop_assert!(b.is_subtype_of(&union));
        prop_assert!(!union.is_subtype_of(&a));
    }

    #[test]
    fn equal_types_hash_alike(ty in any_type()) {
        use std::hash::{BuildHasher, RandomState};
        let state = RandomState::new();
        prop_assert_eq!(state.hash_one(&ty), state.hash_one(ty.clone()));
    }

    #[test]
    fn narrowing_int_to_tiny_int_is_mod_256(x in any::<i32>()) {
        let expected = x.rem_euclid(256) as u8 as i8;
        prop_assert_eq!(Value::Int(x).convert(NumericKind::TinyInt), Some(Value::TinyInt(expected)));
    }

    #[test]
    fn narrowing_big_int_to_small_int_is_mod_65536(x in any::<i64>()) {
        let expected = x.rem_euclid(65_536) as u16 as i16;
        prop_assert_eq!(Value::BigInt(x).convert(NumericKind::SmallInt), Some(Value::SmallInt(expected)));
    }

    #[test]
    fn integers_round_trip_through_decimal(x in any::<i64>()) {
        let decimal = Value::BigInt(x).convert(NumericKind::Decimal).unwrap();
        prop_assert_eq!(decimal.convert(NumericKind::BigInt), Some(Value::BigInt(x)));
    }

    #[test]
    fn integer_values_are_instances_of_their_natural_type(x in any::<i64>(), y in any::<i16>()) {
        for value in [Value::BigInt(x), Value::SmallInt(y), Value::tuple([Value::BigInt(x), Value::SmallInt(y)])] {
            prop_assert!(value.instance_of(&value.natural_type()));
        }
    }
}
