//! Numeric conversion tests
//!
//! Tests the conversion lattice between numeric values:
//! - two's-complement truncation between integer widths
//! - float and decimal truncation toward zero
//! - exact conversion to Decimal
//! - non-numeric values

use bigdecimal::BigDecimal;
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::str::FromStr;
use tabula_types::*;

// === Integer Narrowing ===

#[rstest]
#[case(Value::Int(300), NumericKind::TinyInt, Value::TinyInt(44))]
#[case(Value::Int(128), NumericKind::TinyInt, Value::TinyInt(-128))]
#[case(Value::Int(-1), NumericKind::TinyInt, Value::TinyInt(-1))]
#[case(Value::BigInt(65_537), NumericKind::SmallInt, Value::SmallInt(1))]
#[case(Value::BigInt(4_294_967_296), NumericKind::Int, Value::Int(0))]
#[case(Value::SmallInt(-300), NumericKind::TinyInt, Value::TinyInt(-44))]
fn test_integer_narrowing_wraps(#[case] input: Value, #[case] target: NumericKind, #[case] expected: Value) {
    assert_eq!(input.convert(target), Some(expected));
}

#[rstest]
#[case(Value::TinyInt(-5), NumericKind::BigInt, Value::BigInt(-5))]
#[case(Value::SmallInt(i16::MAX), NumericKind::Int, Value::Int(32_767))]
#[case(Value::Int(i32::MIN), NumericKind::BigInt, Value::BigInt(-2_147_483_648))]
fn test_integer_widening_preserves_value(#[case] input: Value, #[case] target: NumericKind, #[case] expected: Value) {
    assert_eq!(input.convert(target), Some(expected));
}

// === Floating Point ===

#[rstest]
#[case(Value::Double(3.99), NumericKind::Int, Value::Int(3))]
#[case(Value::Double(-3.99), NumericKind::Int, Value::Int(-3))]
#[case(Value::Float(0.9), NumericKind::BigInt, Value::BigInt(0))]
#[case(Value::Double(300.7), NumericKind::TinyInt, Value::TinyInt(44))]
#[case(Value::Double(f64::NAN), NumericKind::SmallInt, Value::SmallInt(0))]
#[case(Value::Double(f64::INFINITY), NumericKind::BigInt, Value::BigInt(i64::MAX))]
fn test_float_to_integer_truncates(#[case] input: Value, #[case] target: NumericKind, #[case] expected: Value) {
    assert_eq!(input.convert(target), Some(expected));
}

#[test]
fn test_integer_to_float_rounds_to_nearest() {
    let big = (1_i64 << 53) + 1;
    assert_eq!(Value::BigInt(big).convert(NumericKind::Double), Some(Value::Double((1_i64 << 53) as f64)));
    assert_eq!(Value::Int(16_777_217).convert(NumericKind::Float), Some(Value::Float(16_777_216.0)));
}

// === Decimal ===

#[rstest]
#[case("12.99", 12)]
#[case("-12.99", -12)]
#[case("0.0001", 0)]
#[case("1000000000000", 4_096)]
fn test_decimal_to_small_int_truncates_then_wraps(#[case] literal: &str, #[case] expected: i16) {
    let value = Value::decimal(BigDecimal::from_str(literal).unwrap());
    assert_eq!(value.convert(NumericKind::SmallInt), Some(Value::SmallInt(expected)));
}

#[test]
fn test_conversion_to_decimal_is_exact() {
    assert_eq!(
        Value::BigInt(i64::MAX).convert(NumericKind::Decimal),
        Some(Value::decimal(BigDecimal::from(i64::MAX)))
    );
    assert_eq!(
        Value::Float(0.25).convert(NumericKind::Decimal),
        Some(Value::decimal(BigDecimal::from_str("0.25").unwrap()))
    );
}

#[rstest]
#[case(1e30, "1000000000000000019884624838656")]
#[case(0.1, "0.1000000000000000055511151231257827021181583404541015625")]
#[case(-2.5e-3, "-0.0025000000000000000520417042793042128323577344417572021484375")]
#[case(9_007_199_254_740_993.0, "9007199254740992")]
fn test_double_to_decimal_keeps_every_binary_digit(#[case] input: f64, #[case] expected: &str) {
    let converted = Value::Double(input).convert(NumericKind::Decimal);
    assert_eq!(converted, Some(Value::decimal(BigDecimal::from_str(expected).unwrap())));
    assert_eq!(converted.and_then(|d| d.convert(NumericKind::Double)), Some(Value::Double(input)));
}

#[test]
fn test_decimal_to_double() {
    let value = Value::decimal(BigDecimal::from_str("2.5").unwrap());
    assert_eq!(value.convert(NumericKind::Double), Some(Value::Double(2.5)));
}

// === Non-numeric ===

#[rstest]
#[case(Value::Null)]
#[case(Value::Boolean(true))]
#[case(Value::string("42"))]
#[case(Value::array([Value::Int(1)]))]
fn test_non_numeric_values_do_not_convert(#[case] value: Value) {
    assert_eq!(value.as_numeric(), None);
    assert_eq!(value.convert(NumericKind::Int), None);
}

#[test]
fn test_numeric_kind_of_type() {
    assert_eq!(NumericKind::of(&Type::SmallInt), Some(NumericKind::SmallInt));
    assert_eq!(NumericKind::of(&Type::String), None);
    assert_eq!(NumericKind::Float.to_string(), "Float");
    assert_eq!(NumericKind::ALL.len(), 7);
}
