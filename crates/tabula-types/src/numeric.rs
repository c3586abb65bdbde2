//! Numeric Conversion Lattice
//!
//! Conversions between the seven numeric kinds are total: every numeric value
//! converts to every numeric kind, possibly losing information.
//!
//! - integer to narrower integer: two's-complement truncation (wraps)
//! - Float/Double to integer: truncate toward zero, saturating to the 32-bit
//!   range (64-bit for BigInt) before narrowing; NaN becomes 0
//! - Decimal to integer: truncate toward zero, then wrap
//! - anything to Decimal: exact; NaN maps to 0 and infinities to the widest
//!   `Decimal(38, 0)` values
//! - anything to Float/Double: nearest representable

use bigdecimal::BigDecimal;
use num_bigint::{BigInt, Sign};
use num_traits::Zero;
use std::fmt;

use crate::limits::DECIMAL_MAX_PRECISION;
use crate::type_system::Type;
use crate::value::Value;

/// Target of a numeric conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericKind {
    TinyInt,
    SmallInt,
    Int,
    BigInt,
    Float,
    Double,
    Decimal,
}

impl NumericKind {
    /// All numeric kinds, narrowest integer first
    pub const ALL: [NumericKind; 7] = [
        Self::TinyInt,
        Self::SmallInt,
        Self::Int,
        Self::BigInt,
        Self::Float,
        Self::Double,
        Self::Decimal,
    ];

    /// Numeric kind of a type, if it is numeric
    pub fn of(ty: &Type) -> Option<Self> {
        match ty {
            Type::TinyInt => Some(Self::TinyInt),
            Type::SmallInt => Some(Self::SmallInt),
            Type::Int => Some(Self::Int),
            Type::BigInt => Some(Self::BigInt),
            Type::Float => Some(Self::Float),
            Type::Double => Some(Self::Double),
            Type::Decimal(_) => Some(Self::Decimal),
            _ => None,
        }
    }

    /// Check if every value of this kind converts to `target` without loss
    ///
    /// Integers widen to wider integers and to Decimal; TinyInt and SmallInt
    /// also fit Float, and Int fits Double. Float widens to Double.
    pub fn is_lossless_to(self, target: NumericKind) -> bool {
        if self == target {
            return true;
        }
        match self {
            Self::TinyInt => true,
            Self::SmallInt => target != Self::TinyInt,
            Self::Int => matches!(target, Self::BigInt | Self::Double | Self::Decimal),
            Self::BigInt => target == Self::Decimal,
            Self::Float => target == Self::Double,
            Self::Double | Self::Decimal => false,
        }
    }
}

impl fmt::Display for NumericKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::TinyInt => "TinyInt",
            Self::SmallInt => "SmallInt",
            Self::Int => "Int",
            Self::BigInt => "BigInt",
            Self::Float => "Float",
            Self::Double => "Double",
            Self::Decimal => "Decimal",
        };
        f.write_str(name)
    }
}

/// A numeric payload
#[derive(Debug, Clone, PartialEq)]
pub enum Numeric {
    TinyInt(i8),
    SmallInt(i16),
    Int(i32),
    BigInt(i64),
    Float(f32),
    Double(f64),
    Decimal(BigDecimal),
}

impl Numeric {
    pub fn kind(&self) -> NumericKind {
        match self {
            Self::TinyInt(_) => NumericKind::TinyInt,
            Self::SmallInt(_) => NumericKind::SmallInt,
            Self::Int(_) => NumericKind::Int,
            Self::BigInt(_) => NumericKind::BigInt,
            Self::Float(_) => NumericKind::Float,
            Self::Double(_) => NumericKind::Double,
            Self::Decimal(_) => NumericKind::Decimal,
        }
    }

    /// Convert to the given kind
    pub fn convert(&self, target: NumericKind) -> Numeric {
        match target {
            NumericKind::TinyInt => Self::TinyInt(self.to_tiny_int()),
            NumericKind::SmallInt => Self::SmallInt(self.to_small_int()),
            NumericKind::Int => Self::Int(self.to_int()),
            NumericKind::BigInt => Self::BigInt(self.to_big_int()),
            NumericKind::Float => Self::Float(self.to_float()),
            NumericKind::Double => Self::Double(self.to_double()),
            NumericKind::Decimal => Self::Decimal(self.to_decimal()),
        }
    }

    pub fn to_tiny_int(&self) -> i8 {
        match self {
            Self::TinyInt(i) => *i,
            Self::SmallInt(i) => *i as i8,
            Self::Int(i) => *i as i8,
            Self::BigInt(i) => *i as i8,
            Self::Float(x) => (*x as i32) as i8,
            Self::Double(x) => (*x as i32) as i8,
            Self::Decimal(d) => decimal_wrapped(d) as i8,
        }
    }

    pub fn to_small_int(&self) -> i16 {
        match self {
            Self::TinyInt(i) => i16::from(*i),
            Self::SmallInt(i) => *i,
            Self::Int(i) => *i as i16,
            Self::BigInt(i) => *i as i16,
            Self::Float(x) => (*x as i32) as i16,
            Self::Double(x) => (*x as i32) as i16,
            Self::Decimal(d) => decimal_wrapped(d) as i16,
        }
    }

    pub fn to_int(&self) -> i32 {
        match self {
            Self::TinyInt(i) => i32::from(*i),
            Self::SmallInt(i) => i32::from(*i),
            Self::Int(i) => *i,
            Self::BigInt(i) => *i as i32,
            Self::Float(x) => *x as i32,
            Self::Double(x) => *x as i32,
            Self::Decimal(d) => decimal_wrapped(d) as i32,
        }
    }

    pub fn to_big_int(&self) -> i64 {
        match self {
            Self::TinyInt(i) => i64::from(*i),
            Self::SmallInt(i) => i64::from(*i),
            Self::Int(i) => i64::from(*i),
            Self::BigInt(i) => *i,
            Self::Float(x) => *x as i64,
            Self::Double(x) => *x as i64,
            Self::Decimal(d) => decimal_wrapped(d),
        }
    }

    pub fn to_float(&self) -> f32 {
        match self {
            Self::TinyInt(i) => f32::from(*i),
            Self::SmallInt(i) => f32::from(*i),
            Self::Int(i) => *i as f32,
            Self::BigInt(i) => *i as f32,
            Self::Float(x) => *x,
            Self::Double(x) => *x as f32,
            Self::Decimal(d) => decimal_to_float(d),
        }
    }

    pub fn to_double(&self) -> f64 {
        match self {
            Self::TinyInt(i) => f64::from(*i),
            Self::SmallInt(i) => f64::from(*i),
            Self::Int(i) => f64::from(*i),
            Self::BigInt(i) => *i as f64,
            Self::Float(x) => f64::from(*x),
            Self::Double(x) => *x,
            Self::Decimal(d) => decimal_to_float(d),
        }
    }

    pub fn to_decimal(&self) -> BigDecimal {
        match self {
            Self::TinyInt(i) => BigDecimal::from(*i),
            Self::SmallInt(i) => BigDecimal::from(*i),
            Self::Int(i) => BigDecimal::from(*i),
            Self::BigInt(i) => BigDecimal::from(*i),
            Self::Float(x) => float_to_decimal(f64::from(*x)),
            Self::Double(x) => float_to_decimal(*x),
            Self::Decimal(d) => d.clone(),
        }
    }

    /// Wrap this payload back into a value
    pub fn into_value(self) -> Value {
        match self {
            Self::TinyInt(i) => Value::TinyInt(i),
            Self::SmallInt(i) => Value::SmallInt(i),
            Self::Int(i) => Value::Int(i),
            Self::BigInt(i) => Value::BigInt(i),
            Self::Float(x) => Value::Float(x),
            Self::Double(x) => Value::Double(x),
            Self::Decimal(d) => Value::Decimal(d),
        }
    }
}

/// Integer part of a decimal, truncated toward zero and wrapped to 64 bits
fn decimal_wrapped(d: &BigDecimal) -> i64 {
    let (digits, exponent) = d.as_bigint_and_exponent();
    let ten = BigInt::from(10u8);
    let truncated = if exponent >= 0 {
        // 10^e exceeds every value of at most e bits
        if exponent as u64 > digits.bits() {
            return 0;
        }
        digits / ten.pow(exponent as u32)
    } else {
        let places = exponent.unsigned_abs();
        // a multiple of 10^64 is a multiple of 2^64
        if places >= 64 {
            return 0;
        }
        digits * ten.pow(places as u32)
    };
    low_64_bits(&truncated)
}

/// Nearest float to a decimal, rounded by the float parser
fn decimal_to_float<F: std::str::FromStr + Default>(d: &BigDecimal) -> F {
    let (digits, exponent) = d.as_bigint_and_exponent();
    format!("{digits}e{}", exponent.wrapping_neg())
        .parse()
        .unwrap_or_default()
}

/// Two's-complement truncation of an integer of any size
fn low_64_bits(n: &BigInt) -> i64 {
    let fill = if n.sign() == Sign::Minus { 0xff } else { 0 };
    let mut low = [fill; 8];
    for (slot, byte) in low.iter_mut().zip(n.to_signed_bytes_le()) {
        *slot = byte;
    }
    i64::from_le_bytes(low)
}

/// Exact decimal expansion of a float
///
/// A finite float is `m * 2^e`; for negative `e` that equals
/// `m * 5^-e / 10^-e`, which has exactly `-e` fractional digits.
fn float_to_decimal(x: f64) -> BigDecimal {
    if x.is_nan() {
        return BigDecimal::zero();
    }
    if x.is_infinite() {
        let widest = BigDecimal::from(BigInt::from(10u8).pow(DECIMAL_MAX_PRECISION) - 1);
        return if x > 0.0 { widest } else { -widest };
    }

    let bits = x.to_bits();
    let biased = ((bits >> 52) & 0x7ff) as i64;
    let fraction = bits & ((1 << 52) - 1);
    let (mantissa, exponent) = if biased == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1 << 52), biased - 1075)
    };
    if mantissa == 0 {
        return BigDecimal::zero();
    }

    let shift = i64::from(mantissa.trailing_zeros()).min(exponent.abs());
    let (mantissa, exponent) = if exponent < 0 {
        (mantissa >> shift, exponent + shift)
    } else {
        (mantissa, exponent)
    };

    let magnitude = if exponent >= 0 {
        BigDecimal::from(BigInt::from(mantissa) << exponent as usize)
    } else {
        let places = exponent.unsigned_abs() as u32;
        BigDecimal::new(BigInt::from(mantissa) * BigInt::from(5u8).pow(places), i64::from(places))
    };
    if x.is_sign_negative() { -magnitude } else { magnitude }
}

impl Value {
    /// Numeric payload of a numeric value
    pub fn as_numeric(&self) -> Option<Numeric> {
        match self {
            Self::TinyInt(i) => Some(Numeric::TinyInt(*i)),
            Self::SmallInt(i) => Some(Numeric::SmallInt(*i)),
            Self::Int(i) => Some(Numeric::Int(*i)),
            Self::BigInt(i) => Some(Numeric::BigInt(*i)),
            Self::Float(x) => Some(Numeric::Float(*x)),
            Self::Double(x) => Some(Numeric::Double(*x)),
            Self::Decimal(d) => Some(Numeric::Decimal(d.clone())),
            _ => None,
        }
    }

    /// Convert a numeric value to the given kind; `None` for non-numeric values
    pub fn convert(&self, target: NumericKind) -> Option<Value> {
        self.as_numeric().map(|n| n.convert(target).into_value())
    }
}
