use std::fmt::Display;
use std::ops;
use std::str::FromStr;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::error::{Error, Result};

/// Exact powers whose result would need more bits than this are approximated.
const MAX_EXACT_POWER_BITS: u64 = 1 << 20;

#[derive(Debug, Clone)]
pub enum Number {
    Rational(BigRational),
    Float(f64),
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Number::Rational(a), Number::Rational(b)) => a == b,
            (Number::Float(a), Number::Float(b)) => a == b,
            (Number::Rational(a), Number::Float(b)) => to_f64(a) == *b,
            (Number::Float(a), Number::Rational(b)) => *a == to_f64(b),
        }
    }
}

fn to_f64(r: &BigRational) -> f64 {
    r.to_f64().unwrap_or(if r.is_negative() {
        f64::NEG_INFINITY
    } else {
        f64::INFINITY
    })
}

impl Number {
    pub fn zero() -> Self {
        Number::Rational(BigRational::zero())
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Number::Rational(r) => r.is_zero(),
            Number::Float(f) => *f == 0.0,
        }
    }

    fn is_negative(&self) -> bool {
        match self {
            Number::Rational(r) => r.is_negative(),
            Number::Float(f) => *f < 0.0,
        }
    }

    pub fn to_f64(&self) -> f64 {
        match self {
            Number::Rational(r) => to_f64(r),
            Number::Float(f) => *f,
        }
    }

    /// Raises `self` to `exponent`. Integer exponents stay exact; anything else
    /// goes through `f64::powf`.
    pub fn pow(self, exponent: Number) -> Result<Number> {
        if self.is_zero() && exponent.is_negative() {
            return Err(Error::arithmetic(format!(
                "zero raised to a negative power ({exponent})"
            )));
        }

        if let (Number::Rational(base), Number::Rational(exponent)) = (&self, &exponent) {
            if exponent.is_integer() {
                if let Some(result) = exact_pow(base, exponent.numer()) {
                    return Ok(Number::Rational(result));
                }
            }
        }

        let odd = match &exponent {
            Number::Rational(exponent) if exponent.is_integer() => Some(exponent.numer().bit(0)),
            Number::Rational(_) => None,
            Number::Float(exponent) if exponent.fract() == 0.0 => Some(exponent % 2.0 != 0.0),
            Number::Float(_) => None,
        };

        let base = self.to_f64();
        let power = exponent.to_f64();
        if base < 0.0 {
            // The f64 image of a huge integer exponent is infinite, so the sign
            // comes from the parity of the exact exponent
            return match odd {
                Some(true) => Ok(Number::Float(-(-base).powf(power))),
                Some(false) => Ok(Number::Float((-base).powf(power))),
                None => Err(Error::arithmetic(format!(
                    "negative base ({self}) raised to a fractional power ({exponent})"
                ))),
            };
        }

        Ok(Number::Float(base.powf(power)))
    }
}

/// `None` when the exponent or the result is too large to compute exactly.
fn exact_pow(base: &BigRational, exponent: &BigInt) -> Option<BigRational> {
    let magnitude = exponent.magnitude().to_u32()?;
    let bits = base.numer().bits().max(base.denom().bits());
    if bits.saturating_mul(u64::from(magnitude)) > MAX_EXACT_POWER_BITS {
        return None;
    }

    let result = BigRational::new(base.numer().pow(magnitude), base.denom().pow(magnitude));
    if exponent.is_negative() {
        Some(result.recip())
    } else {
        Some(result)
    }
}

impl ops::Add for Number {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        match (self, other) {
            (Number::Rational(a), Number::Rational(b)) => Number::Rational(a + b),
            (Number::Float(a), Number::Float(b)) => Number::Float(a + b),
            (Number::Rational(a), Number::Float(b)) => Number::Float(to_f64(&a) + b),
            (Number::Float(a), Number::Rational(b)) => Number::Float(a + to_f64(&b)),
        }
    }
}

impl ops::Mul for Number {
    type Output = Self;

    fn mul(self, other: Self) -> Self {
        match (self, other) {
            (Number::Rational(a), Number::Rational(b)) => Number::Rational(a * b),
            (Number::Float(a), Number::Float(b)) => Number::Float(a * b),
            (Number::Rational(a), Number::Float(b)) => Number::Float(to_f64(&a) * b),
            (Number::Float(a), Number::Rational(b)) => Number::Float(a * to_f64(&b)),
        }
    }
}

impl From<i32> for Number {
    fn from(value: i32) -> Self {
        Number::Rational(BigRational::from_integer(value.into()))
    }
}

impl From<BigInt> for Number {
    fn from(value: BigInt) -> Self {
        Number::Rational(BigRational::from_integer(value))
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::Float(value)
    }
}

/// Accepts integers, fractions like `3/4`, and floats.
impl FromStr for Number {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(r) = s.parse::<BigRational>() {
            return Ok(Number::Rational(r));
        }

        s.parse::<f64>()
            .map(Number::Float)
            .map_err(|_| format!("'{s}' is not a number"))
    }
}

impl Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Number::Rational(r) if r.denom().is_one() => write!(f, "{}", r.numer()),
            Number::Rational(r) => write!(f, "{}/{}", r.numer(), r.denom()),
            Number::Float(fl) => {
                // Ensure we always print the decimal point
                if fl.is_finite() && fl.fract() == 0.0 {
                    write!(f, "{:.1}", fl)
                } else {
                    write!(f, "{}", fl)
                }
            }
        }
    }
}
