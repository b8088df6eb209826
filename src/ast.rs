use num_bigint::BigInt;
use num_traits::One;

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Name(pub String);

impl Name {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Name {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

/// An algebraic expression tree.
///
/// Subtraction, negation and division have no node of their own: `-x` is
/// `Mul([Constant(-1), x])` and `a / b` is `Mul([a, Power(b, Constant(-1))])`.
/// The parser never builds a `Group` or `Mul` with fewer than two children.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Expression {
    Constant(BigInt),
    Name(Name),
    /// Summands.
    Group(Vec<Expression>),
    /// Factors.
    Mul(Vec<Expression>),
    Power(Box<Expression>, Box<Expression>),
    Func(Name, Box<Expression>),
}

impl Expression {
    pub fn constant(value: impl Into<BigInt>) -> Self {
        Self::Constant(value.into())
    }

    pub fn name(name: &str) -> Self {
        Self::Name(name.into())
    }

    pub fn power(base: Expression, exponent: Expression) -> Self {
        Self::Power(Box::new(base), Box::new(exponent))
    }

    pub fn func(name: &str, argument: Expression) -> Self {
        Self::Func(name.into(), Box::new(argument))
    }

    /// `-expression`
    pub fn negate(expression: Expression) -> Self {
        Self::Mul(vec![Self::constant(-1), expression])
    }

    /// `1 / expression`, as a factor of a surrounding product.
    pub fn reciprocal(expression: Expression) -> Self {
        Self::power(expression, Self::constant(-1))
    }

    /// Sums `summands`, without wrapping a lone summand.
    pub fn sum(mut summands: Vec<Expression>) -> Self {
        if summands.len() == 1 {
            summands.remove(0)
        } else {
            Self::Group(summands)
        }
    }

    /// Multiplies `factors`, without wrapping a lone factor.
    pub fn product(mut factors: Vec<Expression>) -> Self {
        if factors.len() == 1 {
            factors.remove(0)
        } else {
            Self::Mul(factors)
        }
    }

    /// The operand of a negation built by [`Expression::negate`].
    pub fn as_negation(&self) -> Option<&Expression> {
        match self {
            Self::Mul(factors) => match factors.as_slice() {
                [Self::Constant(c), operand] if is_minus_one(c) => Some(operand),
                _ => None,
            },
            _ => None,
        }
    }

    /// The divisor of a reciprocal built by [`Expression::reciprocal`].
    pub fn as_reciprocal(&self) -> Option<&Expression> {
        match self {
            Self::Power(base, exponent) => match exponent.as_ref() {
                Self::Constant(c) if is_minus_one(c) => Some(base.as_ref()),
                _ => None,
            },
            _ => None,
        }
    }
}

fn is_minus_one(c: &BigInt) -> bool {
    (-c).is_one()
}
