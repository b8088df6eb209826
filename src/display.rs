use std::fmt::{self, Display, Formatter, Write};

use num_traits::Signed;

use crate::ast::{Expression, Name};

impl Display for Name {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Prints the expression in a form that parses back to the same tree.
impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_sum(f, self)
    }
}

fn write_sum(f: &mut Formatter<'_>, expression: &Expression) -> fmt::Result {
    let summands = match expression {
        Expression::Group(summands) => summands.as_slice(),
        other => std::slice::from_ref(other),
    };

    for (i, summand) in summands.iter().enumerate() {
        match summand.as_negation() {
            Some(operand) => {
                f.write_str(if i == 0 { "-" } else { " - " })?;
                write_chunk(f, operand)?;
            }
            None => {
                if i > 0 {
                    f.write_str(" + ")?;
                }
                write_chunk(f, summand)?;
            }
        }
    }

    Ok(())
}

fn write_chunk(f: &mut Formatter<'_>, expression: &Expression) -> fmt::Result {
    let factors = match expression {
        Expression::Mul(factors) if expression.as_negation().is_none() => factors,
        other => return write_factor(f, other, false),
    };

    for (i, factor) in factors.iter().enumerate() {
        write_factor(f, factor, i > 0)?;
    }

    Ok(())
}

/// Writes a factor of a product, preceded by `*` or `/` unless it is the
/// first one. `^` takes its base from the factor before it, so `a^b^c` is the
/// left-nested `(a^b)^c` and `1/x^2` raises the reciprocal of `x`.
fn write_factor(f: &mut Formatter<'_>, expression: &Expression, follows: bool) -> fmt::Result {
    let mut exponents = Vec::new();
    let mut base = expression;
    loop {
        if follows {
            if let Some(divisor) = base.as_reciprocal() {
                f.write_char('/')?;
                write_unit(f, divisor)?;
                break;
            }
        }

        match base {
            Expression::Power(inner, exponent) => {
                exponents.push(exponent);
                base = inner.as_ref();
            }
            other => {
                if follows {
                    f.write_char('*')?;
                }
                match other {
                    // A call is only read back as the leading factor of a chunk
                    Expression::Func(name, argument) if !follows => {
                        write!(f, "{name}(")?;
                        write_sum(f, argument)?;
                        f.write_char(')')?;
                    }
                    other => write_unit(f, other)?,
                }
                break;
            }
        }
    }

    for exponent in exponents.into_iter().rev() {
        f.write_char('^')?;
        write_unit(f, exponent)?;
    }

    Ok(())
}

fn write_unit(f: &mut Formatter<'_>, expression: &Expression) -> fmt::Result {
    match expression {
        Expression::Constant(value) if value.is_negative() => write!(f, "(-{})", value.abs()),
        Expression::Constant(value) => write!(f, "{value}"),
        Expression::Name(name) => write!(f, "{name}"),
        other => {
            f.write_char('(')?;
            write_sum(f, other)?;
            f.write_char(')')
        }
    }
}
