use std::collections::HashMap;

use crate::ast::Expression;
use crate::error::{Error, Result};
use crate::number::Number;

pub type Bindings = HashMap<String, Number>;

/// What a name without a binding, or a function call, evaluates to.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum Unbound {
    /// Evaluate to zero.
    #[default]
    Zero,
    /// Fail with [`Error::UnboundName`] or [`Error::UnknownFunction`].
    Error,
}

/// Evaluates `expression` with the default [`Unbound::Zero`] policy.
pub fn evaluate(expression: &Expression, bindings: &Bindings) -> Result<Number> {
    Evaluator::new(bindings).evaluate(expression)
}

pub struct Evaluator<'a> {
    bindings: &'a Bindings,
    unbound: Unbound,
}

impl<'a> Evaluator<'a> {
    pub fn new(bindings: &'a Bindings) -> Self {
        Self {
            bindings,
            unbound: Unbound::default(),
        }
    }

    pub fn with_unbound(mut self, unbound: Unbound) -> Self {
        self.unbound = unbound;
        self
    }

    pub fn evaluate(&self, expression: &Expression) -> Result<Number> {
        match expression {
            Expression::Constant(value) => Ok(Number::from(value.clone())),
            Expression::Group(summands) => summands
                .iter()
                .try_fold(Number::from(0), |sum, e| Ok(sum + self.evaluate(e)?)),
            Expression::Mul(factors) => factors
                .iter()
                .try_fold(Number::from(1), |product, e| Ok(product * self.evaluate(e)?)),
            Expression::Power(base, exponent) => {
                let base = self.evaluate(base)?;
                let exponent = self.evaluate(exponent)?;
                base.pow(exponent)
            }
            Expression::Name(name) => match self.bindings.get(name.as_str()) {
                Some(value) => Ok(value.clone()),
                None => match self.unbound {
                    Unbound::Zero => Ok(Number::zero()),
                    Unbound::Error => Err(Error::UnboundName {
                        name: name.to_string(),
                    }),
                },
            },
            // There is no function registry yet
            Expression::Func(name, _) => match self.unbound {
                Unbound::Zero => Ok(Number::zero()),
                Unbound::Error => Err(Error::UnknownFunction {
                    name: name.to_string(),
                }),
            },
        }
    }
}
