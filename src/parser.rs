use num_bigint::BigInt;

use crate::ast::{Expression, Name};
use crate::error::{Error, Result};
use crate::lexer::tokenize;
use crate::token::{Operator, Span, Token, TokenKind};

/// Limit on nested groups, unary minuses and chained exponents. Parsing,
/// evaluation and printing all recurse over the tree.
const MAX_DEPTH: usize = 256;

/// Parses `source` into a single expression tree.
pub fn parse(source: &str) -> Result<Expression> {
    Parser::new(source)?.parse()
}

pub struct Parser<'source> {
    source: &'source str,
    tokens: Vec<Token<'source>>,
    index: usize,
    depth: usize,
}

impl<'source> Parser<'source> {
    /// Tokenizes `source` and wraps it in an implicit pair of parentheses.
    pub fn new(source: &'source str) -> Result<Self> {
        let end = source.len();
        let mut tokens = vec![Token {
            kind: TokenKind::OpenParen,
            span: Span::new(0, 0),
        }];
        tokens.extend(tokenize(source)?);
        tokens.push(Token {
            kind: TokenKind::CloseParen,
            span: Span::new(end, end),
        });

        Ok(Self {
            source,
            tokens,
            index: 0,
            depth: 0,
        })
    }

    pub fn parse(&mut self) -> Result<Expression> {
        let result = self.read_group()?;

        // Ensure we've consumed all tokens. If not, a ')' in the input closed
        // the implicit outer group.
        if !self.at_end() {
            let span = self.tokens[self.index - 1].span;
            return Err(Error::syntax("unmatched ')'", span));
        }

        Ok(result)
    }

    fn peek(&self) -> Option<&TokenKind<'source>> {
        self.tokens.get(self.index).map(|token| &token.kind)
    }

    fn advance(&mut self) -> Option<&Token<'source>> {
        let token = self.tokens.get(self.index)?;
        self.index += 1;
        Some(token)
    }

    fn at_end(&self) -> bool {
        self.index >= self.tokens.len()
    }

    /// Span of the next token, or an empty span at the end of the input.
    fn current_span(&self) -> Span {
        match self.tokens.get(self.index) {
            Some(token) => token.span,
            None => Span::new(self.source.len(), self.source.len()),
        }
    }

    /// Runs `read` one nesting level deeper, failing at `span` past the limit.
    fn nested<T>(&mut self, span: Span, read: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= MAX_DEPTH {
            return Err(Error::syntax("expression nested too deeply", span));
        }

        self.depth += 1;
        let result = read(self);
        self.depth -= 1;
        result
    }

    fn read_group(&mut self) -> Result<Expression> {
        let open = self.current_span();
        self.nested(open, |parser| parser.read_group_body(open))
    }

    fn read_group_body(&mut self, open: Span) -> Result<Expression> {
        match self.advance() {
            Some(Token {
                kind: TokenKind::OpenParen,
                ..
            }) => {}
            _ => return Err(Error::syntax("expected '('", open)),
        }

        let mut chunks = Vec::new();
        loop {
            match self.peek() {
                None => return Err(Error::syntax("expected ')'", self.current_span())),
                Some(TokenKind::CloseParen) => {
                    self.advance();
                    break;
                }
                Some(TokenKind::Operator(Operator::Plus)) => {
                    self.advance();
                    chunks.push(self.read_chunk()?);
                }
                Some(TokenKind::Operator(Operator::Minus)) => {
                    self.advance();
                    let chunk = self.read_chunk()?;
                    chunks.push(Expression::negate(chunk));
                }
                Some(_) => chunks.push(self.read_chunk()?),
            }
        }

        if chunks.is_empty() {
            let close = self.tokens[self.index - 1].span;
            return Err(Error::syntax(
                "expected an expression",
                Span::new(open.start, close.end),
            ));
        }

        Ok(Expression::sum(chunks))
    }

    fn read_chunk(&mut self) -> Result<Expression> {
        let mut factors = Vec::new();

        loop {
            let span = self.current_span();
            let op = match self.peek() {
                None | Some(TokenKind::CloseParen) => break,
                Some(TokenKind::Operator(op)) => Some(*op),
                Some(_) => None,
            };

            match op {
                Some(Operator::Plus | Operator::Minus) if !factors.is_empty() => break,
                Some(Operator::Caret) => {
                    self.advance();
                    let base = factors
                        .pop()
                        .ok_or_else(|| Error::syntax("'^' has no base", span))?;
                    if exponent_chain(&base) >= MAX_DEPTH {
                        return Err(Error::syntax("expression nested too deeply", span));
                    }
                    let exponent = self.read_unit()?;
                    factors.push(Expression::power(base, exponent));
                }
                Some(op @ (Operator::Slash | Operator::Star)) => {
                    if factors.is_empty() {
                        return Err(Error::syntax(format!("'{op}' has no left operand"), span));
                    }
                    self.advance();
                    let operand = self.read_unit()?;
                    factors.push(match op {
                        Operator::Slash => Expression::reciprocal(operand),
                        _ => operand,
                    });
                }
                // Implicit multiplication, or the first factor of the chunk.
                // Only here is a name followed by a group a call.
                _ => {
                    let factor = match self.read_unit()? {
                        Expression::Name(name)
                            if matches!(self.peek(), Some(TokenKind::OpenParen)) =>
                        {
                            Expression::Func(name, Box::new(self.read_group()?))
                        }
                        unit => unit,
                    };
                    factors.push(factor);
                }
            }
        }

        if factors.is_empty() {
            return Err(Error::syntax("expected an expression", self.current_span()));
        }

        Ok(Expression::product(factors))
    }

    fn read_unit(&mut self) -> Result<Expression> {
        let span = self.current_span();
        let kind = match self.peek() {
            Some(kind) => kind.clone(),
            None => {
                return Err(Error::syntax(
                    "unexpected end of input, expected an expression",
                    span,
                ))
            }
        };

        match kind {
            TokenKind::OpenParen => self.read_group(),
            TokenKind::Number(value) => {
                self.advance();
                Ok(Expression::Constant(BigInt::from(value)))
            }
            TokenKind::Name(name) => {
                self.advance();
                Ok(Expression::Name(Name(name.to_string())))
            }
            TokenKind::Operator(Operator::Minus) => self.nested(span, |parser| {
                parser.advance();
                Ok(Expression::negate(parser.read_unit()?))
            }),
            // Only the implicit closing parenthesis has an empty span
            TokenKind::CloseParen if span.start == span.end => {
                Err(Error::syntax(
                    "unexpected end of input, expected an expression",
                    span,
                ))
            }
            kind => Err(Error::syntax(
                format!("expected an expression, found {}", kind.describe()),
                span,
            )),
        }
    }
}

/// Number of `^` applied along the left spine of `expression`.
fn exponent_chain(mut expression: &Expression) -> usize {
    let mut count = 0;
    while let Expression::Power(base, _) = expression {
        count += 1;
        expression = base.as_ref();
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(value: i64) -> Expression {
        Expression::constant(value)
    }

    fn n(name: &str) -> Expression {
        Expression::name(name)
    }

    fn syntax_error_at(input: &str) -> usize {
        match parse(input) {
            Err(Error::Syntax { position, .. }) => position,
            other => panic!("expected a syntax error for '{input}', got {other:?}"),
        }
    }

    #[test]
    fn single_units_are_not_wrapped() {
        assert_eq!(parse("2").unwrap(), c(2));
        assert_eq!(parse("(2)").unwrap(), c(2));
        assert_eq!(parse("((x))").unwrap(), n("x"));
        assert_eq!(parse("(2)").unwrap(), parse("2").unwrap());
    }

    #[test]
    fn addition_and_subtraction() {
        assert_eq!(parse("2+3").unwrap(), Expression::Group(vec![c(2), c(3)]));
        assert_eq!(
            parse("a - b + c").unwrap(),
            Expression::Group(vec![n("a"), Expression::negate(n("b")), n("c")])
        );
        assert_eq!(parse("-x").unwrap(), Expression::negate(n("x")));
        assert_eq!(parse("+x").unwrap(), n("x"));
    }

    #[test]
    fn negation_covers_the_whole_chunk() {
        assert_eq!(
            parse("-2x").unwrap(),
            Expression::negate(Expression::Mul(vec![c(2), n("x")]))
        );
        assert_eq!(
            parse("1 - 2x").unwrap(),
            Expression::Group(vec![
                c(1),
                Expression::negate(Expression::Mul(vec![c(2), n("x")]))
            ])
        );
    }

    #[test]
    fn unary_minus_inside_a_chunk() {
        assert_eq!(
            parse("2*-3").unwrap(),
            Expression::Mul(vec![c(2), Expression::negate(c(3))])
        );
        assert_eq!(
            parse("2^-x").unwrap(),
            Expression::power(c(2), Expression::negate(n("x")))
        );
        assert_eq!(
            parse("1 + -3").unwrap(),
            Expression::Group(vec![c(1), Expression::negate(c(3))])
        );
        assert_eq!(
            parse("1 - -3").unwrap(),
            Expression::Group(vec![
                c(1),
                Expression::negate(Expression::negate(c(3)))
            ])
        );
    }

    #[test]
    fn multiplication_and_division() {
        assert_eq!(parse("2*3").unwrap(), Expression::Mul(vec![c(2), c(3)]));
        assert_eq!(parse("2x").unwrap(), Expression::Mul(vec![c(2), n("x")]));
        assert_eq!(parse("2 3").unwrap(), parse("2*3").unwrap());
        assert_eq!(
            parse("10/2/5").unwrap(),
            Expression::Mul(vec![
                c(10),
                Expression::reciprocal(c(2)),
                Expression::reciprocal(c(5))
            ])
        );
        assert_eq!(
            parse("x(y+1)").unwrap_or_else(|e| panic!("{e}")),
            Expression::func("x", Expression::Group(vec![n("y"), c(1)]))
        );
        assert_eq!(
            parse("2(y+1)").unwrap(),
            Expression::Mul(vec![c(2), Expression::Group(vec![n("y"), c(1)])])
        );
    }

    #[test]
    fn exponent_binds_tighter_than_multiplication() {
        assert_eq!(
            parse("2*3^2").unwrap(),
            Expression::Mul(vec![c(2), Expression::power(c(3), c(2))])
        );
        assert_eq!(
            parse("2x^2").unwrap(),
            Expression::Mul(vec![c(2), Expression::power(n("x"), c(2))])
        );
        assert_eq!(
            parse("1/x^2").unwrap(),
            Expression::Mul(vec![
                c(1),
                Expression::power(Expression::reciprocal(n("x")), c(2))
            ])
        );
    }

    #[test]
    fn exponents_reassociate_to_the_left() {
        assert_eq!(
            parse("2^3^2").unwrap(),
            Expression::power(Expression::power(c(2), c(3)), c(2))
        );
        assert_eq!(
            parse("2^(3^2)").unwrap(),
            Expression::power(c(2), Expression::power(c(3), c(2)))
        );
    }

    #[test]
    fn parentheses_override_precedence() {
        assert_eq!(
            parse("(2+3)*2").unwrap(),
            Expression::Mul(vec![Expression::Group(vec![c(2), c(3)]), c(2)])
        );
        assert_eq!(
            parse("-(a+b)").unwrap(),
            Expression::negate(Expression::Group(vec![n("a"), n("b")]))
        );
    }

    #[test]
    fn function_calls() {
        assert_eq!(
            parse("sin(x)").unwrap(),
            Expression::func("sin", n("x"))
        );
        assert_eq!(
            parse("2sin(x+1)").unwrap(),
            Expression::Mul(vec![
                c(2),
                Expression::func("sin", Expression::Group(vec![n("x"), c(1)]))
            ])
        );
        assert_eq!(
            parse("f(x)^2").unwrap(),
            Expression::power(Expression::func("f", n("x")), c(2))
        );

        // After an explicit operator the name is a plain factor
        assert_eq!(
            parse("2*f(x)").unwrap(),
            Expression::Mul(vec![c(2), n("f"), n("x")])
        );
        assert_eq!(
            parse("2^f(x)").unwrap(),
            Expression::Mul(vec![Expression::power(c(2), n("f")), n("x")])
        );
        assert_eq!(
            parse("1/f(x)").unwrap(),
            Expression::Mul(vec![c(1), Expression::reciprocal(n("f")), n("x")])
        );
        assert_eq!(
            parse("2*-f(x)").unwrap(),
            Expression::Mul(vec![c(2), Expression::negate(n("f")), n("x")])
        );
        assert_eq!(
            parse("2^(f(x))").unwrap(),
            Expression::power(c(2), Expression::func("f", n("x")))
        );
        assert_eq!(
            parse("-f(x)").unwrap(),
            Expression::negate(Expression::func("f", n("x")))
        );
        assert_eq!(
            parse("f (x) y").unwrap(),
            Expression::Mul(vec![Expression::func("f", n("x")), n("y")])
        );
    }

    #[test]
    fn large_literals() {
        let digits = "123456789012345678901234567890";
        assert_eq!(
            parse(digits).unwrap(),
            Expression::Constant(digits.parse().unwrap())
        );
    }

    #[test]
    fn unmatched_parentheses() {
        assert_eq!(syntax_error_at("(1+2"), 4);
        assert_eq!(syntax_error_at("1+2)"), 3);
        assert_eq!(syntax_error_at("(1))+(2"), 3);
        assert_eq!(syntax_error_at(")"), 0);
        assert_eq!(syntax_error_at("sin(x"), 5);
    }

    #[test]
    fn missing_operands() {
        assert_eq!(syntax_error_at("^2"), 0);
        assert_eq!(syntax_error_at("2^"), 2);
        assert_eq!(syntax_error_at("/2"), 0);
        assert_eq!(syntax_error_at("*2"), 0);
        assert_eq!(syntax_error_at("2*"), 2);
        assert_eq!(syntax_error_at("2+"), 2);
        assert_eq!(syntax_error_at("2 + + 3"), 4);
        assert_eq!(syntax_error_at("(2+)"), 3);
        assert_eq!(syntax_error_at("2*(+)"), 4);
        assert_eq!(syntax_error_at("2^*3"), 2);
    }

    #[test]
    fn empty_input() {
        assert_eq!(syntax_error_at(""), 0);
        assert_eq!(syntax_error_at("   "), 0);
        assert_eq!(syntax_error_at("()"), 0);
        assert_eq!(syntax_error_at("2 ()"), 2);
    }

    fn nested_too_deeply(input: &str) -> bool {
        matches!(
            parse(input),
            Err(Error::Syntax { reason, .. }) if reason == "expression nested too deeply"
        )
    }

    #[test]
    fn nesting_depth_is_limited() {
        let deep = format!("{}1{}", "(".repeat(600), ")".repeat(600));
        assert!(nested_too_deeply(&deep));
        assert!(nested_too_deeply(&format!("{}1", "-".repeat(600))));
        assert!(nested_too_deeply(&format!("2{}", "^2".repeat(600))));
        assert!(nested_too_deeply(&format!("{}1", "2^(".repeat(600))));

        // The error points at the first token past the limit
        assert_eq!(syntax_error_at(&deep), MAX_DEPTH - 1);

        let shallow = format!("{}1{}", "(1+".repeat(200), ")".repeat(200));
        assert!(parse(&shallow).is_ok());
        assert_eq!(
            parse(&format!("{}1{}", "(".repeat(200), ")".repeat(200))).unwrap(),
            c(1)
        );
        assert!(parse(&format!("2{}", "^2".repeat(200))).is_ok());
    }

    #[test]
    fn invalid_characters_are_reported_first() {
        assert!(matches!(
            parse("1@2"),
            Err(Error::InvalidCharacter {
                character: '@',
                position: 1,
                ..
            })
        ));
        assert!(matches!(
            parse("f(1, 2)"),
            Err(Error::InvalidCharacter { character: ',', .. })
        ));
    }
}
