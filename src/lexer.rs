use num_bigint::BigUint;

use crate::error::{Error, Result};
use crate::token::{Operator, Span, Token, TokenKind};

pub struct Lexer<'source> {
    source: &'source str,
    rest: &'source str,
    position: usize,
    peeked: Option<Token<'source>>,
}

impl<'source> Lexer<'source> {
    pub fn new(source: &'source str) -> Self {
        Self {
            source,
            rest: source,
            position: 0,
            peeked: None,
        }
    }
}

/// Splits `source` into tokens, stopping at the first invalid character.
pub fn tokenize(source: &str) -> Result<Vec<Token<'_>>> {
    Lexer::new(source).collect()
}

macro_rules! token {
    ($kind:expr, $start:ident, $self:ident) => {
        return Some(Ok(Token {
            kind: $kind,
            span: Span {
                start: $start,
                end: $self.position,
            },
        }))
    };
}

impl<'source> Iterator for Lexer<'source> {
    type Item = Result<Token<'source>>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(peeked) = self.peeked.take() {
            return Some(Ok(peeked));
        }

        loop {
            let mut chars = self.rest.chars();
            let c = chars.next()?;
            let c_start = self.position;

            self.rest = chars.as_str();
            self.position += c.len_utf8();

            if c.is_whitespace() {
                continue;
            }

            match c {
                '(' => token!(TokenKind::OpenParen, c_start, self),
                ')' => token!(TokenKind::CloseParen, c_start, self),
                '0'..='9' => return Some(Ok(self.parse_number(c_start))),
                c if c.is_alphabetic() => return Some(Ok(self.parse_name(c_start))),
                c => match Operator::from_char(c) {
                    Some(op) => token!(TokenKind::Operator(op), c_start, self),
                    None => {
                        return Some(Err(Error::InvalidCharacter {
                            character: c,
                            position: c_start,
                            span: (c_start, c.len_utf8()).into(),
                        }))
                    }
                },
            }
        }
    }
}

impl<'source> Lexer<'source> {
    pub fn peek(&mut self) -> Result<Option<&Token<'source>>> {
        if self.peeked.is_none() {
            self.peeked = self.next().transpose()?;
        }

        Ok(self.peeked.as_ref())
    }

    /// Eats the longest prefix of `rest` whose characters satisfy `accept`.
    fn eat_while(&mut self, accept: impl Fn(char) -> bool) {
        let len = self
            .rest
            .find(|c: char| !accept(c))
            .unwrap_or(self.rest.len());
        self.position += len;
        self.rest = &self.rest[len..];
    }

    fn parse_name(&mut self, start: usize) -> Token<'source> {
        self.eat_while(|c| c.is_alphabetic() || c.is_ascii_digit());

        Token {
            kind: TokenKind::Name(&self.source[start..self.position]),
            span: Span::new(start, self.position),
        }
    }

    fn parse_number(&mut self, start: usize) -> Token<'source> {
        self.eat_while(|c| c.is_ascii_digit());

        let value = self.source[start..self.position]
            .bytes()
            .fold(BigUint::default(), |value, digit| {
                value * 10u8 + (digit - b'0')
            });

        Token {
            kind: TokenKind::Number(value),
            span: Span::new(start, self.position),
        }
    }
}
