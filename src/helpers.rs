use std::fmt;

use crate::token::{Operator, TokenKind};

impl Operator {
    pub(crate) fn from_char(c: char) -> Option<Self> {
        Some(match c {
            '+' => Self::Plus,
            '-' => Self::Minus,
            '*' => Self::Star,
            '/' => Self::Slash,
            '^' => Self::Caret,

            _ => return None,
        })
    }

    pub fn as_char(self) -> char {
        match self {
            Self::Plus => '+',
            Self::Minus => '-',
            Self::Star => '*',
            Self::Slash => '/',
            Self::Caret => '^',
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl<'source> TokenKind<'source> {
    pub(crate) fn describe(&self) -> String {
        match self {
            TokenKind::Operator(op) => format!("'{op}'"),
            TokenKind::OpenParen => "'('".to_string(),
            TokenKind::CloseParen => "')'".to_string(),
            TokenKind::Name(name) => format!("name '{name}'"),
            TokenKind::Number(n) => format!("number {n}"),
        }
    }
}
