use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use crate::token::Span;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Diagnostic, Error)]
pub enum Error {
    #[error("invalid character '{character}' at position {position}")]
    #[diagnostic(code = "invalid_character")]
    InvalidCharacter {
        character: char,
        position: usize,
        #[label("this character")]
        span: SourceSpan,
    },

    #[error("syntax error: {reason}")]
    #[diagnostic(code = "syntax_error")]
    Syntax {
        reason: String,
        position: usize,
        #[label("here")]
        span: SourceSpan,
    },

    #[error("arithmetic error: {reason}")]
    #[diagnostic(code = "arithmetic_error")]
    Arithmetic { reason: String },

    #[error("unbound name '{name}'")]
    #[diagnostic(
        code = "unbound_name",
        help("bind it with --let NAME=VALUE, or drop --strict to treat it as zero")
    )]
    UnboundName { name: String },

    #[error("unknown function '{name}'")]
    #[diagnostic(code = "unknown_function")]
    UnknownFunction { name: String },
}

impl Error {
    pub(crate) fn syntax(reason: impl Into<String>, span: Span) -> Self {
        Self::Syntax {
            reason: reason.into(),
            position: span.start,
            span: span.into(),
        }
    }

    pub(crate) fn arithmetic(reason: impl Into<String>) -> Self {
        Self::Arithmetic {
            reason: reason.into(),
        }
    }
}
