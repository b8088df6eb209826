pub mod ast;
mod display;
pub mod error;
pub mod eval;
mod helpers;
pub mod lexer;
pub mod number;
pub mod parser;
pub mod token;

pub use ast::{Expression, Name};
pub use error::{Error, Result};
pub use eval::{evaluate, Bindings, Evaluator, Unbound};
pub use lexer::tokenize;
pub use number::Number;
pub use parser::parse;
