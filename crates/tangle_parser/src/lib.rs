//! tangle_parser: recursive-descent parser for the ES5 subset.
//!
//! Entry point: `Parser::new(input, &tokens).parse()`.
mod expr;
mod parser;
mod stmt;

pub use parser::{ParseResult, Parser};
pub use tangle_ast::*;
