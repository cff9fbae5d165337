//! ES5 syntax tree consumed by the parser and the symbolic evaluator.
mod ast;

pub use ast::*;
