//! tangle_lexer: JavaScript tokenizer.
//!
//! Tokenizes an ES5 subset and collects diagnostics.
//! Entry point: `Lexer::new(input).lex()`.
mod keywords;
mod lexer;

pub use lexer::{LexResult, Lexer};
