//! Shared syntax primitives for the Tangle frontend.
//!
//! Spans, source text with line/column lookup, JavaScript tokens, and the
//! diagnostic type shared by the lexer, parser, and resolver.
mod diagnostic;
mod source;
mod span;
mod token;
mod util;

pub use diagnostic::{Diagnostic, Severity};
pub use source::SourceText;
pub use span::{ByteIndex, Span};
pub use token::{Token, TokenKind};
pub use util::{is_ident_continue, is_ident_start};
