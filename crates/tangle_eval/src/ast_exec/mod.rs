//! The abstract AST walker.
//!
//! Every path through a body is taken exactly once: both arms of an `if`,
//! loop bodies a single time, every `case` of a `switch`. Calls to functions
//! already on the stack return undefined. The goal is coverage of every
//! namespace touch, not faithful execution.

mod expr;
mod stmt;
