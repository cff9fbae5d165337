//! Symbolic evaluation of JavaScript sources.
//!
//! Nothing here runs a program for real. Sources are interpreted against a
//! graph of placeholder values hanging off one persistent global object, and
//! the interesting output is the set of global namespace paths each source
//! defines or reads before they are defined.

pub mod core;
pub mod extract;
pub mod log;
pub mod vm;

mod ast_exec;
mod hoist;

pub use crate::core::arena::Arena;
pub use crate::core::value::{
    CallKind, Closure, ClosureId, FunctionData, KeyId, Literal, NativeFn, PendingCall, PropMap,
    RefId, Reference, Value, ValueId,
};
pub use extract::{Facts, extract};
pub use log::{LOG_DEBUG, LOG_INFO, LOG_WARN, Logger};
pub use vm::Vm;
