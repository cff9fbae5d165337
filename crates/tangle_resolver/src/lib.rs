//! tangle_resolver: load-order resolution for browser-style JavaScript.
//!
//! Files are added one at a time; each is symbolically evaluated against a
//! shared global object (see `tangle_eval`), and the resolver keeps a record
//! of the namespace paths it exports and requires. `resolve` orders every
//! added file so definitions precede uses; `resolve_only` orders the minimal
//! set of files behind a handful of requested exports.

mod errors;
mod resolver;
mod sort;

pub use errors::ResolveError;
pub use resolver::{Resolver, ResolverOptions, SourceInput};
pub use tangle_eval::Facts;
