//! The symbolic value graph.
//!
//! Values, references and closures live in flat arenas and point at each
//! other by index. Aliasing is everywhere in the analyzed programs (the same
//! object reachable as `window.App` and `App`, forward declarations resolved
//! by later files), so identity is an arena id and unification is a `forward`
//! link rather than a deep rewrite.

use std::rc::Rc;

use indexmap::IndexMap;
use smallvec::SmallVec;
use tangle_ast::{Stmt, fmt_number};

use crate::vm::Vm;

/// Handle to a [`Value`] in the arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ValueId(pub u32);

/// Handle to a [`Reference`] in the arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RefId(pub u32);

/// Handle to a [`Closure`] in the arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ClosureId(pub u32);

/// Interned source key (file path or logical name).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyId(pub u32);

impl ValueId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl RefId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl ClosureId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Property maps preserve insertion order so extraction and sorting are
/// deterministic for a given input set.
pub type PropMap = IndexMap<String, RefId, ahash::RandomState>;

/// A concrete primitive carried by a value when the evaluator could actually
/// compute it.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Num(f64),
    Str(String),
    Bool(bool),
    Null,
}

/// Native callback invoked in place of a function body. `this` is the member
/// binding the callee was reached through, when there was one.
pub type NativeFn = fn(&mut Vm, Option<ValueId>, &[RefId]) -> RefId;

/// Body and captured environment of a function value.
#[derive(Clone)]
pub struct FunctionData {
    pub name: Option<String>,
    pub params: Box<[String]>,
    pub body: Rc<[Stmt]>,
    /// Captured closure chain, outermost first. Calls rebuild their scope
    /// from this, not from the caller's environment.
    pub parents: Vec<ClosureId>,
    pub native: Option<NativeFn>,
}

/// One node in the symbolic object graph.
///
/// `props` is `None` for primitives. `is_set` means some evaluated code
/// actually produced this value; placeholders conjured for reads start unset.
/// Once a placeholder is read by a file before any file defines it, it is
/// `is_required` and `required_by` names every reader.
#[derive(Clone, Default)]
pub struct Value {
    pub literal: Option<Literal>,
    pub props: Option<PropMap>,
    pub proto: Option<ValueId>,
    pub func: Option<Box<FunctionData>>,
    pub is_set: bool,
    pub is_required: bool,
    pub is_native: bool,
    /// File that created this value.
    pub origin: Option<KeyId>,
    /// Files that read this value while it was still a placeholder.
    pub required_by: SmallVec<[KeyId; 2]>,
    /// Set when this value has been unified into another; all lookups chase
    /// the chain (with path compression) before touching fields.
    pub forward: Option<ValueId>,
    /// Re-entrancy guard for unification over cyclic graphs.
    pub merging: bool,
}

impl Value {
    pub fn is_function(&self) -> bool {
        self.func.is_some()
    }

    /// Loose numeric coercion over the literal field. Objects coerce to NaN;
    /// a value with no literal and no properties is unknown.
    pub fn as_number(&self) -> Option<f64> {
        match &self.literal {
            Some(Literal::Num(n)) => Some(*n),
            Some(Literal::Str(s)) => Some(s.trim().parse::<f64>().unwrap_or(f64::NAN)),
            Some(Literal::Bool(b)) => Some(if *b { 1.0 } else { 0.0 }),
            Some(Literal::Null) => Some(0.0),
            None => {
                if self.is_set && self.props.is_some() {
                    Some(f64::NAN)
                } else {
                    None
                }
            }
        }
    }

    pub fn as_string(&self) -> Option<String> {
        match &self.literal {
            Some(Literal::Num(n)) => Some(fmt_number(*n)),
            Some(Literal::Str(s)) => Some(s.clone()),
            Some(Literal::Bool(b)) => Some(b.to_string()),
            Some(Literal::Null) => Some("null".to_string()),
            None => {
                if self.is_set && self.props.is_some() {
                    Some("[object Object]".to_string())
                } else {
                    None
                }
            }
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match &self.literal {
            Some(Literal::Num(n)) => Some(*n != 0.0 && !n.is_nan()),
            Some(Literal::Str(s)) => Some(!s.is_empty()),
            Some(Literal::Bool(b)) => Some(*b),
            Some(Literal::Null) => Some(false),
            None => {
                if self.is_set && self.props.is_some() {
                    Some(true)
                } else {
                    None
                }
            }
        }
    }
}

/// A deferred call captured at a site whose callee was still a placeholder.
/// Replayed once the callee unifies with a real function.
#[derive(Clone)]
pub struct PendingCall {
    pub kind: CallKind,
    pub args: Vec<RefId>,
    pub binding: Option<ValueId>,
    /// Placeholder handed out at the call site; the replayed call's return
    /// value is unified into it so assignments of the result resolve.
    pub result: RefId,
    pub origin: Option<KeyId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallKind {
    Plain,
    New,
}

/// A mutable slot holding a value: a variable binding or an object property.
///
/// `is_set` here means the slot was explicitly assigned (as opposed to being
/// materialized for a read); `origin` is the last file that assigned it.
#[derive(Clone)]
pub struct Reference {
    pub value: ValueId,
    pub is_set: bool,
    pub origin: Option<KeyId>,
    /// Base object of the member access this reference was last reached
    /// through; becomes `this` when the slot is called.
    pub binding: Option<ValueId>,
    pub pending: Vec<PendingCall>,
}

impl Reference {
    pub fn new(value: ValueId, is_set: bool) -> Reference {
        Reference {
            value,
            is_set,
            origin: None,
            binding: None,
            pending: Vec::new(),
        }
    }
}

/// A call scope: `this`, a locals bag, and the captured lexical chain.
pub struct Closure {
    pub this_val: ValueId,
    /// Object whose properties are the local bindings. For the global
    /// closure this is the global object itself.
    pub locals: ValueId,
    /// Enclosing closures, outermost first.
    pub parents: Vec<ClosureId>,
    /// Function value being executed, if any.
    pub func: Option<ValueId>,
    /// Reference captured by `return` statements.
    pub ret: RefId,
}
