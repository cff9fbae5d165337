//! The evaluation context: one arena, one persistent global object, and the
//! machinery both the statement walker and the resolver share.

use std::rc::Rc;

use hashbrown::HashMap;
use smallvec::SmallVec;
use tangle_ast::{Function, Program};

use crate::core::arena::Arena;
use crate::core::value::{
    CallKind, Closure, ClosureId, FunctionData, KeyId, Literal, NativeFn, PropMap, RefId,
    Reference, Value, ValueId,
};
use crate::log::Logger;

/// Global names seeded as opaque native hosts. Reads under them never become
/// requires; writes under them are still exports.
const NATIVE_ROOTS: &[&str] = &[
    "Object", "Function", "Array", "String", "Number", "Boolean", "Math", "JSON", "Date",
    "RegExp", "Error", "console",
];

pub struct Vm {
    pub arena: Arena,
    pub global: ValueId,
    pub global_closure: ClosureId,
    /// Prototype given to every function value; hosts native `call`/`apply`.
    function_proto: ValueId,
    /// Key of the file currently being evaluated. Placeholder reads and slot
    /// assignments are attributed to it.
    pub current_origin: Option<KeyId>,
    /// References that accumulated deferred calls.
    pub pending_refs: Vec<RefId>,
    keys: Vec<String>,
    key_ids: HashMap<String, KeyId>,
    /// Function values currently on the call stack; re-entry is cut off.
    call_stack: Vec<ValueId>,
    native_mode: bool,
    pub log: Logger,
}

impl Vm {
    /// `global_aliases` are extra global names bound to the global object
    /// itself (hosts usually pass at least `window`).
    pub fn new(global_aliases: &[String], log: Logger) -> Vm {
        let mut vm = Vm {
            arena: Arena::new(),
            global: ValueId(0),
            global_closure: ClosureId(0),
            function_proto: ValueId(0),
            current_origin: None,
            pending_refs: Vec::new(),
            keys: Vec::new(),
            key_ids: HashMap::new(),
            call_stack: Vec::new(),
            native_mode: true,
            log,
        };
        vm.global = vm.new_object();
        let ret = vm.undef_ref();
        vm.global_closure = vm.arena.alloc_closure(Closure {
            this_val: vm.global,
            locals: vm.global,
            parents: Vec::new(),
            func: None,
            ret,
        });
        vm.seed_globals(global_aliases);
        vm.native_mode = false;
        vm
    }

    fn seed_globals(&mut self, aliases: &[String]) {
        for alias in aliases {
            let r = self.new_ref(self.global, true);
            self.arena.set_property(self.global, alias, r);
        }

        self.function_proto = self.new_object();
        let call = self.new_native_fn("call", native_function_call);
        let call_ref = self.new_ref(call, true);
        self.arena.set_property(self.function_proto, "call", call_ref);
        let apply = self.new_native_fn("apply", native_function_apply);
        let apply_ref = self.new_ref(apply, true);
        self.arena
            .set_property(self.function_proto, "apply", apply_ref);

        for name in NATIVE_ROOTS {
            let v = self.new_object();
            let r = self.new_ref(v, true);
            self.arena.set_property(self.global, name, r);
            match *name {
                "Object" => {
                    let create = self.new_native_fn("create", native_object_create);
                    let cr = self.new_ref(create, true);
                    self.arena.set_property(v, "create", cr);
                }
                "Function" => {
                    let pr = self.new_ref(self.function_proto, true);
                    self.arena.set_property(v, "prototype", pr);
                }
                _ => {}
            }
        }
    }

    // --- keys ---

    pub fn intern_key(&mut self, key: &str) -> KeyId {
        if let Some(&id) = self.key_ids.get(key) {
            return id;
        }
        let id = KeyId(self.keys.len() as u32);
        self.keys.push(key.to_string());
        self.key_ids.insert(key.to_string(), id);
        id
    }

    pub fn key_name(&self, id: KeyId) -> &str {
        &self.keys[id.0 as usize]
    }

    // --- value constructors ---

    pub fn new_object(&mut self) -> ValueId {
        let mut v = Value::default();
        v.props = Some(PropMap::default());
        v.is_set = true;
        v.is_native = self.native_mode;
        v.origin = self.current_origin;
        self.arena.alloc_value(v)
    }

    pub fn new_literal(&mut self, lit: Literal) -> ValueId {
        let mut v = Value::default();
        v.literal = Some(lit);
        v.is_set = true;
        v.origin = self.current_origin;
        self.arena.alloc_value(v)
    }

    /// A literal carried by a value that nothing actually assigned, used for
    /// the results of comparisons: coercible but never exported.
    pub fn new_unset_literal(&mut self, lit: Literal) -> ValueId {
        let mut v = Value::default();
        v.literal = Some(lit);
        v.origin = self.current_origin;
        self.arena.alloc_value(v)
    }

    /// An assigned value whose shape is unknown (arithmetic over unresolved
    /// operands, for-in keys).
    pub fn new_unknown(&mut self) -> ValueId {
        let mut v = Value::default();
        v.is_set = true;
        v.origin = self.current_origin;
        self.arena.alloc_value(v)
    }

    /// An undefined placeholder: an object-shaped value nothing has set.
    /// Member reads on it still work by conjuring further placeholders.
    pub fn new_undefined(&mut self) -> ValueId {
        let mut v = Value::default();
        v.props = Some(PropMap::default());
        v.origin = self.current_origin;
        self.arena.alloc_value(v)
    }

    fn new_native_fn(&mut self, name: &str, f: NativeFn) -> ValueId {
        let mut v = Value::default();
        v.props = Some(PropMap::default());
        v.is_set = true;
        v.is_native = true;
        v.func = Some(Box::new(FunctionData {
            name: Some(name.to_string()),
            params: Box::new([]),
            body: Rc::from(Vec::new()),
            parents: Vec::new(),
            native: Some(f),
        }));
        self.arena.alloc_value(v)
    }

    /// Build a function value capturing the defining closure chain. Every
    /// function gets a fresh `prototype` object attributed to the current
    /// file.
    pub fn create_function(&mut self, clo: ClosureId, f: &Function) -> ValueId {
        let mut parents = self.arena.closure(clo).parents.clone();
        parents.push(clo);
        let mut v = Value::default();
        v.props = Some(PropMap::default());
        v.proto = Some(self.function_proto);
        v.is_set = true;
        v.is_native = self.native_mode;
        v.origin = self.current_origin;
        v.func = Some(Box::new(FunctionData {
            name: f.name.clone(),
            params: f.params.clone(),
            body: f.body.clone(),
            parents,
            native: None,
        }));
        let func = self.arena.alloc_value(v);
        let proto_obj = self.new_object();
        let mut pr = Reference::new(proto_obj, true);
        pr.origin = self.current_origin;
        let pr = self.arena.alloc_ref(pr);
        self.arena.set_property(func, "prototype", pr);
        func
    }

    pub fn new_ref(&mut self, value: ValueId, is_set: bool) -> RefId {
        self.arena.alloc_ref(Reference::new(value, is_set))
    }

    pub fn undef_ref(&mut self) -> RefId {
        let v = self.new_undefined();
        self.new_ref(v, false)
    }

    /// Record that the current file depends on this value.
    ///
    /// Reads of natives and of values the current file itself defined are
    /// not dependencies. Everything else is: placeholders get their
    /// `is_required` flag, and `required_by` remembers the reader even for
    /// values that are already set, so the recorded facts do not depend on
    /// the order files were added in.
    pub fn require(&mut self, v: ValueId) {
        let v = self.arena.resolve(v);
        let val = self.arena.value_mut(v);
        if val.is_native {
            return;
        }
        let Some(k) = self.current_origin else {
            if !val.is_set {
                val.is_required = true;
            }
            return;
        };
        if val.is_set {
            if val.origin == Some(k) {
                return;
            }
        } else {
            val.is_required = true;
        }
        if !val.required_by.contains(&k) {
            val.required_by.push(k);
        }
    }

    pub fn require_ref(&mut self, r: RefId) {
        let v = self.arena.ref_value(r);
        self.require(v);
    }

    // --- closures ---

    pub fn new_closure(
        &mut self,
        parents: Vec<ClosureId>,
        this_val: ValueId,
        func: Option<ValueId>,
    ) -> ClosureId {
        let locals = {
            // Locals bags are plain objects but never attributed to a file;
            // they are unreachable from the global graph.
            let mut v = Value::default();
            v.props = Some(PropMap::default());
            v.is_set = true;
            self.arena.alloc_value(v)
        };
        let ret = self.undef_ref();
        self.arena.alloc_closure(Closure {
            this_val,
            locals,
            parents,
            func,
            ret,
        })
    }

    /// Resolve a name against the closure's own locals, then the captured
    /// chain from innermost to outermost. The global object is the locals
    /// bag of the global closure, so global variables fall out of this too.
    pub fn lookup(&mut self, clo: ClosureId, name: &str) -> Option<RefId> {
        let locals = self.arena.closure(clo).locals;
        if let Some(r) = self.arena.own_property(locals, name) {
            return Some(r);
        }
        let parents = self.arena.closure(clo).parents.clone();
        for &p in parents.iter().rev() {
            let locals = self.arena.closure(p).locals;
            if let Some(r) = self.arena.own_property(locals, name) {
                return Some(r);
            }
        }
        None
    }

    pub fn declare(&mut self, clo: ClosureId, name: &str, r: RefId) {
        let locals = self.arena.closure(clo).locals;
        self.arena.set_property(locals, name, r);
    }

    // --- program entry ---

    /// Hoist and evaluate a program body in the global closure.
    pub fn eval_program(&mut self, program: &Program) {
        let clo = self.global_closure;
        crate::hoist::hoist(self, clo, &program.body);
        for stmt in program.body.iter() {
            self.eval_stmt(clo, stmt);
        }
    }

    // --- calls ---

    /// Run a function value. Recursive re-entry of a function already on the
    /// call stack returns undefined; the single pass through each body is
    /// what bounds evaluation.
    pub fn execute_function(
        &mut self,
        func: ValueId,
        kind: CallKind,
        args: &[RefId],
        binding: Option<ValueId>,
    ) -> RefId {
        let func = self.arena.resolve(func);
        let (native, name, params, body, parents) = {
            let v = self.arena.value(func);
            let Some(d) = v.func.as_deref() else {
                return self.undef_ref();
            };
            (
                d.native,
                d.name.clone(),
                d.params.clone(),
                d.body.clone(),
                d.parents.clone(),
            )
        };
        if let Some(nf) = native {
            return nf(self, binding, args);
        }
        if self.call_stack.contains(&func) {
            return self.undef_ref();
        }
        self.call_stack.push(func);

        let this_val = match kind {
            CallKind::New => {
                let obj = self.new_object();
                if let Some(pr) = self.arena.get_property(func, "prototype") {
                    let pv = self.arena.ref_value(pr);
                    self.arena.value_mut(obj).proto = Some(pv);
                }
                obj
            }
            CallKind::Plain => binding.unwrap_or(self.global),
        };

        let clo = self.new_closure(parents, this_val, Some(func));
        if let Some(name) = &name {
            // Named function expressions can call themselves by name.
            let r = self.new_ref(func, true);
            self.declare(clo, name, r);
        }

        let args_obj = self.new_object();
        for (i, &a) in args.iter().enumerate() {
            let v = self.arena.ref_value(a);
            let set = self.arena.value(v).is_set;
            let slot = self.new_ref(v, set);
            self.arena.set_property(args_obj, &i.to_string(), slot);
        }
        let len = self.new_literal(Literal::Num(args.len() as f64));
        let len_ref = self.new_ref(len, true);
        self.arena.set_property(args_obj, "length", len_ref);
        let args_ref = self.new_ref(args_obj, true);
        self.declare(clo, "arguments", args_ref);

        for (i, p) in params.iter().enumerate() {
            let r = match args.get(i) {
                Some(&a) => a,
                None => self.undef_ref(),
            };
            self.declare(clo, p, r);
        }

        crate::hoist::hoist(self, clo, &body);
        for stmt in body.iter() {
            self.eval_stmt(clo, stmt);
        }
        self.call_stack.pop();

        match kind {
            CallKind::New => self.new_ref(this_val, true),
            CallKind::Plain => self.arena.closure(clo).ret,
        }
    }

    /// Replay deferred calls whose callee has since unified with a real
    /// function. Returns how many calls fired; callers loop to a fixed point
    /// since replayed bodies can resolve further callees.
    pub fn drain_pending(&mut self) -> usize {
        let mut fired = 0;
        let mut i = 0;
        while i < self.pending_refs.len() {
            let r = self.pending_refs[i];
            let v = self.arena.ref_value(r);
            if !self.arena.value(v).is_function() {
                i += 1;
                continue;
            }
            let calls = std::mem::take(&mut self.arena.reference_mut(r).pending);
            self.pending_refs.swap_remove(i);
            for pc in calls {
                let saved = self.current_origin;
                self.current_origin = pc.origin;
                let ret = self.execute_function(v, pc.kind, &pc.args, pc.binding);
                self.current_origin = saved;
                // Whoever stored the call-site placeholder now sees the real
                // return value.
                let rv = self.arena.ref_value(ret);
                let old = self.arena.ref_value(pc.result);
                if rv != old {
                    self.arena.remap(rv, old);
                }
                fired += 1;
            }
        }
        fired
    }

    /// Queue a call on an unresolved callee and hand back the placeholder
    /// standing in for its result.
    pub(crate) fn defer_call(
        &mut self,
        callee: RefId,
        kind: CallKind,
        args: Vec<RefId>,
        binding: Option<ValueId>,
    ) -> RefId {
        let result = self.undef_ref();
        let pc = crate::core::value::PendingCall {
            kind,
            args,
            binding,
            result,
            origin: self.current_origin,
        };
        self.arena.reference_mut(callee).pending.push(pc);
        self.pending_refs.push(callee);
        self.log.debug("deferred a call to an unresolved target");
        result
    }
}

/// `Function.prototype.call`: invoke `this` with an explicit receiver.
fn native_function_call(vm: &mut Vm, this: Option<ValueId>, args: &[RefId]) -> RefId {
    let Some(f) = this else {
        return vm.undef_ref();
    };
    let binding = args.first().map(|&r| vm.arena.ref_value(r));
    let rest = if args.len() > 1 { &args[1..] } else { &[] };
    vm.execute_function(f, CallKind::Plain, rest, binding)
}

/// `Function.prototype.apply`: like `call` with the arguments unpacked from
/// an array value.
fn native_function_apply(vm: &mut Vm, this: Option<ValueId>, args: &[RefId]) -> RefId {
    let Some(f) = this else {
        return vm.undef_ref();
    };
    let binding = args.first().map(|&r| vm.arena.ref_value(r));
    let mut unpacked: SmallVec<[RefId; 4]> = SmallVec::new();
    if let Some(&arr) = args.get(1) {
        let arr = vm.arena.ref_value(arr);
        let mut i = 0usize;
        while let Some(el) = vm.arena.own_property(arr, &i.to_string()) {
            unpacked.push(el);
            i += 1;
        }
    }
    vm.execute_function(f, CallKind::Plain, &unpacked, binding)
}

/// `Object.create(proto)`: a fresh object with the given prototype.
fn native_object_create(vm: &mut Vm, _this: Option<ValueId>, args: &[RefId]) -> RefId {
    let obj = vm.new_object();
    if let Some(&p) = args.first() {
        let pv = vm.arena.ref_value(p);
        vm.arena.value_mut(obj).proto = Some(pv);
    }
    vm.new_ref(obj, true)
}
