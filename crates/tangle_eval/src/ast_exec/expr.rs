use tangle_ast::{
    AssignExpr, AssignOp, BinaryOp, CallExpr, Expr, LogicalOp, MemberExpr, MemberProp, UnaryOp,
    UpdateOp,
};

use crate::core::value::{CallKind, ClosureId, Literal, RefId, Value, ValueId};
use crate::vm::Vm;

impl Vm {
    pub(crate) fn eval_expr(&mut self, clo: ClosureId, expr: &Expr) -> RefId {
        match expr {
            Expr::Ident(name) => self.ident_ref(clo, name),
            Expr::Num(n) => {
                let v = self.new_literal(Literal::Num(*n));
                self.new_ref(v, true)
            }
            Expr::Str(s) => {
                let v = self.new_literal(Literal::Str(s.clone()));
                self.new_ref(v, true)
            }
            Expr::Bool(b) => {
                let v = self.new_literal(Literal::Bool(*b));
                self.new_ref(v, true)
            }
            Expr::Null => {
                let v = self.new_literal(Literal::Null);
                self.new_ref(v, true)
            }
            Expr::Regex(_) => {
                let v = self.new_object();
                self.new_ref(v, true)
            }
            Expr::This => {
                let t = self.arena.closure(clo).this_val;
                self.new_ref(t, true)
            }
            Expr::Array(elements) => {
                let arr = self.new_object();
                for (i, el) in elements.iter().enumerate() {
                    if let Some(el) = el {
                        let r = self.eval_expr(clo, el);
                        let v = self.arena.ref_value(r);
                        self.require(v);
                        let slot = self.alias_slot(v);
                        self.arena.set_property(arr, &i.to_string(), slot);
                    }
                }
                let len = self.new_literal(Literal::Num(elements.len() as f64));
                let len_ref = self.new_ref(len, true);
                self.arena.set_property(arr, "length", len_ref);
                self.new_ref(arr, true)
            }
            Expr::Object(props) => {
                let obj = self.new_object();
                for (key, init) in props.iter() {
                    let r = self.eval_expr(clo, init);
                    let v = self.arena.ref_value(r);
                    self.require(v);
                    let slot = self.alias_slot(v);
                    self.arena.set_property(obj, &key.as_name(), slot);
                }
                self.new_ref(obj, true)
            }
            Expr::Function(f) => {
                let v = self.create_function(clo, f);
                self.new_ref(v, true)
            }
            Expr::Member(m) => self.member_ref(clo, m),
            Expr::Call(c) => self.eval_call(clo, c, CallKind::Plain),
            Expr::New(c) => self.eval_call(clo, c, CallKind::New),
            Expr::Assign(a) => self.eval_assign(clo, a),
            Expr::Binary { op, left, right } => {
                let lr = self.eval_expr(clo, left);
                let rr = self.eval_expr(clo, right);
                self.require_ref(lr);
                self.require_ref(rr);
                if op.is_comparison() {
                    // Never decided for real; a coercible falsy placeholder
                    // keeps both sides of any branch on it live.
                    let v = self.new_unset_literal(Literal::Bool(false));
                    return self.new_ref(v, false);
                }
                let lv = self.arena.ref_value(lr);
                let rv = self.arena.ref_value(rr);
                match binop_literal(self.arena.value(lv), self.arena.value(rv), *op) {
                    Some(lit) => {
                        let v = self.new_literal(lit);
                        self.new_ref(v, true)
                    }
                    None => self.undef_ref(),
                }
            }
            Expr::Logical { op, left, right } => {
                // Both sides always run. Guards like `ns = ns || {}` must
                // not count as dependencies, so neither operand is required.
                let lr = self.eval_expr(clo, left);
                let rr = self.eval_expr(clo, right);
                let lv = self.arena.ref_value(lr);
                let lb = self.arena.value(lv).as_boolean();
                match op {
                    LogicalOp::And => {
                        if lb == Some(false) {
                            lr
                        } else {
                            rr
                        }
                    }
                    LogicalOp::Or => {
                        if lb == Some(true) {
                            lr
                        } else {
                            rr
                        }
                    }
                }
            }
            Expr::Unary { op, expr } => self.eval_unary(clo, *op, expr),
            Expr::Update { op, prefix, expr } => self.eval_update(clo, *op, *prefix, expr),
            Expr::Conditional(c) => {
                let tr = self.eval_expr(clo, &c.test);
                let cons = self.eval_expr(clo, &c.consequent);
                let alt = self.eval_expr(clo, &c.alternate);
                let tv = self.arena.ref_value(tr);
                match self.arena.value(tv).as_boolean() {
                    Some(true) => cons,
                    _ => alt,
                }
            }
            Expr::Sequence(exprs) => {
                let mut last = None;
                for e in exprs.iter() {
                    last = Some(self.eval_expr(clo, e));
                }
                match last {
                    Some(r) => r,
                    None => self.undef_ref(),
                }
            }
        }
    }

    /// Resolve an identifier: closure chain first, then the global object.
    /// Unknown names become unset placeholder properties of the global, the
    /// same way implicit globals come into existence at runtime.
    pub(crate) fn ident_ref(&mut self, clo: ClosureId, name: &str) -> RefId {
        if let Some(r) = self.lookup(clo, name) {
            return r;
        }
        let v = self.new_undefined();
        let r = self.new_ref(v, false);
        self.arena.set_property(self.global, name, r);
        r
    }

    pub(crate) fn eval_lvalue(&mut self, clo: ClosureId, expr: &Expr) -> RefId {
        match expr {
            Expr::Ident(name) => self.ident_ref(clo, name),
            Expr::Member(m) => self.member_ref(clo, m),
            // The parser already flagged this target as invalid.
            other => self.eval_expr(clo, other),
        }
    }

    /// Property access. Reading through an object counts as depending on it;
    /// missing properties become placeholders on the object so later files
    /// (or later statements) can satisfy them.
    fn member_ref(&mut self, clo: ClosureId, m: &MemberExpr) -> RefId {
        let oref = self.eval_expr(clo, &m.object);
        let oval = self.arena.ref_value(oref);
        self.require(oval);

        let name = match &m.property {
            MemberProp::Dot(n) => n.clone(),
            MemberProp::Computed(e) => {
                let r = self.eval_expr(clo, e);
                let v = self.arena.ref_value(r);
                match self.arena.value(v).as_string() {
                    Some(s) => s,
                    None => {
                        self.log
                            .debug("skipping member access with an unresolved computed key");
                        return self.undef_ref();
                    }
                }
            }
        };

        if self.arena.value(oval).props.is_none() {
            // Property of a primitive literal; nothing to model.
            return self.undef_ref();
        }

        let r = match self.arena.get_property(oval, &name) {
            Some(r) => r,
            None => {
                // Placeholders under a native host stay native so reads of
                // e.g. `Math.floor` never become requires. The global object
                // itself is exempt: its children are ordinary globals.
                let native = self.arena.value(oval).is_native && oval != self.global;
                let v = self.new_undefined();
                if native {
                    self.arena.value_mut(v).is_native = true;
                }
                let r = self.new_ref(v, false);
                self.arena.set_property(oval, &name, r);
                r
            }
        };
        self.arena.reference_mut(r).binding = Some(oval);
        r
    }

    fn eval_call(&mut self, clo: ClosureId, c: &CallExpr, kind: CallKind) -> RefId {
        let mut args = Vec::with_capacity(c.args.len());
        for a in c.args.iter() {
            let r = self.eval_expr(clo, a);
            self.require_ref(r);
            args.push(r);
        }
        let callee_ref = self.eval_expr(clo, &c.callee);
        let callee_val = self.arena.ref_value(callee_ref);
        let binding = self.arena.reference(callee_ref).binding;
        if self.arena.value(callee_val).is_function() {
            self.execute_function(callee_val, kind, &args, binding)
        } else if !self.arena.value(callee_val).is_set {
            self.require(callee_val);
            self.defer_call(callee_ref, kind, args, binding)
        } else {
            self.log.debug("call target is not a function");
            self.undef_ref()
        }
    }

    fn eval_assign(&mut self, clo: ClosureId, a: &AssignExpr) -> RefId {
        // Right side first, so `x = x || fallback` styles see the slot's
        // state from before the write.
        let vref = self.eval_expr(clo, &a.value);
        let vval = self.arena.ref_value(vref);
        if !matches!(&a.value, Expr::Logical { .. }) {
            self.require(vval);
        }
        let target = self.eval_lvalue(clo, &a.target);
        if a.op == AssignOp::Set {
            self.store(target, vval);
        } else {
            // Compound assignment reads the slot before writing it.
            self.require_ref(target);
            let tval = self.arena.ref_value(target);
            let lit = binop_literal(
                self.arena.value(tval),
                self.arena.value(vval),
                assign_binop(a.op),
            );
            let nv = match lit {
                Some(lit) => self.new_literal(lit),
                None => self.new_unknown(),
            };
            self.store(target, nv);
        }
        target
    }

    fn eval_unary(&mut self, clo: ClosureId, op: UnaryOp, expr: &Expr) -> RefId {
        let r = self.eval_expr(clo, expr);
        let v = self.arena.ref_value(r);
        match op {
            UnaryOp::Typeof => {
                let name = {
                    let val = self.arena.value(v);
                    if val.is_function() {
                        "function"
                    } else {
                        match &val.literal {
                            Some(Literal::Num(_)) => "number",
                            Some(Literal::Str(_)) => "string",
                            Some(Literal::Bool(_)) => "boolean",
                            Some(Literal::Null) => "object",
                            None => {
                                if val.is_set && val.props.is_some() {
                                    "object"
                                } else {
                                    "undefined"
                                }
                            }
                        }
                    }
                };
                // `typeof x !== "undefined"` guards read x without it being
                // a hard dependency, so typeof does not require its operand.
                let lit = self.new_unset_literal(Literal::Str(name.to_string()));
                self.new_ref(lit, false)
            }
            UnaryOp::Not => {
                self.require(v);
                match self.arena.value(v).as_boolean() {
                    Some(b) => {
                        let lit = self.new_literal(Literal::Bool(!b));
                        self.new_ref(lit, true)
                    }
                    None => {
                        let lit = self.new_unset_literal(Literal::Bool(false));
                        self.new_ref(lit, false)
                    }
                }
            }
            UnaryOp::Neg | UnaryOp::Pos | UnaryOp::BitNot => {
                self.require(v);
                match self.arena.value(v).as_number() {
                    Some(n) => {
                        let n = match op {
                            UnaryOp::Neg => -n,
                            UnaryOp::Pos => n,
                            _ => !(n as i64 as i32) as f64,
                        };
                        let lit = self.new_literal(Literal::Num(n));
                        self.new_ref(lit, true)
                    }
                    None => self.undef_ref(),
                }
            }
            UnaryOp::Void => self.undef_ref(),
            // Deletions are ignored; a property that existed at any point
            // stays part of the recorded shape.
            UnaryOp::Delete => {
                let lit = self.new_literal(Literal::Bool(true));
                self.new_ref(lit, true)
            }
        }
    }

    fn eval_update(&mut self, clo: ClosureId, op: UpdateOp, prefix: bool, expr: &Expr) -> RefId {
        let target = self.eval_lvalue(clo, expr);
        self.require_ref(target);
        let tval = self.arena.ref_value(target);
        match self.arena.value(tval).as_number() {
            Some(old) => {
                let new = match op {
                    UpdateOp::Incr => old + 1.0,
                    UpdateOp::Decr => old - 1.0,
                };
                let nv = self.new_literal(Literal::Num(new));
                self.store(target, nv);
                let result = if prefix { new } else { old };
                let lit = self.new_literal(Literal::Num(result));
                self.new_ref(lit, true)
            }
            None => {
                let nv = self.new_unknown();
                self.store(target, nv);
                self.undef_ref()
            }
        }
    }

    /// A fresh slot aliasing an existing value, used for object and array
    /// literal properties. Reusing the evaluated reference directly would
    /// stamp ownership onto somebody else's slot.
    fn alias_slot(&mut self, v: ValueId) -> RefId {
        let set = self.arena.value(v).is_set;
        let r = self.new_ref(v, set);
        self.arena.reference_mut(r).origin = self.current_origin;
        r
    }

    /// Assign a value into a slot. If the slot held a placeholder other
    /// files may alias, unify the placeholder into the new value so those
    /// aliases resolve too.
    pub(crate) fn store(&mut self, target: RefId, v: ValueId) {
        let v = self.arena.resolve(v);
        let old = self.arena.ref_value(target);
        if old != v {
            if !self.arena.value(old).is_set && self.arena.value(old).is_required {
                self.arena.remap(v, old);
            }
            let v = self.arena.resolve(v);
            self.arena.reference_mut(target).value = v;
        }
        let origin = self.current_origin;
        let r = self.arena.reference_mut(target);
        r.is_set = true;
        if origin.is_some() {
            r.origin = origin;
        }
    }
}

fn assign_binop(op: AssignOp) -> BinaryOp {
    match op {
        AssignOp::Set => unreachable!("plain assignment is handled directly"),
        AssignOp::Add => BinaryOp::Add,
        AssignOp::Sub => BinaryOp::Sub,
        AssignOp::Mul => BinaryOp::Mul,
        AssignOp::Div => BinaryOp::Div,
        AssignOp::Mod => BinaryOp::Mod,
        AssignOp::BitAnd => BinaryOp::BitAnd,
        AssignOp::BitOr => BinaryOp::BitOr,
        AssignOp::BitXor => BinaryOp::BitXor,
        AssignOp::Shl => BinaryOp::Shl,
        AssignOp::Shr => BinaryOp::Shr,
        AssignOp::UShr => BinaryOp::UShr,
    }
}

/// Compute an arithmetic result when both operands carry usable literals.
fn binop_literal(l: &Value, r: &Value, op: BinaryOp) -> Option<Literal> {
    match op {
        BinaryOp::Add => {
            let string_side = matches!(l.literal, Some(Literal::Str(_)))
                || matches!(r.literal, Some(Literal::Str(_)));
            if string_side {
                let mut s = l.as_string()?;
                s.push_str(&r.as_string()?);
                Some(Literal::Str(s))
            } else {
                Some(Literal::Num(l.as_number()? + r.as_number()?))
            }
        }
        BinaryOp::Sub => Some(Literal::Num(l.as_number()? - r.as_number()?)),
        BinaryOp::Mul => Some(Literal::Num(l.as_number()? * r.as_number()?)),
        BinaryOp::Div => Some(Literal::Num(l.as_number()? / r.as_number()?)),
        BinaryOp::Mod => Some(Literal::Num(l.as_number()? % r.as_number()?)),
        BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor | BinaryOp::Shl | BinaryOp::Shr => {
            let a = l.as_number()? as i64 as i32;
            let b = r.as_number()? as i64 as i32;
            let n = match op {
                BinaryOp::BitAnd => a & b,
                BinaryOp::BitOr => a | b,
                BinaryOp::BitXor => a ^ b,
                BinaryOp::Shl => a.wrapping_shl(b as u32 & 31),
                _ => a.wrapping_shr(b as u32 & 31),
            };
            Some(Literal::Num(n as f64))
        }
        BinaryOp::UShr => {
            let a = l.as_number()? as i64 as u32;
            let b = r.as_number()? as i64 as u32;
            Some(Literal::Num((a.wrapping_shr(b & 31)) as f64))
        }
        _ => None,
    }
}
