//! Declaration hoisting.
//!
//! Before a body is evaluated, every `var` declarator in it becomes an
//! undefined-but-set binding and every function declaration is bound to its
//! function value. The walk descends into nested statements but not into
//! function bodies; those hoist their own declarations when called.

use tangle_ast::{ForInLeft, ForInit, Stmt};

use crate::core::value::{ClosureId, Reference};
use crate::vm::Vm;

pub fn hoist(vm: &mut Vm, clo: ClosureId, body: &[Stmt]) {
    for stmt in body {
        hoist_stmt(vm, clo, stmt);
    }
}

fn hoist_var(vm: &mut Vm, clo: ClosureId, name: &str) {
    let locals = vm.arena.closure(clo).locals;
    if vm.arena.own_property(locals, name).is_some() {
        return;
    }
    let undef = vm.new_undefined();
    let r = vm.arena.alloc_ref(Reference::new(undef, true));
    vm.declare(clo, name, r);
}

fn hoist_stmt(vm: &mut Vm, clo: ClosureId, stmt: &Stmt) {
    match stmt {
        Stmt::Var(decls) => {
            for d in decls.iter() {
                hoist_var(vm, clo, &d.name);
            }
        }
        Stmt::Func(f) => {
            let func = vm.create_function(clo, f);
            let mut r = Reference::new(func, true);
            r.origin = vm.current_origin;
            let r = vm.arena.alloc_ref(r);
            // Function declarations bind unconditionally; the last one wins,
            // as it does at runtime.
            let name = f.name.clone().unwrap_or_default();
            vm.declare(clo, &name, r);
        }
        Stmt::Block(body) => hoist(vm, clo, body),
        Stmt::If(s) => {
            hoist_stmt(vm, clo, &s.consequent);
            if let Some(alt) = &s.alternate {
                hoist_stmt(vm, clo, alt);
            }
        }
        Stmt::For(s) => {
            if let Some(ForInit::Var(decls)) = &s.init {
                for d in decls.iter() {
                    hoist_var(vm, clo, &d.name);
                }
            }
            hoist_stmt(vm, clo, &s.body);
        }
        Stmt::ForIn(s) => {
            if let ForInLeft::Var(name) = &s.left {
                hoist_var(vm, clo, name);
            }
            hoist_stmt(vm, clo, &s.body);
        }
        Stmt::While(s) | Stmt::DoWhile(s) => hoist_stmt(vm, clo, &s.body),
        Stmt::Try(s) => {
            hoist(vm, clo, &s.block);
            if let Some(catch) = &s.catch {
                hoist(vm, clo, &catch.body);
            }
            if let Some(fin) = &s.finally {
                hoist(vm, clo, fin);
            }
        }
        Stmt::Switch(s) => {
            for case in s.cases.iter() {
                hoist(vm, clo, &case.body);
            }
        }
        Stmt::Expr(_)
        | Stmt::Return(_)
        | Stmt::Throw(_)
        | Stmt::Break
        | Stmt::Continue
        | Stmt::Empty => {}
    }
}
