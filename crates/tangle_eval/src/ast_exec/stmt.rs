use tangle_ast::{ForInLeft, ForInit, Stmt};

use crate::core::value::ClosureId;
use crate::vm::Vm;

impl Vm {
    pub(crate) fn eval_stmt(&mut self, clo: ClosureId, stmt: &Stmt) {
        match stmt {
            Stmt::Var(decls) => {
                for d in decls.iter() {
                    if let Some(init) = &d.init {
                        let r = self.eval_expr(clo, init);
                        let v = self.arena.ref_value(r);
                        // `var ns = ns || {}` guards are not dependencies.
                        if !matches!(init, tangle_ast::Expr::Logical { .. }) {
                            self.require(v);
                        }
                        let target = self.ident_ref(clo, &d.name);
                        self.store(target, v);
                    }
                }
            }
            // Bound during hoisting.
            Stmt::Func(_) => {}
            Stmt::Expr(e) => {
                self.eval_expr(clo, e);
            }
            Stmt::Return(arg) => {
                if let Some(arg) = arg {
                    let r = self.eval_expr(clo, arg);
                    self.require_ref(r);
                    self.arena.closure_mut(clo).ret = r;
                }
            }
            Stmt::If(s) => {
                self.eval_expr(clo, &s.test);
                self.eval_stmt(clo, &s.consequent);
                if let Some(alt) = &s.alternate {
                    self.eval_stmt(clo, alt);
                }
            }
            Stmt::For(s) => {
                match &s.init {
                    Some(ForInit::Var(decls)) => {
                        self.eval_stmt(clo, &Stmt::Var(decls.clone()));
                    }
                    Some(ForInit::Expr(e)) => {
                        self.eval_expr(clo, e);
                    }
                    None => {}
                }
                if let Some(test) = &s.test {
                    self.eval_expr(clo, test);
                }
                self.eval_stmt(clo, &s.body);
                if let Some(update) = &s.update {
                    self.eval_expr(clo, update);
                }
            }
            Stmt::ForIn(s) => {
                let target = match &s.left {
                    ForInLeft::Var(name) => self.ident_ref(clo, name),
                    ForInLeft::Expr(e) => self.eval_lvalue(clo, e),
                };
                let r = self.eval_expr(clo, &s.right);
                self.require_ref(r);
                // The iteration key is an unknowable string.
                let key = self.new_unknown();
                self.store(target, key);
                self.eval_stmt(clo, &s.body);
            }
            Stmt::While(s) => {
                self.eval_expr(clo, &s.cond);
                self.eval_stmt(clo, &s.body);
            }
            Stmt::DoWhile(s) => {
                self.eval_stmt(clo, &s.body);
                self.eval_expr(clo, &s.cond);
            }
            Stmt::Block(body) => {
                for stmt in body.iter() {
                    self.eval_stmt(clo, stmt);
                }
            }
            Stmt::Try(s) => {
                for stmt in s.block.iter() {
                    self.eval_stmt(clo, stmt);
                }
                if let Some(catch) = &s.catch {
                    // Nothing throws here, so the caught error is opaque.
                    let err = self.new_unknown();
                    let r = self.new_ref(err, true);
                    self.declare(clo, &catch.param, r);
                    for stmt in catch.body.iter() {
                        self.eval_stmt(clo, stmt);
                    }
                }
                if let Some(fin) = &s.finally {
                    for stmt in fin.iter() {
                        self.eval_stmt(clo, stmt);
                    }
                }
            }
            Stmt::Switch(s) => {
                self.eval_expr(clo, &s.discriminant);
                for case in s.cases.iter() {
                    if let Some(test) = &case.test {
                        self.eval_expr(clo, test);
                    }
                    for stmt in case.body.iter() {
                        self.eval_stmt(clo, stmt);
                    }
                }
            }
            Stmt::Throw(e) => {
                let r = self.eval_expr(clo, e);
                self.require_ref(r);
            }
            Stmt::Break | Stmt::Continue | Stmt::Empty => {}
        }
    }
}
