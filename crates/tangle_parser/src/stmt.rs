//! Statement parsing.
use std::rc::Rc;

use tangle_syntax::TokenKind;

use crate::parser::Parser;
use crate::{
    CatchClause, Expr, ForInLeft, ForInStmt, ForInit, ForStmt, Function, IfStmt, Stmt, SwitchCase,
    SwitchStmt, TryStmt, VarDeclarator, WhileStmt,
};

impl<'a> Parser<'a> {
    pub(crate) fn parse_stmt(&mut self) -> Option<Stmt> {
        match self.peek().kind {
            TokenKind::Semi => {
                self.bump();
                Some(Stmt::Empty)
            }
            TokenKind::LBrace => self.parse_block().map(Stmt::Block),
            TokenKind::KwVar => {
                let decls = self.parse_var_decls()?;
                self.terminate_stmt();
                Some(Stmt::Var(decls))
            }
            TokenKind::KwFunction => {
                let func = self.parse_function(true)?;
                Some(Stmt::Func(Box::new(func)))
            }
            TokenKind::KwIf => self.parse_if(),
            TokenKind::KwFor => self.parse_for(),
            TokenKind::KwWhile => self.parse_while(),
            TokenKind::KwDo => self.parse_do_while(),
            TokenKind::KwReturn => {
                self.bump();
                let arg = if self.at(TokenKind::Semi)
                    || self.at(TokenKind::RBrace)
                    || self.at(TokenKind::Eof)
                    || self.newline_before()
                {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                self.terminate_stmt();
                Some(Stmt::Return(arg))
            }
            TokenKind::KwBreak => {
                self.bump();
                // Labels are not modeled; a same-line identifier is consumed.
                if self.at(TokenKind::Ident) && !self.newline_before() {
                    self.bump();
                }
                self.terminate_stmt();
                Some(Stmt::Break)
            }
            TokenKind::KwContinue => {
                self.bump();
                if self.at(TokenKind::Ident) && !self.newline_before() {
                    self.bump();
                }
                self.terminate_stmt();
                Some(Stmt::Continue)
            }
            TokenKind::KwThrow => {
                self.bump();
                let arg = self.parse_expr()?;
                self.terminate_stmt();
                Some(Stmt::Throw(arg))
            }
            TokenKind::KwTry => self.parse_try(),
            TokenKind::KwSwitch => self.parse_switch(),
            _ => {
                let expr = self.parse_expr()?;
                self.terminate_stmt();
                Some(Stmt::Expr(expr))
            }
        }
    }

    pub(crate) fn parse_block(&mut self) -> Option<Box<[Stmt]>> {
        self.expect(TokenKind::LBrace);
        let mut stmts: Vec<Stmt> = Vec::new();
        while !self.at(TokenKind::RBrace) && !self.at(TokenKind::Eof) {
            match self.parse_stmt() {
                Some(stmt) => stmts.push(stmt),
                None => self.recover_stmt(),
            }
        }
        self.expect(TokenKind::RBrace);
        Some(stmts.into_boxed_slice())
    }

    fn parse_var_decls(&mut self) -> Option<Box<[VarDeclarator]>> {
        self.expect(TokenKind::KwVar);
        let mut decls = Vec::with_capacity(1);
        loop {
            let t = self.peek();
            if !self.at(TokenKind::Ident) {
                self.error(format!("expected identifier, found {:?}", t.kind), t.span);
                return None;
            }
            let t = self.bump();
            let name = self.text(t).to_string();
            let init = if self.eat(TokenKind::Eq) {
                Some(self.parse_assign()?)
            } else {
                None
            };
            decls.push(VarDeclarator { name, init });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        Some(decls.into_boxed_slice())
    }

    /// Parse `function name(params) { body }`. Declarations require a name;
    /// expressions may omit it.
    pub(crate) fn parse_function(&mut self, declaration: bool) -> Option<Function> {
        self.expect(TokenKind::KwFunction);
        let name = if self.at(TokenKind::Ident) {
            let t = self.bump();
            Some(self.text(t).to_string())
        } else {
            if declaration {
                let t = self.peek();
                self.error("function declaration requires a name", t.span);
            }
            None
        };

        self.expect(TokenKind::LParen);
        let mut params = Vec::new();
        while !self.at(TokenKind::RParen) && !self.at(TokenKind::Eof) {
            let t = self.peek();
            if !self.at(TokenKind::Ident) {
                self.error(format!("expected parameter name, found {:?}", t.kind), t.span);
                break;
            }
            let t = self.bump();
            params.push(self.text(t).to_string());
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen);

        let body = self.parse_block()?;
        Some(Function {
            name,
            params: params.into_boxed_slice(),
            body: Rc::from(body),
        })
    }

    fn parse_if(&mut self) -> Option<Stmt> {
        self.expect(TokenKind::KwIf);
        self.expect(TokenKind::LParen);
        let test = self.parse_expr()?;
        self.expect(TokenKind::RParen);
        let consequent = self.parse_stmt()?;
        let alternate = if self.eat(TokenKind::KwElse) {
            Some(self.parse_stmt()?)
        } else {
            None
        };
        Some(Stmt::If(Box::new(IfStmt {
            test,
            consequent,
            alternate,
        })))
    }

    fn parse_for(&mut self) -> Option<Stmt> {
        self.expect(TokenKind::KwFor);
        self.expect(TokenKind::LParen);

        // `for (;;)`
        if self.eat(TokenKind::Semi) {
            return self.parse_for_tail(None);
        }

        if self.at(TokenKind::KwVar) {
            let decls = {
                self.no_in = true;
                let d = self.parse_var_decls();
                self.no_in = false;
                d?
            };
            if self.eat(TokenKind::KwIn) {
                // `for (var x in obj)`
                if decls.len() != 1 || decls[0].init.is_some() {
                    let t = self.peek();
                    self.error("invalid left-hand side of for-in", t.span);
                }
                let name = decls[0].name.clone();
                let right = self.parse_expr()?;
                self.expect(TokenKind::RParen);
                let body = self.parse_stmt()?;
                return Some(Stmt::ForIn(Box::new(ForInStmt {
                    left: ForInLeft::Var(name),
                    right,
                    body,
                })));
            }
            self.expect(TokenKind::Semi);
            return self.parse_for_tail(Some(ForInit::Var(decls)));
        }

        let init = {
            self.no_in = true;
            let e = self.parse_expr();
            self.no_in = false;
            e?
        };
        if self.eat(TokenKind::KwIn) {
            let right = self.parse_expr()?;
            self.expect(TokenKind::RParen);
            let body = self.parse_stmt()?;
            return Some(Stmt::ForIn(Box::new(ForInStmt {
                left: ForInLeft::Expr(init),
                right,
                body,
            })));
        }
        self.expect(TokenKind::Semi);
        self.parse_for_tail(Some(ForInit::Expr(init)))
    }

    fn parse_for_tail(&mut self, init: Option<ForInit>) -> Option<Stmt> {
        let test = if self.at(TokenKind::Semi) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::Semi);
        let update = if self.at(TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::RParen);
        let body = self.parse_stmt()?;
        Some(Stmt::For(Box::new(ForStmt {
            init,
            test,
            update,
            body,
        })))
    }

    fn parse_while(&mut self) -> Option<Stmt> {
        self.expect(TokenKind::KwWhile);
        self.expect(TokenKind::LParen);
        let cond = self.parse_expr()?;
        self.expect(TokenKind::RParen);
        let body = self.parse_stmt()?;
        Some(Stmt::While(Box::new(WhileStmt { cond, body })))
    }

    fn parse_do_while(&mut self) -> Option<Stmt> {
        self.expect(TokenKind::KwDo);
        let body = self.parse_stmt()?;
        self.expect(TokenKind::KwWhile);
        self.expect(TokenKind::LParen);
        let cond = self.parse_expr()?;
        self.expect(TokenKind::RParen);
        self.terminate_stmt();
        Some(Stmt::DoWhile(Box::new(WhileStmt { cond, body })))
    }

    fn parse_try(&mut self) -> Option<Stmt> {
        self.expect(TokenKind::KwTry);
        let block = self.parse_block()?;
        let catch = if self.eat(TokenKind::KwCatch) {
            self.expect(TokenKind::LParen);
            let t = self.peek();
            let param = if self.at(TokenKind::Ident) {
                let id = self.bump();
                self.text(id).to_string()
            } else {
                self.error(format!("expected identifier, found {:?}", t.kind), t.span);
                String::new()
            };
            self.expect(TokenKind::RParen);
            let body = self.parse_block()?;
            Some(CatchClause { param, body })
        } else {
            None
        };
        let finally = if self.eat(TokenKind::KwFinally) {
            Some(self.parse_block()?)
        } else {
            None
        };

        if catch.is_none() && finally.is_none() {
            let t = self.peek();
            self.error("try requires catch or finally", t.span);
        }
        Some(Stmt::Try(Box::new(TryStmt {
            block,
            catch,
            finally,
        })))
    }

    fn parse_switch(&mut self) -> Option<Stmt> {
        self.expect(TokenKind::KwSwitch);
        self.expect(TokenKind::LParen);
        let discriminant = self.parse_expr()?;
        self.expect(TokenKind::RParen);
        self.expect(TokenKind::LBrace);

        let mut cases: Vec<SwitchCase> = Vec::new();
        while !self.at(TokenKind::RBrace) && !self.at(TokenKind::Eof) {
            let test = if self.eat(TokenKind::KwCase) {
                let e = self.parse_expr()?;
                Some(e)
            } else if self.eat(TokenKind::KwDefault) {
                None
            } else {
                let t = self.peek();
                self.error(format!("expected case or default, found {:?}", t.kind), t.span);
                return None;
            };
            self.expect(TokenKind::Colon);

            let mut body: Vec<Stmt> = Vec::new();
            while !self.at(TokenKind::KwCase)
                && !self.at(TokenKind::KwDefault)
                && !self.at(TokenKind::RBrace)
                && !self.at(TokenKind::Eof)
            {
                match self.parse_stmt() {
                    Some(stmt) => body.push(stmt),
                    None => self.recover_stmt(),
                }
            }
            cases.push(SwitchCase {
                test,
                body: body.into_boxed_slice(),
            });
        }
        self.expect(TokenKind::RBrace);
        Some(Stmt::Switch(Box::new(SwitchStmt {
            discriminant,
            cases: cases.into_boxed_slice(),
        })))
    }

    /// Expression including sequence (`a, b, c`).
    pub(crate) fn parse_expr(&mut self) -> Option<Expr> {
        let first = self.parse_assign()?;
        if !self.at(TokenKind::Comma) {
            return Some(first);
        }
        let mut exprs = vec![first];
        while self.eat(TokenKind::Comma) {
            exprs.push(self.parse_assign()?);
        }
        Some(Expr::Sequence(exprs.into_boxed_slice()))
    }
}
