use tangle_lexer::Lexer;
use tangle_parser::{
    AssignOp, BinaryOp, Expr, LogicalOp, MemberProp, Parser, Program, Stmt, UnaryOp,
};

fn parse(src: &str) -> Program {
    let lex = Lexer::new(src).lex();
    assert!(lex.diagnostics.is_empty(), "{:?}", lex.diagnostics);
    let parsed = Parser::new(src, &lex.tokens).parse();
    let errors: Vec<_> = parsed.diagnostics.iter().filter(|d| d.is_error()).collect();
    assert!(errors.is_empty(), "{errors:?}");
    parsed.program
}

#[test]
fn var_with_initializer() {
    let program = parse("var x = 1;");
    assert_eq!(program.body.len(), 1);
    match &program.body[0] {
        Stmt::Var(decls) => {
            assert_eq!(decls.len(), 1);
            assert_eq!(decls[0].name, "x");
            assert!(matches!(decls[0].init, Some(Expr::Num(n)) if n == 1.0));
        }
        other => panic!("unexpected stmt: {other:?}"),
    }
}

#[test]
fn namespace_guard_shape() {
    let program = parse("var ns = ns || {};");
    match &program.body[0] {
        Stmt::Var(decls) => match decls[0].init.as_ref() {
            Some(Expr::Logical { op, left, right }) => {
                assert_eq!(*op, LogicalOp::Or);
                assert!(matches!(left.as_ref(), Expr::Ident(n) if n == "ns"));
                assert!(matches!(right.as_ref(), Expr::Object(props) if props.is_empty()));
            }
            other => panic!("unexpected init: {other:?}"),
        },
        other => panic!("unexpected stmt: {other:?}"),
    }
}

#[test]
fn dotted_member_assignment() {
    let program = parse("a.b.c = f();");
    match &program.body[0] {
        Stmt::Expr(Expr::Assign(assign)) => {
            assert_eq!(assign.op, AssignOp::Set);
            match &assign.target {
                Expr::Member(m) => {
                    assert!(matches!(&m.property, MemberProp::Dot(p) if p == "c"));
                    match &m.object {
                        Expr::Member(inner) => {
                            assert!(matches!(&inner.object, Expr::Ident(n) if n == "a"));
                            assert!(matches!(&inner.property, MemberProp::Dot(p) if p == "b"));
                        }
                        other => panic!("unexpected base: {other:?}"),
                    }
                }
                other => panic!("unexpected target: {other:?}"),
            }
            assert!(matches!(&assign.value, Expr::Call(_)));
        }
        other => panic!("unexpected stmt: {other:?}"),
    }
}

#[test]
fn new_binds_tighter_than_call() {
    // `new a.B(1).go()` parses as a call on the constructed instance.
    let program = parse("new a.B(1).go();");
    match &program.body[0] {
        Stmt::Expr(Expr::Call(call)) => match &call.callee {
            Expr::Member(m) => {
                assert!(matches!(&m.property, MemberProp::Dot(p) if p == "go"));
                assert!(matches!(&m.object, Expr::New(_)));
            }
            other => panic!("unexpected callee: {other:?}"),
        },
        other => panic!("unexpected stmt: {other:?}"),
    }
}

#[test]
fn iife_with_arguments() {
    let program = parse("(function (g) { g.x = 1; })(window);");
    match &program.body[0] {
        Stmt::Expr(Expr::Call(call)) => {
            assert!(matches!(&call.callee, Expr::Function(f) if f.params.len() == 1));
            assert!(matches!(call.args.as_ref(), [Expr::Ident(n)] if n == "window"));
        }
        other => panic!("unexpected stmt: {other:?}"),
    }
}

#[test]
fn binary_precedence() {
    // 1 + 2 * 3 groups the multiplication first.
    let program = parse("x = 1 + 2 * 3;");
    match &program.body[0] {
        Stmt::Expr(Expr::Assign(assign)) => match &assign.value {
            Expr::Binary { op, left, right } => {
                assert_eq!(*op, BinaryOp::Add);
                assert!(matches!(left.as_ref(), Expr::Num(n) if *n == 1.0));
                assert!(matches!(
                    right.as_ref(),
                    Expr::Binary { op: BinaryOp::Mul, .. }
                ));
            }
            other => panic!("unexpected value: {other:?}"),
        },
        other => panic!("unexpected stmt: {other:?}"),
    }
}

#[test]
fn typeof_guard() {
    let program = parse("if (typeof jQuery != 'undefined') { jQuery.go(); }");
    match &program.body[0] {
        Stmt::If(node) => match &node.test {
            Expr::Binary { op, left, .. } => {
                assert_eq!(*op, BinaryOp::NotEq);
                assert!(matches!(
                    left.as_ref(),
                    Expr::Unary { op: UnaryOp::Typeof, .. }
                ));
            }
            other => panic!("unexpected test: {other:?}"),
        },
        other => panic!("unexpected stmt: {other:?}"),
    }
}

#[test]
fn try_catch_binds_the_error_name() {
    let program = parse("try { risky(); } catch (err) { log(err); } finally { done(); }");
    match &program.body[0] {
        Stmt::Try(t) => {
            assert_eq!(t.block.len(), 1);
            let catch = t.catch.as_ref().unwrap();
            assert_eq!(catch.param, "err");
            assert_eq!(catch.body.len(), 1);
            assert!(t.finally.is_some());
        }
        other => panic!("unexpected stmt: {other:?}"),
    }
}

#[test]
fn regex_after_assign_is_a_literal() {
    let program = parse("var re = /ab+c/g;");
    match &program.body[0] {
        Stmt::Var(decls) => {
            assert!(matches!(&decls[0].init, Some(Expr::Regex(_))));
        }
        other => panic!("unexpected stmt: {other:?}"),
    }
}

#[test]
fn errors_recover_at_statement_boundaries() {
    let src = "var x = ;\nvar y = 2;";
    let lex = Lexer::new(src).lex();
    let parsed = Parser::new(src, &lex.tokens).parse();
    assert!(parsed.diagnostics.iter().any(|d| d.is_error()));
    // The second statement still parses.
    let recovered = parsed.program.body.iter().any(|s| match s {
        Stmt::Var(decls) => decls.iter().any(|d| d.name == "y"),
        _ => false,
    });
    assert!(recovered);
}
