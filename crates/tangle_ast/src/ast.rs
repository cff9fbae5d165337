//! ES5 syntax tree.
//!
//! Function bodies are `Rc<[Stmt]>` rather than `Box<[Stmt]>`: the evaluator's
//! closures hold on to bodies across files so deferred calls can be replayed
//! after the whole tree of the defining file has been dropped from scope.
use std::rc::Rc;

#[derive(Clone, Debug, PartialEq)]
pub struct Program {
    pub body: Rc<[Stmt]>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    Var(Box<[VarDeclarator]>),
    Func(Box<Function>),
    Expr(Expr),
    Return(Option<Expr>),
    If(Box<IfStmt>),
    For(Box<ForStmt>),
    ForIn(Box<ForInStmt>),
    While(Box<WhileStmt>),
    DoWhile(Box<WhileStmt>),
    Block(Box<[Stmt]>),
    Try(Box<TryStmt>),
    Switch(Box<SwitchStmt>),
    Throw(Expr),
    Break,
    Continue,
    Empty,
}

#[derive(Clone, Debug, PartialEq)]
pub struct VarDeclarator {
    pub name: String,
    pub init: Option<Expr>,
}

/// Function declaration or expression. `name` is `Some` for declarations and
/// named function expressions (the latter self-bind their name on call).
#[derive(Clone, Debug, PartialEq)]
pub struct Function {
    pub name: Option<String>,
    pub params: Box<[String]>,
    pub body: Rc<[Stmt]>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IfStmt {
    pub test: Expr,
    pub consequent: Stmt,
    pub alternate: Option<Stmt>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ForStmt {
    pub init: Option<ForInit>,
    pub test: Option<Expr>,
    pub update: Option<Expr>,
    pub body: Stmt,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ForInit {
    Var(Box<[VarDeclarator]>),
    Expr(Expr),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ForInStmt {
    pub left: ForInLeft,
    pub right: Expr,
    pub body: Stmt,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ForInLeft {
    Var(String),
    Expr(Expr),
}

#[derive(Clone, Debug, PartialEq)]
pub struct WhileStmt {
    pub cond: Expr,
    pub body: Stmt,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TryStmt {
    pub block: Box<[Stmt]>,
    pub catch: Option<CatchClause>,
    pub finally: Option<Box<[Stmt]>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CatchClause {
    pub param: String,
    pub body: Box<[Stmt]>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SwitchStmt {
    pub discriminant: Expr,
    pub cases: Box<[SwitchCase]>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SwitchCase {
    pub test: Option<Expr>,
    pub body: Box<[Stmt]>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Ident(String),
    Num(f64),
    Str(String),
    Bool(bool),
    Null,
    Regex(String),
    This,
    /// Array literal; `None` entries are elisions (`[1, , 3]`).
    Array(Box<[Option<Expr>]>),
    Object(Box<[(PropKey, Expr)]>),
    Function(Box<Function>),
    Member(Box<MemberExpr>),
    Call(Box<CallExpr>),
    New(Box<CallExpr>),
    Assign(Box<AssignExpr>),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Logical {
        op: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
    },
    Update {
        op: UpdateOp,
        prefix: bool,
        expr: Box<Expr>,
    },
    Conditional(Box<CondExpr>),
    Sequence(Box<[Expr]>),
}

#[derive(Clone, Debug, PartialEq)]
pub enum PropKey {
    Ident(String),
    Str(String),
    Num(f64),
}

impl PropKey {
    pub fn as_name(&self) -> String {
        match self {
            PropKey::Ident(s) | PropKey::Str(s) => s.clone(),
            PropKey::Num(n) => fmt_number(*n),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MemberExpr {
    pub object: Expr,
    pub property: MemberProp,
}

#[derive(Clone, Debug, PartialEq)]
pub enum MemberProp {
    Dot(String),
    Computed(Expr),
}

#[derive(Clone, Debug, PartialEq)]
pub struct CallExpr {
    pub callee: Expr,
    pub args: Box<[Expr]>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AssignExpr {
    pub op: AssignOp,
    pub target: Expr,
    pub value: Expr,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CondExpr {
    pub test: Expr,
    pub consequent: Expr,
    pub alternate: Expr,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignOp {
    Set,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    UShr,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    UShr,
    Lt,
    Gt,
    Le,
    Ge,
    EqEq,
    NotEq,
    StrictEq,
    StrictNotEq,
    Instanceof,
    In,
}

impl BinaryOp {
    /// Comparison-family operators are never computed for their real result;
    /// the evaluator yields a falsy placeholder for them.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Lt
                | BinaryOp::Gt
                | BinaryOp::Le
                | BinaryOp::Ge
                | BinaryOp::EqEq
                | BinaryOp::NotEq
                | BinaryOp::StrictEq
                | BinaryOp::StrictNotEq
                | BinaryOp::Instanceof
                | BinaryOp::In
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Pos,
    Not,
    BitNot,
    Typeof,
    Void,
    Delete,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateOp {
    Incr,
    Decr,
}

impl Expr {
    pub fn is_assignable(&self) -> bool {
        matches!(self, Expr::Ident(_) | Expr::Member(_))
    }
}

/// Format a number the way JS stringifies property keys (`1` not `1.0`).
pub fn fmt_number(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}
