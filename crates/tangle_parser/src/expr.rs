//! Expression parsing (precedence climbing).
use tangle_syntax::TokenKind;

use crate::parser::Parser;
use crate::{
    AssignExpr, AssignOp, BinaryOp, CallExpr, CondExpr, Expr, LogicalOp, MemberExpr, MemberProp,
    PropKey, UnaryOp, UpdateOp,
};

/// Binary operator classification used by the precedence climber.
#[derive(Clone, Copy)]
enum BinKind {
    Bin(BinaryOp),
    Logic(LogicalOp),
}

fn assign_op(kind: TokenKind) -> Option<AssignOp> {
    Some(match kind {
        TokenKind::Eq => AssignOp::Set,
        TokenKind::PlusEq => AssignOp::Add,
        TokenKind::MinusEq => AssignOp::Sub,
        TokenKind::StarEq => AssignOp::Mul,
        TokenKind::SlashEq => AssignOp::Div,
        TokenKind::PercentEq => AssignOp::Mod,
        TokenKind::AmpEq => AssignOp::BitAnd,
        TokenKind::PipeEq => AssignOp::BitOr,
        TokenKind::CaretEq => AssignOp::BitXor,
        TokenKind::ShlEq => AssignOp::Shl,
        TokenKind::ShrEq => AssignOp::Shr,
        TokenKind::UShrEq => AssignOp::UShr,
        _ => return None,
    })
}

fn binary_prec(kind: TokenKind, no_in: bool) -> Option<(u8, BinKind)> {
    Some(match kind {
        TokenKind::PipePipe => (1, BinKind::Logic(LogicalOp::Or)),
        TokenKind::AmpAmp => (2, BinKind::Logic(LogicalOp::And)),
        TokenKind::Pipe => (3, BinKind::Bin(BinaryOp::BitOr)),
        TokenKind::Caret => (4, BinKind::Bin(BinaryOp::BitXor)),
        TokenKind::Amp => (5, BinKind::Bin(BinaryOp::BitAnd)),
        TokenKind::EqEq => (6, BinKind::Bin(BinaryOp::EqEq)),
        TokenKind::Ne => (6, BinKind::Bin(BinaryOp::NotEq)),
        TokenKind::EqEqEq => (6, BinKind::Bin(BinaryOp::StrictEq)),
        TokenKind::NeStrict => (6, BinKind::Bin(BinaryOp::StrictNotEq)),
        TokenKind::Lt => (7, BinKind::Bin(BinaryOp::Lt)),
        TokenKind::Gt => (7, BinKind::Bin(BinaryOp::Gt)),
        TokenKind::Le => (7, BinKind::Bin(BinaryOp::Le)),
        TokenKind::Ge => (7, BinKind::Bin(BinaryOp::Ge)),
        TokenKind::KwInstanceof => (7, BinKind::Bin(BinaryOp::Instanceof)),
        TokenKind::KwIn if !no_in => (7, BinKind::Bin(BinaryOp::In)),
        TokenKind::Shl => (8, BinKind::Bin(BinaryOp::Shl)),
        TokenKind::Shr => (8, BinKind::Bin(BinaryOp::Shr)),
        TokenKind::UShr => (8, BinKind::Bin(BinaryOp::UShr)),
        TokenKind::Plus => (9, BinKind::Bin(BinaryOp::Add)),
        TokenKind::Minus => (9, BinKind::Bin(BinaryOp::Sub)),
        TokenKind::Star => (10, BinKind::Bin(BinaryOp::Mul)),
        TokenKind::Slash => (10, BinKind::Bin(BinaryOp::Div)),
        TokenKind::Percent => (10, BinKind::Bin(BinaryOp::Mod)),
        _ => return None,
    })
}

impl<'a> Parser<'a> {
    pub(crate) fn parse_assign(&mut self) -> Option<Expr> {
        let left = self.parse_conditional()?;
        let Some(op) = assign_op(self.peek().kind) else {
            return Some(left);
        };
        let t = self.bump();
        if !left.is_assignable() {
            self.error("invalid assignment target", t.span);
        }
        let value = self.parse_assign()?;
        Some(Expr::Assign(Box::new(AssignExpr {
            op,
            target: left,
            value,
        })))
    }

    fn parse_conditional(&mut self) -> Option<Expr> {
        let test = self.parse_binary(0)?;
        if !self.eat(TokenKind::Question) {
            return Some(test);
        }
        let consequent = self.parse_assign()?;
        self.expect(TokenKind::Colon);
        let alternate = self.parse_assign()?;
        Some(Expr::Conditional(Box::new(CondExpr {
            test,
            consequent,
            alternate,
        })))
    }

    fn parse_binary(&mut self, min_prec: u8) -> Option<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let Some((prec, kind)) = binary_prec(self.peek().kind, self.no_in) else {
                break;
            };
            if prec < min_prec {
                break;
            }
            self.bump();
            let right = self.parse_binary(prec + 1)?;
            left = match kind {
                BinKind::Bin(op) => Expr::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                BinKind::Logic(op) => Expr::Logical {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
            };
        }
        Some(left)
    }

    fn parse_unary(&mut self) -> Option<Expr> {
        let op = match self.peek().kind {
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Plus => Some(UnaryOp::Pos),
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Tilde => Some(UnaryOp::BitNot),
            TokenKind::KwTypeof => Some(UnaryOp::Typeof),
            TokenKind::KwVoid => Some(UnaryOp::Void),
            TokenKind::KwDelete => Some(UnaryOp::Delete),
            _ => None,
        };
        if let Some(op) = op {
            self.bump();
            let expr = self.parse_unary()?;
            return Some(Expr::Unary {
                op,
                expr: Box::new(expr),
            });
        }

        if self.at(TokenKind::PlusPlus) || self.at(TokenKind::MinusMinus) {
            let op = if self.bump().kind == TokenKind::PlusPlus {
                UpdateOp::Incr
            } else {
                UpdateOp::Decr
            };
            let expr = self.parse_unary()?;
            return Some(Expr::Update {
                op,
                prefix: true,
                expr: Box::new(expr),
            });
        }

        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Option<Expr> {
        let expr = self.parse_lhs()?;
        // Postfix update is a restricted production: no line break allowed.
        if (self.at(TokenKind::PlusPlus) || self.at(TokenKind::MinusMinus)) && !self.newline_before()
        {
            let op = if self.bump().kind == TokenKind::PlusPlus {
                UpdateOp::Incr
            } else {
                UpdateOp::Decr
            };
            return Some(Expr::Update {
                op,
                prefix: false,
                expr: Box::new(expr),
            });
        }
        Some(expr)
    }

    /// Member/call chain: `a.b[c](d).e(...)`.
    fn parse_lhs(&mut self) -> Option<Expr> {
        let mut expr = if self.at(TokenKind::KwNew) {
            self.parse_new()?
        } else {
            self.parse_primary()?
        };

        loop {
            match self.peek().kind {
                TokenKind::Dot => {
                    self.bump();
                    let name = self.parse_property_name()?;
                    expr = Expr::Member(Box::new(MemberExpr {
                        object: expr,
                        property: MemberProp::Dot(name),
                    }));
                }
                TokenKind::LBracket => {
                    self.bump();
                    let index = self.parse_expr()?;
                    self.expect(TokenKind::RBracket);
                    expr = Expr::Member(Box::new(MemberExpr {
                        object: expr,
                        property: MemberProp::Computed(index),
                    }));
                }
                TokenKind::LParen => {
                    let args = self.parse_args()?;
                    expr = Expr::Call(Box::new(CallExpr {
                        callee: expr,
                        args,
                    }));
                }
                _ => break,
            }
        }
        Some(expr)
    }

    /// `new Foo.Bar(args)`: member accesses bind tighter than the
    /// constructor call, nested `new` recurses.
    fn parse_new(&mut self) -> Option<Expr> {
        self.expect(TokenKind::KwNew);
        let mut callee = if self.at(TokenKind::KwNew) {
            self.parse_new()?
        } else {
            self.parse_primary()?
        };
        loop {
            match self.peek().kind {
                TokenKind::Dot => {
                    self.bump();
                    let name = self.parse_property_name()?;
                    callee = Expr::Member(Box::new(MemberExpr {
                        object: callee,
                        property: MemberProp::Dot(name),
                    }));
                }
                TokenKind::LBracket => {
                    self.bump();
                    let index = self.parse_expr()?;
                    self.expect(TokenKind::RBracket);
                    callee = Expr::Member(Box::new(MemberExpr {
                        object: callee,
                        property: MemberProp::Computed(index),
                    }));
                }
                _ => break,
            }
        }
        let args = if self.at(TokenKind::LParen) {
            self.parse_args()?
        } else {
            Box::new([])
        };
        Some(Expr::New(Box::new(CallExpr { callee, args })))
    }

    fn parse_args(&mut self) -> Option<Box<[Expr]>> {
        self.expect(TokenKind::LParen);
        let mut args = Vec::new();
        while !self.at(TokenKind::RParen) && !self.at(TokenKind::Eof) {
            args.push(self.parse_assign()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen);
        Some(args.into_boxed_slice())
    }

    /// Property name after `.`, any identifier or keyword (ES5 allows
    /// reserved words as member names).
    fn parse_property_name(&mut self) -> Option<String> {
        let t = self.peek();
        match t.kind {
            TokenKind::Ident
            | TokenKind::KwVar
            | TokenKind::KwFunction
            | TokenKind::KwReturn
            | TokenKind::KwNew
            | TokenKind::KwDelete
            | TokenKind::KwTypeof
            | TokenKind::KwInstanceof
            | TokenKind::KwIn
            | TokenKind::KwThis
            | TokenKind::KwIf
            | TokenKind::KwElse
            | TokenKind::KwFor
            | TokenKind::KwWhile
            | TokenKind::KwDo
            | TokenKind::KwSwitch
            | TokenKind::KwCase
            | TokenKind::KwDefault
            | TokenKind::KwBreak
            | TokenKind::KwContinue
            | TokenKind::KwTry
            | TokenKind::KwCatch
            | TokenKind::KwFinally
            | TokenKind::KwThrow
            | TokenKind::KwVoid
            | TokenKind::KwNull
            | TokenKind::KwTrue
            | TokenKind::KwFalse => {
                self.bump();
                Some(self.text(t).to_string())
            }
            _ => {
                self.error(format!("expected property name, found {:?}", t.kind), t.span);
                None
            }
        }
    }

    fn parse_primary(&mut self) -> Option<Expr> {
        let t = self.peek();
        match t.kind {
            TokenKind::Ident => {
                self.bump();
                Some(Expr::Ident(self.text(t).to_string()))
            }
            TokenKind::Num => {
                self.bump();
                Some(Expr::Num(parse_number(self.text(t))))
            }
            TokenKind::Str => {
                self.bump();
                Some(Expr::Str(unquote(self.text(t))))
            }
            TokenKind::Regex => {
                self.bump();
                Some(Expr::Regex(self.text(t).to_string()))
            }
            TokenKind::KwTrue => {
                self.bump();
                Some(Expr::Bool(true))
            }
            TokenKind::KwFalse => {
                self.bump();
                Some(Expr::Bool(false))
            }
            TokenKind::KwNull => {
                self.bump();
                Some(Expr::Null)
            }
            TokenKind::KwThis => {
                self.bump();
                Some(Expr::This)
            }
            TokenKind::KwFunction => {
                let func = self.parse_function(false)?;
                Some(Expr::Function(Box::new(func)))
            }
            TokenKind::LParen => {
                self.bump();
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RParen);
                Some(inner)
            }
            TokenKind::LBracket => self.parse_array(),
            TokenKind::LBrace => self.parse_object(),
            _ => {
                self.error(format!("expected expression, found {:?}", t.kind), t.span);
                None
            }
        }
    }

    fn parse_array(&mut self) -> Option<Expr> {
        self.expect(TokenKind::LBracket);
        let mut elements: Vec<Option<Expr>> = Vec::new();
        while !self.at(TokenKind::RBracket) && !self.at(TokenKind::Eof) {
            if self.eat(TokenKind::Comma) {
                elements.push(None); // elision
                continue;
            }
            elements.push(Some(self.parse_assign()?));
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RBracket);
        Some(Expr::Array(elements.into_boxed_slice()))
    }

    fn parse_object(&mut self) -> Option<Expr> {
        self.expect(TokenKind::LBrace);
        let mut props: Vec<(PropKey, Expr)> = Vec::new();
        while !self.at(TokenKind::RBrace) && !self.at(TokenKind::Eof) {
            let t = self.peek();
            let key = match t.kind {
                TokenKind::Str => {
                    self.bump();
                    PropKey::Str(unquote(self.text(t)))
                }
                TokenKind::Num => {
                    self.bump();
                    PropKey::Num(parse_number(self.text(t)))
                }
                _ => match self.parse_property_name() {
                    Some(name) => PropKey::Ident(name),
                    None => return None,
                },
            };
            self.expect(TokenKind::Colon);
            let value = self.parse_assign()?;
            props.push((key, value));
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RBrace);
        Some(Expr::Object(props.into_boxed_slice()))
    }
}

/// Parse a numeric literal's text into its value.
pub(crate) fn parse_number(s: &str) -> f64 {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).map(|v| v as f64).unwrap_or(f64::NAN)
    } else {
        s.parse::<f64>().unwrap_or(f64::NAN)
    }
}

/// Strip quotes and process escapes of a string literal.
pub(crate) fn unquote(s: &str) -> String {
    let inner = if s.len() >= 2 { &s[1..s.len() - 1] } else { s };
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('v') => out.push('\u{b}'),
            Some('0') => out.push('\0'),
            Some('x') => {
                let hex: String = chars.by_ref().take(2).collect();
                if let Ok(v) = u32::from_str_radix(&hex, 16) {
                    if let Some(ch) = char::from_u32(v) {
                        out.push(ch);
                    }
                }
            }
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                if let Ok(v) = u32::from_str_radix(&hex, 16) {
                    if let Some(ch) = char::from_u32(v) {
                        out.push(ch);
                    }
                }
            }
            Some('\n') => {} // line continuation
            Some(other) => out.push(other),
            None => break,
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{parse_number, unquote};

    #[test]
    fn number_literals() {
        assert_eq!(parse_number("42"), 42.0);
        assert_eq!(parse_number("0xff"), 255.0);
        assert_eq!(parse_number("1e3"), 1000.0);
        assert_eq!(parse_number(".5"), 0.5);
    }

    #[test]
    fn string_escapes() {
        assert_eq!(unquote("'a\\nb'"), "a\nb");
        assert_eq!(unquote("\"q\\\"q\""), "q\"q");
        assert_eq!(unquote("'\\x41\\u0042'"), "AB");
    }
}
