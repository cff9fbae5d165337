//! Parser core.
//!
//! Converts lexer tokens into a `Program` and collects diagnostics. Statement
//! parsing is recursive descent; expressions use precedence climbing. Parse
//! errors are recovered at statement boundaries so one bad construct does not
//! abort the whole file.
use tangle_syntax::{Diagnostic, Span, Token, TokenKind};

use crate::{Program, Stmt};

/// Parse result.
pub struct ParseResult {
    pub program: Program,
    pub diagnostics: Vec<Diagnostic>,
}

/// ES5 parser.
pub struct Parser<'a> {
    pub(crate) input: &'a str,
    pub(crate) tokens: &'a [Token],
    pub(crate) i: usize,
    pub(crate) diagnostics: Vec<Diagnostic>,
    /// Suppresses the `in` operator while parsing a `for (init; ...)` head.
    pub(crate) no_in: bool,
}

impl<'a> Parser<'a> {
    /// Create a new parser.
    pub fn new(input: &'a str, tokens: &'a [Token]) -> Self {
        Self {
            input,
            tokens,
            i: 0,
            diagnostics: Vec::with_capacity(8),
            no_in: false,
        }
    }

    /// Parse the full input and return a program plus diagnostics.
    pub fn parse(mut self) -> ParseResult {
        let mut body: Vec<Stmt> = Vec::with_capacity(8);
        while !self.at(TokenKind::Eof) {
            match self.parse_stmt() {
                Some(stmt) => body.push(stmt),
                None => self.recover_stmt(),
            }
        }

        ParseResult {
            program: Program { body: body.into() },
            diagnostics: self.diagnostics,
        }
    }

    pub(crate) fn at(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    pub(crate) fn peek(&self) -> Token {
        self.tokens
            .get(self.i)
            .copied()
            .unwrap_or(Token {
                kind: TokenKind::Eof,
                span: Span::new(self.input.len() as u32, self.input.len() as u32),
            })
    }

    pub(crate) fn bump(&mut self) -> Token {
        let t = self.peek();
        if self.i < self.tokens.len() {
            self.i += 1;
        }
        t
    }

    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, kind: TokenKind) -> bool {
        if self.eat(kind) {
            return true;
        }
        let t = self.peek();
        self.error(format!("expected {kind:?}, found {:?}", t.kind), t.span);
        false
    }

    pub(crate) fn text(&self, token: Token) -> &'a str {
        &self.input[token.span.start.0 as usize..token.span.end.0 as usize]
    }

    pub(crate) fn error(&mut self, message: impl Into<String>, span: Span) {
        self.diagnostics.push(Diagnostic::error(message, Some(span)));
    }

    /// True when a line break separates the previous token from the next one.
    /// Used for the restricted productions (`return`, postfix `++`/`--`) and
    /// for automatic statement termination.
    pub(crate) fn newline_before(&self) -> bool {
        if self.i == 0 {
            return false;
        }
        let prev_end = self.tokens[self.i - 1].span.end.0 as usize;
        let next_start = self.peek().span.start.0 as usize;
        self.input[prev_end..next_start.min(self.input.len())].contains('\n')
    }

    /// Consume an explicit or automatic statement terminator.
    pub(crate) fn terminate_stmt(&mut self) {
        if self.eat(TokenKind::Semi) {
            return;
        }
        if self.at(TokenKind::RBrace) || self.at(TokenKind::Eof) || self.newline_before() {
            return;
        }
        let t = self.peek();
        self.error(format!("expected `;`, found {:?}", t.kind), t.span);
    }

    /// Skip to the next plausible statement boundary.
    pub(crate) fn recover_stmt(&mut self) {
        let mut depth = 0i32;
        loop {
            let t = self.peek();
            match t.kind {
                TokenKind::Eof => return,
                TokenKind::Semi if depth == 0 => {
                    self.bump();
                    return;
                }
                TokenKind::LBrace | TokenKind::LParen | TokenKind::LBracket => {
                    depth += 1;
                    self.bump();
                }
                TokenKind::RBrace | TokenKind::RParen | TokenKind::RBracket => {
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                    self.bump();
                }
                _ => {
                    self.bump();
                }
            }
        }
    }
}
