//! Lexer implementation.
//!
//! Scans JavaScript source into tokens in a single linear pass, collecting
//! diagnostics instead of failing. Regex literals are disambiguated from
//! division by looking at the last significant token.
use crate::keywords::KEYWORDS;
use tangle_syntax::{Diagnostic, Span, Token, TokenKind, is_ident_start, is_ident_continue};

/// Lexing result.
pub struct LexResult {
    pub tokens: Vec<Token>,
    pub diagnostics: Vec<Diagnostic>,
}

/// JavaScript lexer.
pub struct Lexer<'a> {
    input: &'a str,
    bytes: &'a [u8],
    i: usize,
    tokens: Vec<Token>,
    diagnostics: Vec<Diagnostic>,
    last_kind: Option<TokenKind>,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer.
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            i: 0,
            tokens: Vec::new(),
            diagnostics: Vec::new(),
            last_kind: None,
        }
    }

    /// Run the lexer and return tokens + diagnostics.
    pub fn lex(mut self) -> LexResult {
        let approx = self.bytes.len().saturating_div(4).max(16);
        self.tokens.reserve(approx);

        while self.i < self.bytes.len() {
            let start = self.i;
            let c = match self.peek_char() {
                Some(c) => c,
                None => break,
            };

            match c {
                ' ' | '\t' | '\r' | '\n' | '\u{0c}' | '\u{0b}' => {
                    self.i += c.len_utf8();
                }
                '/' => {
                    if self.peek_str("//") {
                        self.skip_line_comment();
                    } else if self.peek_str("/*") {
                        self.skip_block_comment(start);
                    } else if self.regex_can_start() {
                        self.lex_regex(start);
                    } else if self.peek_str("/=") {
                        self.i += 2;
                        self.push(TokenKind::SlashEq, start);
                    } else {
                        self.i += 1;
                        self.push(TokenKind::Slash, start);
                    }
                }
                '\'' | '"' => self.lex_string(c),
                '0'..='9' => self.lex_number(),
                '.' => {
                    if self.bytes.get(self.i + 1).is_some_and(|b| b.is_ascii_digit()) {
                        self.lex_number();
                    } else {
                        self.i += 1;
                        self.push(TokenKind::Dot, start);
                    }
                }
                _ if is_ident_start(c) => self.lex_ident_or_keyword(),
                _ => self.lex_punct(c),
            }
        }

        self.tokens.push(Token {
            kind: TokenKind::Eof,
            span: Span::new(self.i as u32, self.i as u32),
        });

        LexResult {
            tokens: self.tokens,
            diagnostics: self.diagnostics,
        }
    }

    /// A `/` starts a regex literal unless the previous significant token
    /// could end an operand (identifier, literal, `)`, `]`, ...).
    fn regex_can_start(&self) -> bool {
        !self.last_kind.is_some_and(|k| k.ends_operand())
    }

    fn skip_line_comment(&mut self) {
        self.i += 2;
        while let Some(ch) = self.peek_char() {
            if ch == '\n' {
                break;
            }
            self.i += ch.len_utf8();
        }
    }

    fn skip_block_comment(&mut self, start: usize) {
        self.i += 2;
        let mut terminated = false;
        while self.i < self.bytes.len() {
            if self.peek_str("*/") {
                self.i += 2;
                terminated = true;
                break;
            }
            let ch = self.peek_char().unwrap();
            self.i += ch.len_utf8();
        }
        if !terminated {
            self.diagnostics.push(Diagnostic::error(
                "unterminated block comment",
                Some(Span::new(start as u32, self.i as u32)),
            ));
        }
    }

    fn lex_string(&mut self, quote: char) {
        let start = self.i;
        self.i += 1;
        while self.i < self.bytes.len() {
            let ch = self.peek_char().unwrap();
            if ch == '\n' || ch == '\r' {
                break;
            }
            if ch == quote {
                self.i += 1;
                self.push(TokenKind::Str, start);
                return;
            }
            if ch == '\\' {
                self.i += 1;
                if let Some(esc) = self.peek_char() {
                    self.i += esc.len_utf8();
                }
                continue;
            }
            self.i += ch.len_utf8();
        }
        self.diagnostics.push(Diagnostic::error(
            "unterminated string literal",
            Some(Span::new(start as u32, self.i as u32)),
        ));
        self.push(TokenKind::Str, start);
    }

    fn lex_regex(&mut self, start: usize) {
        self.i += 1;
        let mut in_class = false;
        let mut terminated = false;
        while self.i < self.bytes.len() {
            let ch = self.peek_char().unwrap();
            if ch == '\n' || ch == '\r' {
                break;
            }
            if ch == '\\' {
                self.i += 1;
                if let Some(esc) = self.peek_char() {
                    self.i += esc.len_utf8();
                }
                continue;
            }
            if ch == '[' {
                in_class = true;
            } else if ch == ']' {
                in_class = false;
            } else if ch == '/' && !in_class {
                self.i += 1;
                terminated = true;
                break;
            }
            self.i += ch.len_utf8();
        }
        if !terminated {
            self.diagnostics.push(Diagnostic::error(
                "unterminated regular expression literal",
                Some(Span::new(start as u32, self.i as u32)),
            ));
        }
        // flags
        while let Some(ch) = self.peek_char() {
            if is_ident_continue(ch) {
                self.i += ch.len_utf8();
            } else {
                break;
            }
        }
        self.push(TokenKind::Regex, start);
    }

    fn lex_number(&mut self) {
        let start = self.i;
        if self.peek_str("0x") || self.peek_str("0X") {
            self.i += 2;
            let mut digits = 0usize;
            while self
                .peek_char()
                .is_some_and(|ch| ch.is_ascii_hexdigit())
            {
                self.i += 1;
                digits += 1;
            }
            if digits == 0 {
                self.diagnostics.push(Diagnostic::error(
                    "missing hexadecimal digits",
                    Some(Span::new(start as u32, self.i as u32)),
                ));
            }
            self.push(TokenKind::Num, start);
            return;
        }

        while self.peek_char().is_some_and(|ch| ch.is_ascii_digit()) {
            self.i += 1;
        }
        if self.peek_char() == Some('.') {
            self.i += 1;
            while self.peek_char().is_some_and(|ch| ch.is_ascii_digit()) {
                self.i += 1;
            }
        }
        if matches!(self.peek_char(), Some('e' | 'E')) {
            let exp_start = self.i;
            self.i += 1;
            if matches!(self.peek_char(), Some('+' | '-')) {
                self.i += 1;
            }
            let mut digits = 0usize;
            while self.peek_char().is_some_and(|ch| ch.is_ascii_digit()) {
                self.i += 1;
                digits += 1;
            }
            if digits == 0 {
                self.i = exp_start;
            }
        }
        self.push(TokenKind::Num, start);
    }

    fn lex_ident_or_keyword(&mut self) {
        let start = self.i;
        self.i += self.peek_char().unwrap().len_utf8();
        while self.peek_char().is_some_and(is_ident_continue) {
            self.i += self.peek_char().unwrap().len_utf8();
        }
        let s = &self.input[start..self.i];
        let kind = KEYWORDS.get(s).copied().unwrap_or(TokenKind::Ident);
        self.push(kind, start);
    }

    fn lex_punct(&mut self, c: char) {
        let start = self.i;
        let kind = match c {
            '(' => self.one(TokenKind::LParen),
            ')' => self.one(TokenKind::RParen),
            '[' => self.one(TokenKind::LBracket),
            ']' => self.one(TokenKind::RBracket),
            '{' => self.one(TokenKind::LBrace),
            '}' => self.one(TokenKind::RBrace),
            ',' => self.one(TokenKind::Comma),
            ';' => self.one(TokenKind::Semi),
            ':' => self.one(TokenKind::Colon),
            '?' => self.one(TokenKind::Question),
            '~' => self.one(TokenKind::Tilde),
            '+' => {
                if self.peek_str("++") {
                    self.take(2, TokenKind::PlusPlus)
                } else if self.peek_str("+=") {
                    self.take(2, TokenKind::PlusEq)
                } else {
                    self.one(TokenKind::Plus)
                }
            }
            '-' => {
                if self.peek_str("--") {
                    self.take(2, TokenKind::MinusMinus)
                } else if self.peek_str("-=") {
                    self.take(2, TokenKind::MinusEq)
                } else {
                    self.one(TokenKind::Minus)
                }
            }
            '*' => {
                if self.peek_str("*=") {
                    self.take(2, TokenKind::StarEq)
                } else {
                    self.one(TokenKind::Star)
                }
            }
            '%' => {
                if self.peek_str("%=") {
                    self.take(2, TokenKind::PercentEq)
                } else {
                    self.one(TokenKind::Percent)
                }
            }
            '&' => {
                if self.peek_str("&&") {
                    self.take(2, TokenKind::AmpAmp)
                } else if self.peek_str("&=") {
                    self.take(2, TokenKind::AmpEq)
                } else {
                    self.one(TokenKind::Amp)
                }
            }
            '|' => {
                if self.peek_str("||") {
                    self.take(2, TokenKind::PipePipe)
                } else if self.peek_str("|=") {
                    self.take(2, TokenKind::PipeEq)
                } else {
                    self.one(TokenKind::Pipe)
                }
            }
            '^' => {
                if self.peek_str("^=") {
                    self.take(2, TokenKind::CaretEq)
                } else {
                    self.one(TokenKind::Caret)
                }
            }
            '<' => {
                if self.peek_str("<<=") {
                    self.take(3, TokenKind::ShlEq)
                } else if self.peek_str("<<") {
                    self.take(2, TokenKind::Shl)
                } else if self.peek_str("<=") {
                    self.take(2, TokenKind::Le)
                } else {
                    self.one(TokenKind::Lt)
                }
            }
            '>' => {
                if self.peek_str(">>>=") {
                    self.take(4, TokenKind::UShrEq)
                } else if self.peek_str(">>>") {
                    self.take(3, TokenKind::UShr)
                } else if self.peek_str(">>=") {
                    self.take(3, TokenKind::ShrEq)
                } else if self.peek_str(">>") {
                    self.take(2, TokenKind::Shr)
                } else if self.peek_str(">=") {
                    self.take(2, TokenKind::Ge)
                } else {
                    self.one(TokenKind::Gt)
                }
            }
            '=' => {
                if self.peek_str("===") {
                    self.take(3, TokenKind::EqEqEq)
                } else if self.peek_str("==") {
                    self.take(2, TokenKind::EqEq)
                } else {
                    self.one(TokenKind::Eq)
                }
            }
            '!' => {
                if self.peek_str("!==") {
                    self.take(3, TokenKind::NeStrict)
                } else if self.peek_str("!=") {
                    self.take(2, TokenKind::Ne)
                } else {
                    self.one(TokenKind::Bang)
                }
            }
            _ => {
                self.i += c.len_utf8();
                self.diagnostics.push(Diagnostic::error(
                    format!("unexpected character `{c}`"),
                    Some(Span::new(start as u32, self.i as u32)),
                ));
                return;
            }
        };
        self.push(kind, start);
    }

    fn one(&mut self, kind: TokenKind) -> TokenKind {
        self.i += 1;
        kind
    }

    fn take(&mut self, n: usize, kind: TokenKind) -> TokenKind {
        self.i += n;
        kind
    }

    fn push(&mut self, kind: TokenKind, start: usize) {
        self.tokens.push(Token {
            kind,
            span: Span::new(start as u32, self.i as u32),
        });
        self.last_kind = Some(kind);
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.i..].chars().next()
    }

    fn peek_str(&self, s: &str) -> bool {
        self.input[self.i..].starts_with(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        let lex = Lexer::new(src).lex();
        assert!(lex.diagnostics.is_empty(), "{:?}", lex.diagnostics);
        lex.tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn keywords_and_idents() {
        assert_eq!(
            kinds("var foo = function() {};"),
            vec![
                TokenKind::KwVar,
                TokenKind::Ident,
                TokenKind::Eq,
                TokenKind::KwFunction,
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::Semi,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn regex_vs_division() {
        // After an identifier, `/` is division.
        assert_eq!(
            kinds("a / b"),
            vec![TokenKind::Ident, TokenKind::Slash, TokenKind::Ident, TokenKind::Eof]
        );
        // After `=`, `/` starts a regex literal.
        assert_eq!(
            kinds("a = /b[/]c/g"),
            vec![TokenKind::Ident, TokenKind::Eq, TokenKind::Regex, TokenKind::Eof]
        );
    }

    #[test]
    fn numbers() {
        assert_eq!(
            kinds("0 1.5 0xff 1e3 .25"),
            vec![
                TokenKind::Num,
                TokenKind::Num,
                TokenKind::Num,
                TokenKind::Num,
                TokenKind::Num,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn strings_and_comments() {
        assert_eq!(
            kinds("'a\\'b' \"c\" // line\n/* block */ d"),
            vec![TokenKind::Str, TokenKind::Str, TokenKind::Ident, TokenKind::Eof]
        );
    }

    #[test]
    fn unterminated_string_is_diagnostic_not_panic() {
        let lex = Lexer::new("var a = 'oops").lex();
        assert!(lex.diagnostics.iter().any(|d| d.is_error()));
    }

    #[test]
    fn maximal_munch_operators() {
        assert_eq!(
            kinds("a >>>= b === c !== d"),
            vec![
                TokenKind::Ident,
                TokenKind::UShrEq,
                TokenKind::Ident,
                TokenKind::EqEqEq,
                TokenKind::Ident,
                TokenKind::NeStrict,
                TokenKind::Ident,
                TokenKind::Eof
            ]
        );
    }
}
