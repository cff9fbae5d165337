//! Token definitions for the ES5 subset Tangle understands.
use crate::Span;

/// Token kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier.
    Ident,
    /// Numeric literal (decimal, float, or hex).
    Num,
    /// String literal (single or double quoted).
    Str,
    /// Regular expression literal.
    Regex,

    /// `var`
    KwVar,
    /// `function`
    KwFunction,
    /// `return`
    KwReturn,
    /// `new`
    KwNew,
    /// `delete`
    KwDelete,
    /// `typeof`
    KwTypeof,
    /// `instanceof`
    KwInstanceof,
    /// `in`
    KwIn,
    /// `this`
    KwThis,
    /// `if`
    KwIf,
    /// `else`
    KwElse,
    /// `for`
    KwFor,
    /// `while`
    KwWhile,
    /// `do`
    KwDo,
    /// `switch`
    KwSwitch,
    /// `case`
    KwCase,
    /// `default`
    KwDefault,
    /// `break`
    KwBreak,
    /// `continue`
    KwContinue,
    /// `try`
    KwTry,
    /// `catch`
    KwCatch,
    /// `finally`
    KwFinally,
    /// `throw`
    KwThrow,
    /// `void`
    KwVoid,
    /// `null`
    KwNull,
    /// `true`
    KwTrue,
    /// `false`
    KwFalse,

    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `{`
    LBrace,
    /// `}`
    RBrace,

    /// `.`
    Dot,
    /// `,`
    Comma,
    /// `;`
    Semi,
    /// `:`
    Colon,
    /// `?`
    Question,

    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,

    /// `++`
    PlusPlus,
    /// `--`
    MinusMinus,

    /// `&`
    Amp,
    /// `|`
    Pipe,
    /// `^`
    Caret,
    /// `~`
    Tilde,
    /// `<<`
    Shl,
    /// `>>`
    Shr,
    /// `>>>`
    UShr,

    /// `&&`
    AmpAmp,
    /// `||`
    PipePipe,
    /// `!`
    Bang,

    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    Le,
    /// `>=`
    Ge,
    /// `==`
    EqEq,
    /// `!=`
    Ne,
    /// `===`
    EqEqEq,
    /// `!==`
    NeStrict,

    /// `=`
    Eq,
    /// `+=`
    PlusEq,
    /// `-=`
    MinusEq,
    /// `*=`
    StarEq,
    /// `/=`
    SlashEq,
    /// `%=`
    PercentEq,
    /// `&=`
    AmpEq,
    /// `|=`
    PipeEq,
    /// `^=`
    CaretEq,
    /// `<<=`
    ShlEq,
    /// `>>=`
    ShrEq,
    /// `>>>=`
    UShrEq,

    /// End of file.
    Eof,
}

impl TokenKind {
    /// True for tokens after which a `/` starts a division rather than a
    /// regex literal.
    pub fn ends_operand(self) -> bool {
        matches!(
            self,
            TokenKind::Ident
                | TokenKind::Num
                | TokenKind::Str
                | TokenKind::Regex
                | TokenKind::KwThis
                | TokenKind::KwNull
                | TokenKind::KwTrue
                | TokenKind::KwFalse
                | TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::PlusPlus
                | TokenKind::MinusMinus
        )
    }
}

/// Token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}
