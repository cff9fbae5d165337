//! ES5 keyword table.
use phf::phf_map;
use tangle_syntax::TokenKind;

pub static KEYWORDS: phf::Map<&'static str, TokenKind> = phf_map! {
    "var" => TokenKind::KwVar,
    "function" => TokenKind::KwFunction,
    "return" => TokenKind::KwReturn,
    "new" => TokenKind::KwNew,
    "delete" => TokenKind::KwDelete,
    "typeof" => TokenKind::KwTypeof,
    "instanceof" => TokenKind::KwInstanceof,
    "in" => TokenKind::KwIn,
    "this" => TokenKind::KwThis,
    "if" => TokenKind::KwIf,
    "else" => TokenKind::KwElse,
    "for" => TokenKind::KwFor,
    "while" => TokenKind::KwWhile,
    "do" => TokenKind::KwDo,
    "switch" => TokenKind::KwSwitch,
    "case" => TokenKind::KwCase,
    "default" => TokenKind::KwDefault,
    "break" => TokenKind::KwBreak,
    "continue" => TokenKind::KwContinue,
    "try" => TokenKind::KwTry,
    "catch" => TokenKind::KwCatch,
    "finally" => TokenKind::KwFinally,
    "throw" => TokenKind::KwThrow,
    "void" => TokenKind::KwVoid,
    "null" => TokenKind::KwNull,
    "true" => TokenKind::KwTrue,
    "false" => TokenKind::KwFalse,
};
