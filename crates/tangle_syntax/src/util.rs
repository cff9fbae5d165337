//! Character classes for JavaScript identifiers.

/// True if `c` can start an identifier (`$` and `_` are identifier chars in JS).
pub fn is_ident_start(c: char) -> bool {
    c == '$' || c == '_' || c.is_alphabetic()
}

/// True if `c` can continue an identifier.
pub fn is_ident_continue(c: char) -> bool {
    c == '$' || c == '_' || c.is_alphanumeric()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dollar_and_underscore_are_identifier_chars() {
        assert!(is_ident_start('$'));
        assert!(is_ident_start('_'));
        assert!(!is_ident_start('1'));
        assert!(is_ident_continue('1'));
        assert!(!is_ident_continue('-'));
    }
}
