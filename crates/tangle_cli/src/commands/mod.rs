pub(crate) mod ast;
pub(crate) mod resolve;
pub(crate) mod tokens;

use tangle_syntax::{Diagnostic, SourceText};

pub(crate) fn read_file(path: &str) -> SourceText {
    match std::fs::read_to_string(path) {
        Ok(src) => SourceText::new(src),
        Err(e) => {
            eprintln!("{path}: {e}");
            std::process::exit(2);
        }
    }
}

pub(crate) fn emit_diagnostics(path: &str, src: &SourceText, diagnostics: &[Diagnostic]) -> bool {
    let mut had_error = false;
    for d in diagnostics {
        had_error |= d.is_error();
        let severity = if d.is_error() { "error" } else { "warning" };
        match d.span {
            Some(span) => {
                let (line, col) = src.line_col(span.start.0);
                eprintln!("{path}:{}:{}: {severity}: {}", line + 1, col + 1, d.message);
            }
            None => eprintln!("{path}: {severity}: {}", d.message),
        }
    }
    had_error
}
