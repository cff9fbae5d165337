use std::io::Write;

use tangle_lexer::Lexer;
use tangle_syntax::TokenKind;

use crate::args::CliArgs;
use crate::commands::{emit_diagnostics, read_file};

pub(crate) fn run(args: &CliArgs) {
    if args.positional.len() != 1 {
        eprintln!("Missing <file>");
        std::process::exit(2);
    }
    let path = args.positional[0].as_str();
    let src = read_file(path);
    let lexed = Lexer::new(src.as_str()).lex();
    emit_diagnostics(path, &src, &lexed.diagnostics);

    let mut out = std::io::stdout().lock();
    for t in &lexed.tokens {
        if matches!(t.kind, TokenKind::Eof) {
            continue;
        }
        let text = src.slice(t.span);
        if let Err(e) = writeln!(out, "{:?}\t{:?}\t{}", t.kind, t.span, escape_visible(text)) {
            if e.kind() == std::io::ErrorKind::BrokenPipe {
                return;
            }
            eprintln!("stdout error: {e}");
            std::process::exit(2);
        }
    }
}

fn escape_visible(s: &str) -> String {
    let mut out = String::new();
    for c in s.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}
