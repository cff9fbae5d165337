use tangle_lexer::Lexer;
use tangle_parser::Parser;

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
    let parsed = Parser::new(src.as_str(), &lexed.tokens).parse();
    let had_error = emit_diagnostics(path, &src, &lexed.diagnostics)
        | emit_diagnostics(path, &src, &parsed.diagnostics);
    println!("{:#?}", parsed.program);
    if had_error {
        std::process::exit(1);
    }
}
