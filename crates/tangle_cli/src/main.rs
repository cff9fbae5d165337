mod args;
mod commands;

#[cfg(not(target_env = "msvc"))]
use mimalloc::MiMalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() {
    let args = match args::parse_args() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };
    match args.cmd.as_str() {
        "resolve" => commands::resolve::run(&args),
        "tokens" => commands::tokens::run(&args),
        "ast" => commands::ast::run(&args),
        _ => {
            eprintln!("{}", args::usage());
            std::process::exit(2);
        }
    }
}
