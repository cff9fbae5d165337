use tangle_eval::Logger;
use tangle_resolver::{Resolver, ResolverOptions};

use crate::args::CliArgs;

pub(crate) fn run(args: &CliArgs) {
    if args.positional.is_empty() {
        eprintln!("Missing <files>");
        std::process::exit(2);
    }

    let mut options = ResolverOptions::default();
    options.log = Logger::stderr(args.verbosity);
    options
        .global_aliases
        .extend(args.globals.iter().cloned());
    options.read_source = Some(Box::new(|key| std::fs::read_to_string(key).ok()));

    let mut resolver = Resolver::new(options);
    let mut failed = false;
    for key in &args.positional {
        if let Err(e) = resolver.add(key) {
            eprintln!("{e}");
            failed = true;
        }
    }
    if failed {
        std::process::exit(1);
    }

    let order = if args.only.is_empty() {
        resolver.resolve()
    } else {
        match resolver.resolve_only(&args.only) {
            Ok(order) => order,
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
    };

    let mut buf = String::new();
    if args.names_only {
        for key in &order {
            buf.push_str(key);
            buf.push('\n');
        }
    } else {
        for key in &order {
            match std::fs::read_to_string(key) {
                Ok(src) => {
                    buf.push_str(&src);
                    if !src.ends_with('\n') {
                        buf.push('\n');
                    }
                }
                Err(e) => {
                    eprintln!("{key}: {e}");
                    std::process::exit(1);
                }
            }
        }
    }

    match &args.out {
        Some(path) => {
            if let Err(e) = std::fs::write(path, buf) {
                eprintln!("{path}: {e}");
                std::process::exit(1);
            }
        }
        None => print!("{buf}"),
    }
}
