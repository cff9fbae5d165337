pub(crate) struct CliArgs {
    pub cmd: String,
    pub names_only: bool,
    pub verbosity: u8,
    pub out: Option<String>,
    pub globals: Vec<String>,
    pub only: Vec<String>,
    pub positional: Vec<String>,
}

pub(crate) fn usage() -> &'static str {
    "Usage: tangle <resolve|tokens|ast> [names-only] [verbose] [out=FILE] [globals=a,b] [only=path,...] <files>"
}

pub(crate) fn parse_args() -> Result<CliArgs, String> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();
    let cmd = argv.first().cloned().ok_or_else(|| usage().to_string())?;
    argv.remove(0);

    let mut names_only = false;
    let mut verbosity: u8 = 0;
    let mut out: Option<String> = None;
    let mut globals: Vec<String> = Vec::new();
    let mut only: Vec<String> = Vec::new();
    let mut positional: Vec<String> = Vec::new();

    for a in argv {
        if a.starts_with("--") {
            return Err(format!("Unknown option: {a}"));
        }
        if a == "names-only" {
            names_only = true;
        } else if a == "verbose" {
            verbosity = verbosity.saturating_add(1);
        } else if let Some(path) = a.strip_prefix("out=") {
            out = Some(path.to_string());
        } else if let Some(list) = a.strip_prefix("globals=") {
            globals.extend(list.split(',').filter(|s| !s.is_empty()).map(String::from));
        } else if let Some(list) = a.strip_prefix("only=") {
            only.extend(list.split(',').filter(|s| !s.is_empty()).map(String::from));
        } else {
            positional.push(a);
        }
    }

    Ok(CliArgs {
        cmd,
        names_only,
        verbosity,
        out,
        globals,
        only,
        positional,
    })
}
