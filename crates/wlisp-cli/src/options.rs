use std::path::PathBuf;

pub struct Options {
    pub expressions: Vec<String>,
    pub files: Vec<PathBuf>,
    pub bare: bool,
    pub print_result: bool,
    pub dump_env: bool,
}

impl Options {
    pub fn parse() -> Result<Self, String> {
        parse(pico_args::Arguments::from_env())
    }

    /// No script and no `-e`: read forms from stdin.
    pub fn is_interactive(&self) -> bool {
        self.expressions.is_empty() && self.files.is_empty()
    }
}

fn print_usage() {
    println!("Usage: wlisp [options] [FILE...]");
    println!("Options:");
    println!("  -h, --help: Print this help message");
    println!("  -e, --eval <expr>: Interpret <expr> (repeatable, runs before files)");
    println!("  --bare: Start from an empty root environment without the prelude");
    println!("  --print-result: Print the non-nil result of each expression and file");
    println!("  --dump-env: Print the root environment after running");
    println!("Each FILE holds one top-level form. Without inputs, starts a REPL on stdin.");
}

fn parse(mut args: pico_args::Arguments) -> Result<Options, String> {
    if args.contains(["-h", "--help"]) {
        print_usage();
        std::process::exit(0);
    }

    let expressions = args
        .values_from_str::<_, String>(["-e", "--eval"])
        .map_err(|e| e.to_string())?;
    let bare = args.contains("--bare");
    let print_result = args.contains("--print-result");
    let dump_env = args.contains("--dump-env");

    let mut files = Vec::new();
    for free in args.finish() {
        let text = free.to_string_lossy();
        if text.starts_with('-') {
            return Err(format!("unknown option `{text}`"));
        }
        files.push(PathBuf::from(free));
    }

    Ok(Options { expressions, files, bare, print_result, dump_env })
}
