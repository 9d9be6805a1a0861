mod options;

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process::ExitCode;

use wlisp_lang::{create_environment, interpret, standard_environment, Environment, Error};

use options::Options;

fn main() -> ExitCode {
    env_logger::init();

    let options = match Options::parse() {
        Ok(options) => options,
        Err(e) => {
            eprintln!("wlisp: {e}");
            eprintln!("try `wlisp --help`");
            return ExitCode::FAILURE;
        }
    };

    let env = if options.bare { create_environment() } else { standard_environment() };
    log::debug!("root environment: {}", if options.bare { "bare" } else { "standard" });

    let status = if options.is_interactive() {
        log::debug!("mode: repl");
        repl(&env)
    } else {
        log::debug!("mode: batch ({} expressions, {} files)", options.expressions.len(), options.files.len());
        run_batch(&env, &options)
    };

    if options.dump_env {
        println!("{env}");
    }
    status
}

// ─── Batch ────────────────────────────────────────────────────────────────────

fn run_batch(env: &Environment, options: &Options) -> ExitCode {
    for expr in &options.expressions {
        if let Err(e) = run_source(env, expr, options.print_result) {
            report("<eval>", &e);
            return ExitCode::FAILURE;
        }
    }

    for path in &options.files {
        let name = path.display().to_string();
        if let Err(e) = run_file(env, path, options.print_result) {
            report(&name, &e);
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}

fn run_file(env: &Environment, path: &Path, print_result: bool) -> Result<(), Error> {
    let source = std::fs::read_to_string(path)?;
    log::debug!("running {} ({} bytes)", path.display(), source.len());
    run_source(env, &source, print_result)
}

fn run_source(env: &Environment, source: &str, print_result: bool) -> Result<(), Error> {
    let value = interpret(env, source)?;
    if print_result && !value.is_nil() {
        println!("{value}");
    }
    Ok(())
}

fn report(origin: &str, e: &Error) {
    log::error!("{origin}: {:?}: {e}", e.kind());
    eprintln!("{origin}: {e}");
}

// ─── REPL ─────────────────────────────────────────────────────────────────────

fn repl(env: &Environment) -> ExitCode {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut buffer = String::new();

    loop {
        prompt(if buffer.is_empty() { "wlisp> " } else { "  ...> " });

        let line = match lines.next() {
            Some(Ok(line)) => line,
            Some(Err(e)) => {
                report("<stdin>", &Error::from(e));
                return ExitCode::FAILURE;
            }
            None => break,
        };
        buffer.push_str(&line);
        buffer.push('\n');

        if buffer.trim().is_empty() {
            buffer.clear();
            continue;
        }
        if paren_depth(&buffer) > 0 {
            continue;
        }

        match interpret(env, &buffer) {
            Ok(value) if !value.is_nil() => println!("{value}"),
            Ok(_) => {}
            Err(e) => report("<stdin>", &e),
        }
        buffer.clear();
    }

    if !buffer.trim().is_empty() {
        eprintln!("<stdin>: incomplete form at end of input");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn prompt(text: &str) {
    let mut out = io::stdout().lock();
    let _ = write!(out, "{text}").and_then(|_| out.flush());
}

/// Open minus close parentheses outside strings and comments.
fn paren_depth(source: &str) -> i64 {
    let mut depth = 0;
    let mut chars = source.chars();
    while let Some(c) = chars.next() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            ';' => {
                for c in chars.by_ref() {
                    if c == '\n' { break; }
                }
            }
            '"' => {
                while let Some(c) = chars.next() {
                    match c {
                        '\\' => { chars.next(); }
                        '"' => break,
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }
    depth
}
