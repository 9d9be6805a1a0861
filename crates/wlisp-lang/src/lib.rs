pub mod syntax;
pub mod runtime;
pub mod error;

pub use error::{Error, ErrorCode, ErrorKind};
pub use syntax::ast::{Ast, Span};
pub use syntax::token::{Token, TokenKind};
pub use runtime::environment::{Environment, Output};
pub use runtime::variant::{CallSite, Callable, Variant};
pub use runtime::builtins::standard_environment;

// ─── Public API ───────────────────────────────────────────────────────────────

/// A new root scope with no parent and nothing bound.
pub fn create_environment() -> Environment {
    Environment::new()
}

/// A new scope chained under `parent`.
pub fn create_child_environment(parent: &Environment) -> Environment {
    Environment::with_parent(parent)
}

/// Lex, parse and execute one top-level form against `env`.
///
/// Hosts extend the language by binding natives before calling this:
///
/// ```
/// use wlisp_lang::{create_environment, interpret, Variant};
///
/// let env = create_environment();
/// env.register("addition", |site, _, args| {
///     site.check_argc(args, 2)?;
///     args[0].add(&args[1])
/// });
/// assert_eq!(interpret(&env, "(addition 5 4)").unwrap(), Variant::Number(9.0));
/// ```
pub fn interpret(env: &Environment, source: &str) -> Result<Variant, Error> {
    let tokens = syntax::lexer::Lexer::new(source).tokenize()?;
    log::debug!("lexed {} tokens", tokens.len());
    let ast = syntax::parser::parse(tokens)?;
    log::debug!("parsed top-level form at {}:{}", ast.span().line, ast.span().column);
    ast.execute(env, &[])
}
