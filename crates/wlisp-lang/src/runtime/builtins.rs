//! Native procedures installed by [`standard_environment`].
//! Nothing here is global: a host that wants none of it uses a bare root.

use crate::error::{Error, ErrorCode, Result};
use crate::runtime::environment::Environment;
use crate::runtime::variant::{CallSite, Variant};

/// A root environment with the standard natives registered.
pub fn standard_environment() -> Environment {
    let env = Environment::new();
    install(&env);
    env
}

/// Register every standard native into `env` with define-or-mutate `set`.
pub fn install(env: &Environment) {
    // Lists
    env.register("list", |_, _, args| Ok(Variant::List(args.to_vec())));
    env.register("length", length);
    env.register("first", first);
    env.register("rest", rest);
    env.register("nth", nth);

    // Logic
    env.register("not", |site, _, args| {
        site.check_argc(args, 1)?;
        Ok(Variant::Boolean(!arg_bool(site, args, 0)?))
    });

    // Math
    env.register("abs", |site, _, args| unary(site, args, f64::abs));
    env.register("sqrt", |site, _, args| unary(site, args, f64::sqrt));
    env.register("floor", |site, _, args| unary(site, args, f64::floor));
    env.register("min", |site, _, args| binary(site, args, f64::min));
    env.register("max", |site, _, args| binary(site, args, f64::max));

    // Strings
    env.register("string-append", |_, _, args| {
        Ok(Variant::String(args.iter().map(Variant::render).collect()))
    });
    env.register("number->string", |site, _, args| {
        site.check_argc(args, 1)?;
        Ok(Variant::String(Variant::Number(arg_number(site, args, 0)?).render()))
    });

    // Higher order
    env.register("apply", apply);
}

// ─── Natives ──────────────────────────────────────────────────────────────────

fn length(site: &CallSite, _: &Environment, args: &[Variant]) -> Result<Variant> {
    site.check_argc(args, 1)?;
    let n = match &args[0] {
        Variant::List(items) => items.len(),
        Variant::String(s) => s.chars().count(),
        other => return Err(arg_error(site, 0, "list or string", other)),
    };
    Ok(Variant::Number(n as f64))
}

fn first(site: &CallSite, _: &Environment, args: &[Variant]) -> Result<Variant> {
    site.check_argc(args, 1)?;
    arg_list(site, args, 0)?.first().cloned()
        .ok_or_else(|| empty_list(site))
}

fn rest(site: &CallSite, _: &Environment, args: &[Variant]) -> Result<Variant> {
    site.check_argc(args, 1)?;
    match arg_list(site, args, 0)?.split_first() {
        Some((_, tail)) => Ok(Variant::List(tail.to_vec())),
        None => Err(empty_list(site)),
    }
}

fn nth(site: &CallSite, _: &Environment, args: &[Variant]) -> Result<Variant> {
    site.check_argc(args, 2)?;
    let items = arg_list(site, args, 0)?;
    let index = arg_number(site, args, 1)?;
    if index < 0.0 || index.fract() != 0.0 || index as usize >= items.len() {
        return Err(Error::new(ErrorCode::R002, format!(
            "`{}` index {index} out of range for list of length {}", site.name, items.len()
        )).at(site.span));
    }
    Ok(items[index as usize].clone())
}

fn apply(site: &CallSite, env: &Environment, args: &[Variant]) -> Result<Variant> {
    site.check_argc(args, 2)?;
    let callable = args[0].callable().map_err(|e| e.at(site.span))?;
    let list = arg_list(site, args, 1)?;
    callable.call(site, env, list)
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn unary(site: &CallSite, args: &[Variant], f: fn(f64) -> f64) -> Result<Variant> {
    site.check_argc(args, 1)?;
    Ok(Variant::Number(f(arg_number(site, args, 0)?)))
}

fn binary(site: &CallSite, args: &[Variant], f: fn(f64, f64) -> f64) -> Result<Variant> {
    site.check_argc(args, 2)?;
    Ok(Variant::Number(f(arg_number(site, args, 0)?, arg_number(site, args, 1)?)))
}

fn arg_number(site: &CallSite, args: &[Variant], i: usize) -> Result<f64> {
    match &args[i] {
        Variant::Number(n) => Ok(*n),
        other => Err(arg_error(site, i, "number", other)),
    }
}

fn arg_bool(site: &CallSite, args: &[Variant], i: usize) -> Result<bool> {
    match &args[i] {
        Variant::Boolean(b) => Ok(*b),
        other => Err(arg_error(site, i, "boolean", other)),
    }
}

fn arg_list<'a>(site: &CallSite, args: &'a [Variant], i: usize) -> Result<&'a [Variant]> {
    match &args[i] {
        Variant::List(items) => Ok(items),
        other => Err(arg_error(site, i, "list", other)),
    }
}

fn arg_error(site: &CallSite, i: usize, expected: &str, found: &Variant) -> Error {
    Error::new(ErrorCode::R002, format!(
        "`{}` argument {} expects {expected}, got {}", site.name, i + 1, found.type_name()
    )).at(site.span)
}

fn empty_list(site: &CallSite) -> Error {
    Error::new(ErrorCode::R002, format!("`{}` expects a non-empty list", site.name)).at(site.span)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
