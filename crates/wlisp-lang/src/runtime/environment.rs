//! Lexical scopes.
//!
//! An `Environment` is a shared handle to one scope in a chain. Cloning the
//! handle shares the scope; closures keep their defining scope alive this way.
//! Parents are fixed at creation, so chains never form cycles.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::runtime::variant::{CallSite, Variant};

/// Where `print-line` writes. Inherited by child scopes.
pub type Output = Rc<RefCell<dyn Write>>;

struct Scope {
    bindings: HashMap<String, Variant>,
    parent: Option<Environment>,
    output: Option<Output>,
}

#[derive(Clone)]
pub struct Environment(Rc<RefCell<Scope>>);

impl Environment {
    /// A root scope with no parent, printing to stdout.
    pub fn new() -> Self {
        Self::from_scope(None, None)
    }

    pub fn with_parent(parent: &Environment) -> Self {
        Self::from_scope(Some(parent.clone()), None)
    }

    /// A root scope whose `print-line` output (and that of every descendant)
    /// goes to `output`.
    pub fn with_output(output: Output) -> Self {
        Self::from_scope(None, Some(output))
    }

    fn from_scope(parent: Option<Environment>, output: Option<Output>) -> Self {
        Self(Rc::new(RefCell::new(Scope { bindings: HashMap::new(), parent, output })))
    }

    pub fn parent(&self) -> Option<Environment> {
        self.0.borrow().parent.clone()
    }

    pub fn ptr_eq(&self, other: &Environment) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    // ─── Bindings ─────────────────────────────────────────────────────────────

    /// The nearest scope in the chain that binds `name`.
    fn owner(&self, name: &str) -> Option<Environment> {
        let mut current = self.clone();
        loop {
            let parent = {
                let scope = current.0.borrow();
                if scope.bindings.contains_key(name) {
                    break;
                }
                scope.parent.clone()
            };
            current = parent?;
        }
        Some(current)
    }

    pub fn has(&self, name: &str) -> bool {
        self.owner(name).is_some()
    }

    pub fn get(&self, name: &str) -> Result<Variant> {
        self.owner(name)
            .and_then(|env| env.0.borrow().bindings.get(name).cloned())
            .ok_or_else(|| Error::unbound(name))
    }

    /// Define-or-mutate: overwrite the nearest existing binding, or create one
    /// in this scope when the name is bound nowhere in the chain.
    pub fn set(&self, name: &str, value: Variant) {
        let target = self.owner(name).unwrap_or_else(|| self.clone());
        target.0.borrow_mut().bindings.insert(name.to_string(), value);
    }

    /// Bind in this scope only, shadowing any outer binding.
    pub fn define(&self, name: &str, value: Variant) {
        self.0.borrow_mut().bindings.insert(name.to_string(), value);
    }

    /// Bind a native procedure under `name` via `set`.
    pub fn register<F>(&self, name: &str, func: F)
    where
        F: Fn(&CallSite, &Environment, &[Variant]) -> Result<Variant> + 'static,
    {
        self.set(name, Variant::native(name, func));
    }

    /// Names bound directly in this scope, sorted.
    pub fn local_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.0.borrow().bindings.keys().cloned().collect();
        names.sort();
        names
    }

    // ─── Output ───────────────────────────────────────────────────────────────

    fn output(&self) -> Option<Output> {
        let mut current = Some(self.clone());
        while let Some(env) = current {
            let scope = env.0.borrow();
            if let Some(out) = &scope.output {
                return Some(out.clone());
            }
            current = scope.parent.clone();
        }
        None
    }

    /// Write `text` and a newline to the nearest sink in the chain, or stdout.
    pub fn write_line(&self, text: &str) -> Result<()> {
        match self.output() {
            Some(out) => {
                let mut out = out.borrow_mut();
                writeln!(out, "{text}")?;
                out.flush()?;
            }
            None => {
                let mut out = std::io::stdout().lock();
                writeln!(out, "{text}")?;
                out.flush()?;
            }
        }
        Ok(())
    }
}

impl Default for Environment {
    fn default() -> Self { Self::new() }
}

/// `{a=10, b=2}, {x=1}`: innermost scope first, keys sorted.
impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut current = Some(self.clone());
        let mut first = true;
        while let Some(env) = current {
            if !first { f.write_str(", ")?; }
            first = false;

            let scope = env.0.borrow();
            f.write_str("{")?;
            for (i, name) in env.local_names().iter().enumerate() {
                if i > 0 { f.write_str(", ")?; }
                write!(f, "{name}={}", scope.bindings[name])?;
            }
            f.write_str("}")?;
            current = scope.parent.clone();
        }
        Ok(())
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment({self})")
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
