use std::fmt;
use std::rc::Rc;

use crate::error::{Error, ErrorCode, Result};
use crate::runtime::environment::Environment;
use crate::syntax::ast::{Ast, Span};
use crate::syntax::token::Token;

/// Numbers closer than this compare equal under `=`.
pub const NUMBER_EPSILON: f64 = 1e-5;

/// The runtime value flowing through evaluation. Exactly one case is active;
/// the typed accessors fail with a type mismatch on any other case.
#[derive(Debug, Clone, Default)]
pub enum Variant {
    #[default]
    Nil,
    Number(f64),
    String(String),
    Boolean(bool),
    List(Vec<Variant>),
    Callable(Callable),
}

// ─── Callables ────────────────────────────────────────────────────────────────

/// Where a procedure was applied. Handed to every invocation so that natives
/// can report arity and type errors against the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    pub name: String,
    pub span: Span,
}

impl CallSite {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self { name: name.into(), span }
    }

    pub fn from_token(token: &Token) -> Self {
        Self::new(token.text.clone(), token.span())
    }

    /// Fail with an arity error unless exactly `n` arguments were passed.
    pub fn check_argc(&self, args: &[Variant], n: usize) -> Result<()> {
        if args.len() != n {
            Err(Error::arity(&self.name, n, args.len()).at(self.span))
        } else {
            Ok(())
        }
    }
}

pub type NativeFn = dyn Fn(&CallSite, &Environment, &[Variant]) -> Result<Variant>;

/// A user lambda: its parameters, its body, and the scope it was written in.
pub struct Closure {
    pub parameters: Rc<[Token]>,
    pub body: Rc<Ast>,
    pub scope: Environment,
}

#[derive(Clone)]
pub enum Callable {
    Native { name: Rc<str>, func: Rc<NativeFn> },
    Lambda(Rc<Closure>),
}

impl Callable {
    pub fn native<F>(name: &str, func: F) -> Self
    where
        F: Fn(&CallSite, &Environment, &[Variant]) -> Result<Variant> + 'static,
    {
        Callable::Native { name: Rc::from(name), func: Rc::new(func) }
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Native { name, .. } => write!(f, "Native({name})"),
            Callable::Lambda(c) => {
                let params: Vec<&str> = c.parameters.iter().map(|t| t.text.as_str()).collect();
                write!(f, "Lambda({})", params.join(" "))
            }
        }
    }
}

// ─── Construction ─────────────────────────────────────────────────────────────

impl Variant {
    pub fn native<F>(name: &str, func: F) -> Self
    where
        F: Fn(&CallSite, &Environment, &[Variant]) -> Result<Variant> + 'static,
    {
        Variant::Callable(Callable::native(name, func))
    }
}

impl From<f64> for Variant {
    fn from(n: f64) -> Self { Variant::Number(n) }
}

impl From<bool> for Variant {
    fn from(b: bool) -> Self { Variant::Boolean(b) }
}

impl From<&str> for Variant {
    fn from(s: &str) -> Self { Variant::String(s.to_string()) }
}

impl From<String> for Variant {
    fn from(s: String) -> Self { Variant::String(s) }
}

impl From<Vec<Variant>> for Variant {
    fn from(items: Vec<Variant>) -> Self { Variant::List(items) }
}

impl From<Callable> for Variant {
    fn from(c: Callable) -> Self { Variant::Callable(c) }
}

// ─── Accessors ────────────────────────────────────────────────────────────────

impl Variant {
    pub fn type_name(&self) -> &'static str {
        match self {
            Variant::Nil         => "nil",
            Variant::Number(_)   => "number",
            Variant::String(_)   => "string",
            Variant::Boolean(_)  => "boolean",
            Variant::List(_)     => "list",
            Variant::Callable(_) => "function",
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Variant::Nil)
    }

    pub fn number(&self) -> Result<f64> {
        match self {
            Variant::Number(n) => Ok(*n),
            other => Err(Error::type_mismatch("number", other.type_name())),
        }
    }

    pub fn string(&self) -> Result<&str> {
        match self {
            Variant::String(s) => Ok(s),
            other => Err(Error::type_mismatch("string", other.type_name())),
        }
    }

    pub fn boolean(&self) -> Result<bool> {
        match self {
            Variant::Boolean(b) => Ok(*b),
            other => Err(Error::type_mismatch("boolean", other.type_name())),
        }
    }

    pub fn list(&self) -> Result<&[Variant]> {
        match self {
            Variant::List(items) => Ok(items),
            other => Err(Error::type_mismatch("list", other.type_name())),
        }
    }

    pub fn callable(&self) -> Result<&Callable> {
        match self {
            Variant::Callable(c) => Ok(c),
            other => Err(Error::type_mismatch("function", other.type_name())),
        }
    }

    /// Human-readable text for `print-line`. Not meant to be read back.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

// ─── Operators ────────────────────────────────────────────────────────────────

impl Variant {
    pub fn add(&self, rhs: &Variant) -> Result<Variant> {
        let (a, b) = self.operands(rhs, "+")?;
        Ok(Variant::Number(a + b))
    }

    pub fn sub(&self, rhs: &Variant) -> Result<Variant> {
        let (a, b) = self.operands(rhs, "-")?;
        Ok(Variant::Number(a - b))
    }

    pub fn mul(&self, rhs: &Variant) -> Result<Variant> {
        let (a, b) = self.operands(rhs, "*")?;
        Ok(Variant::Number(a * b))
    }

    pub fn div(&self, rhs: &Variant) -> Result<Variant> {
        let (a, b) = self.operands(rhs, "/")?;
        if b == 0.0 {
            return Err(Error::division_by_zero());
        }
        Ok(Variant::Number(a / b))
    }

    pub fn lt(&self, rhs: &Variant) -> Result<Variant> {
        let (a, b) = self.operands(rhs, "<")?;
        Ok(Variant::Boolean(a < b))
    }

    pub fn gt(&self, rhs: &Variant) -> Result<Variant> {
        let (a, b) = self.operands(rhs, ">")?;
        Ok(Variant::Boolean(a > b))
    }

    pub fn le(&self, rhs: &Variant) -> Result<Variant> {
        let (a, b) = self.operands(rhs, "<=")?;
        Ok(Variant::Boolean(a <= b))
    }

    pub fn ge(&self, rhs: &Variant) -> Result<Variant> {
        let (a, b) = self.operands(rhs, ">=")?;
        Ok(Variant::Boolean(a >= b))
    }

    fn operands(&self, rhs: &Variant, op: &str) -> Result<(f64, f64)> {
        match (self, rhs) {
            (Variant::Number(a), Variant::Number(b)) => Ok((*a, *b)),
            _ => Err(Error::new(ErrorCode::R002, format!(
                "operator `{op}` expects number operands, got {} and {}",
                self.type_name(), rhs.type_name()
            ))),
        }
    }
}

/// Structural equality with a tolerance on numbers. Infinities equal
/// themselves and NaN equals NaN. Any two callables are equal; values of
/// different cases never are.
impl PartialEq for Variant {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Variant::Nil, Variant::Nil) => true,
            (Variant::Number(a), Variant::Number(b)) => {
                a == b || (a - b).abs() < NUMBER_EPSILON || (a.is_nan() && b.is_nan())
            }
            (Variant::String(a), Variant::String(b)) => a == b,
            (Variant::Boolean(a), Variant::Boolean(b)) => a == b,
            (Variant::List(a), Variant::List(b)) => a == b,
            (Variant::Callable(_), Variant::Callable(_)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Nil         => f.write_str("nil"),
            Variant::Number(n)   => write!(f, "{n}"),
            Variant::String(s)   => f.write_str(s),
            Variant::Boolean(b)  => f.write_str(if *b { "true" } else { "false" }),
            Variant::List(_)     => f.write_str("[list]"),
            Variant::Callable(_) => f.write_str("[function]"),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
