use std::fmt;

use crate::syntax::ast::Span;

/// Error codes prefixed by phase: L = lexer, P = parser, R = runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Lexer
    L001, // unexpected character
    L002, // unterminated string literal
    L003, // unbalanced parentheses
    L004, // malformed literal

    // Parser
    P001, // unexpected token
    P002, // unexpected end of input

    // Runtime
    R001, // unbound name
    R002, // type mismatch
    R003, // wrong argument count
    R004, // division by zero
    R005, // i/o failure
}

/// The coarse category an error code belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    SyntaxError,
    UnboundName,
    TypeMismatch,
    ArityMismatch,
    DivisionByZero,
    Io,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::L001 => "L001",
            Self::L002 => "L002",
            Self::L003 => "L003",
            Self::L004 => "L004",
            Self::P001 => "P001",
            Self::P002 => "P002",
            Self::R001 => "R001",
            Self::R002 => "R002",
            Self::R003 => "R003",
            Self::R004 => "R004",
            Self::R005 => "R005",
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::L001 | Self::L002 | Self::L003 | Self::L004
            | Self::P001 | Self::P002 => ErrorKind::SyntaxError,
            Self::R001 => ErrorKind::UnboundName,
            Self::R002 => ErrorKind::TypeMismatch,
            Self::R003 => ErrorKind::ArityMismatch,
            Self::R004 => ErrorKind::DivisionByZero,
            Self::R005 => ErrorKind::Io,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────

/// Every failure the lexer, parser or evaluator can produce.
///
/// Errors raised below the AST (variant accessors, environment lookups) carry
/// no position. The node that observes them attaches its own with [`Error::at`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("[{code}] {location}{message}", location = Location(.span))]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    pub span: Option<Span>,
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self { code, message: message.into(), span: None }
    }

    /// Attach a source position unless one is already present.
    pub fn at(mut self, span: Span) -> Self {
        if self.span.is_none() {
            self.span = Some(span);
        }
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.code.kind()
    }

    pub fn unbound(name: &str) -> Self {
        Self::new(ErrorCode::R001, format!("unbound name `{name}`"))
    }

    pub fn type_mismatch(expected: &str, found: &str) -> Self {
        Self::new(ErrorCode::R002, format!("expected {expected}, got {found}"))
    }

    pub fn arity(name: &str, expected: usize, got: usize) -> Self {
        Self::new(ErrorCode::R003, format!("`{name}` expects {expected} args, got {got}"))
    }

    pub fn division_by_zero() -> Self {
        Self::new(ErrorCode::R004, "division by zero")
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::new(ErrorCode::R005, format!("i/o error: {e}"))
    }
}

struct Location<'a>(&'a Option<Span>);

impl fmt::Display for Location<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(span) => write!(f, "{}:{} - ", span.line, span.column),
            None => Ok(()),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
