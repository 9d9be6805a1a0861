use std::fmt;
use std::rc::Rc;

use crate::error::Result;
use crate::runtime::variant::Variant;
use crate::syntax::token::Token;

/// Source location attached to every node for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

// ─── Nodes ───────────────────────────────────────────────────────────────────

/// One executable syntactic construct. Children are owned; the tree has no
/// back references. Lambda bodies sit behind an `Rc` so closures built from
/// them share the tree instead of copying it.
#[derive(Debug, Clone)]
pub enum Ast {
    /// `(if test consequent alternate)`
    If {
        test: Box<Ast>,
        consequent: Box<Ast>,
        alternate: Box<Ast>,
        span: Span,
    },

    /// `(name arg...)`. `arguments` evaluates to the argument list.
    Procedure {
        identifier: Token,
        arguments: Box<Ast>,
    },

    /// `(lambda (param...) body)`
    Lambda {
        parameters: Rc<[Token]>,
        body: Rc<Ast>,
        span: Span,
    },

    /// `(begin form...)` and the argument group of a procedure call.
    List(Vec<Ast>, Span),

    /// `(op left right)`
    Operator {
        op: BinOp,
        operation: Token,
        left: Box<Ast>,
        right: Box<Ast>,
    },

    /// `(print-line expr)`
    PrintLine(Box<Ast>, Span),

    /// A bare identifier.
    Variable(Token),

    /// `(set name value)`
    Set {
        identifier: Token,
        value: Box<Ast>,
    },

    /// A literal, converted once when the node is built.
    Atomic {
        token: Token,
        value: Variant,
    },
}

impl Ast {
    pub fn atomic(token: Token) -> Result<Self> {
        let value = token.to_variant()?;
        Ok(Ast::Atomic { token, value })
    }

    pub fn span(&self) -> Span {
        match self {
            Ast::If { span, .. }              => *span,
            Ast::Procedure { identifier, .. } => identifier.span(),
            Ast::Lambda { span, .. }          => *span,
            Ast::List(_, span)                => *span,
            Ast::Operator { operation, .. }   => operation.span(),
            Ast::PrintLine(_, span)           => *span,
            Ast::Variable(token)              => token.span(),
            Ast::Set { identifier, .. }       => identifier.span(),
            Ast::Atomic { token, .. }         => token.span(),
        }
    }
}

// ─── Operators ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    Add, Sub, Mul, Div,
    Lt, Gt, LtEq, GtEq,
    Eq,
}

impl BinOp {
    pub fn from_symbol(s: &str) -> Option<Self> {
        Some(match s {
            "+"  => Self::Add,
            "-"  => Self::Sub,
            "*"  => Self::Mul,
            "/"  => Self::Div,
            "<"  => Self::Lt,
            ">"  => Self::Gt,
            "<=" => Self::LtEq,
            ">=" => Self::GtEq,
            "="  => Self::Eq,
            _ => return None,
        })
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Add  => "+",
            Self::Sub  => "-",
            Self::Mul  => "*",
            Self::Div  => "/",
            Self::Lt   => "<",
            Self::Gt   => ">",
            Self::LtEq => "<=",
            Self::GtEq => ">=",
            Self::Eq   => "=",
        }
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
