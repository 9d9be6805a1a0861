use std::fmt;

use crate::error::{Error, ErrorCode, Result};
use crate::runtime::variant::Variant;
use crate::syntax::ast::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Nil,
    Number,
    String,
    Boolean,
    Identifier,
    LParen,
    RParen,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nil        => "nil",
            Self::Number     => "number",
            Self::String     => "string",
            Self::Boolean    => "boolean",
            Self::Identifier => "identifier",
            Self::LParen     => "`(`",
            Self::RParen     => "`)`",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────

/// A lexeme and where it started. `text` is the raw source slice; string
/// tokens keep their quotes and escapes.
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize, column: usize) -> Self {
        Self { kind, text: text.into(), line, column }
    }

    pub fn span(&self) -> Span {
        Span::new(self.line, self.column)
    }

    /// Convert a literal token into the value it denotes.
    pub fn to_variant(&self) -> Result<Variant> {
        match self.kind {
            TokenKind::Nil => Ok(Variant::Nil),
            TokenKind::Number => self.text.parse::<f64>()
                .map(Variant::Number)
                .map_err(|_| self.error(ErrorCode::L004, format!("malformed number `{}`", self.text))),
            TokenKind::String => self.unescape().map(Variant::String),
            TokenKind::Boolean => match self.text.as_str() {
                "#t" | "true"  => Ok(Variant::Boolean(true)),
                "#f" | "false" => Ok(Variant::Boolean(false)),
                other => Err(self.error(ErrorCode::L004, format!("malformed boolean `{other}`"))),
            },
            TokenKind::Identifier | TokenKind::LParen | TokenKind::RParen => Err(self.error(
                ErrorCode::P001,
                format!("{} `{}` is not a literal", self.kind, self.text),
            )),
        }
    }

    fn unescape(&self) -> Result<String> {
        let inner = self.text
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .ok_or_else(|| self.error(ErrorCode::L002, "unterminated string literal"))?;

        let mut out = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(ch) = chars.next() {
            if ch != '\\' {
                out.push(ch);
                continue;
            }
            match chars.next() {
                Some('n')  => out.push('\n'),
                Some('t')  => out.push('\t'),
                Some('r')  => out.push('\r'),
                Some('"')  => out.push('"'),
                Some('\\') => out.push('\\'),
                Some(other) => return Err(self.error(
                    ErrorCode::L004,
                    format!("unknown escape sequence `\\{other}`"),
                )),
                None => return Err(self.error(ErrorCode::L002, "unterminated string literal")),
            }
        }
        Ok(out)
    }

    fn error(&self, code: ErrorCode, message: impl Into<String>) -> Error {
        Error::new(code, message).at(self.span())
    }
}

/// Tokens are equal when kind and text match; positions are ignored.
impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.text == other.text
    }
}

impl Eq for Token {}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{},{}}}", self.kind, self.text)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tok(kind: TokenKind, text: &str) -> Token {
        Token::new(kind, text, 1, 1)
    }

    #[test]
    fn equality_ignores_position() {
        let a = Token::new(TokenKind::Identifier, "x", 1, 1);
        let b = Token::new(TokenKind::Identifier, "x", 7, 12);
        assert_eq!(a, b);
        assert_ne!(a, Token::new(TokenKind::String, "x", 1, 1));
        assert_ne!(a, Token::new(TokenKind::Identifier, "y", 1, 1));
    }

    #[test]
    fn number_to_variant() {
        assert_eq!(tok(TokenKind::Number, "10.4").to_variant().unwrap(), Variant::Number(10.4));
        assert_eq!(tok(TokenKind::Number, "-.5").to_variant().unwrap(), Variant::Number(-0.5));
        assert_eq!(tok(TokenKind::Number, "3.").to_variant().unwrap(), Variant::Number(3.0));
    }

    #[test]
    fn string_to_variant_strips_quotes_and_decodes() {
        let v = tok(TokenKind::String, r#""a\n\"b\"""#).to_variant().unwrap();
        assert_eq!(v, Variant::String("a\n\"b\"".into()));
    }

    #[test]
    fn boolean_and_nil_to_variant() {
        assert_eq!(tok(TokenKind::Boolean, "#t").to_variant().unwrap(), Variant::Boolean(true));
        assert_eq!(tok(TokenKind::Boolean, "false").to_variant().unwrap(), Variant::Boolean(false));
        assert_eq!(tok(TokenKind::Nil, "nil").to_variant().unwrap(), Variant::Nil);
    }

    #[test]
    fn identifier_is_not_a_literal() {
        let err = Token::new(TokenKind::Identifier, "x", 3, 4).to_variant().unwrap_err();
        assert_eq!(err.code, ErrorCode::P001);
        assert_eq!(err.span, Some(Span::new(3, 4)));
    }

    #[test]
    fn display_form() {
        assert_eq!(tok(TokenKind::Identifier, "f").to_string(), "{identifier,f}");
    }
}
