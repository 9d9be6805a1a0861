use crate::error::{Error, ErrorCode, Result};
use crate::syntax::ast::Span;
use crate::syntax::token::{Token, TokenKind};

pub struct Lexer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source, bytes: source.as_bytes(), pos: 0, line: 1, column: 1 }
    }

    /// Split the whole input into tokens, stopping at the first error.
    /// Parentheses must balance across the entire input.
    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        let mut depth: usize = 0;

        loop {
            self.skip_trivia();
            if self.is_at_end() { break; }

            let tok = self.next_token()?;
            match tok.kind {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => {
                    if depth == 0 {
                        return Err(Error::new(ErrorCode::L003, "unmatched `)`").at(tok.span()));
                    }
                    depth -= 1;
                }
                _ => {}
            }
            tokens.push(tok);
        }

        if depth != 0 {
            return Err(Error::new(ErrorCode::L003, format!("{depth} unclosed `(`"))
                .at(Span::new(self.line, self.column)));
        }
        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Token> {
        let line = self.line;
        let col = self.column;
        let start = self.pos;

        let kind = match self.peek() {
            b'(' => { self.advance(); TokenKind::LParen }
            b')' => { self.advance(); TokenKind::RParen }
            b'"' => { self.read_string(line, col)?; TokenKind::String }
            b'#' => self.read_hash(line, col)?,
            b'0'..=b'9' => { self.read_number(start, line, col)?; TokenKind::Number }
            b'.' if self.peek_next().is_ascii_digit() => { self.read_number(start, line, col)?; TokenKind::Number }
            b'-' if self.starts_signed_number() => { self.read_number(start, line, col)?; TokenKind::Number }
            ch if is_ident_start(ch) => {
                self.read_ident();
                match &self.source[start..self.pos] {
                    "nil" => TokenKind::Nil,
                    "true" | "false" => TokenKind::Boolean,
                    _ => TokenKind::Identifier,
                }
            }
            _ => {
                let ch = self.source[start..].chars().next().unwrap_or('\u{fffd}');
                return Err(Error::new(ErrorCode::L001, format!("unexpected character `{ch}`"))
                    .at(Span::new(line, col)));
            }
        };

        Ok(Token::new(kind, &self.source[start..self.pos], line, col))
    }

    // ─── Primitives ──────────────────────────────────────────────────────────

    fn advance(&mut self) -> u8 {
        let ch = self.bytes[self.pos];
        self.pos += 1;
        if ch == b'\n' { self.line += 1; self.column = 1; }
        // continuation bytes of a multi-byte char don't start a new column
        else if ch & 0xC0 != 0x80 { self.column += 1; }
        ch
    }

    fn peek(&self) -> u8 {
        if self.is_at_end() { 0 } else { self.bytes[self.pos] }
    }

    fn peek_next(&self) -> u8 {
        if self.pos + 1 >= self.bytes.len() { 0 } else { self.bytes[self.pos + 1] }
    }

    fn peek_at(&self, offset: usize) -> u8 {
        self.bytes.get(self.pos + offset).copied().unwrap_or(0)
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    /// Whitespace and `;` line comments.
    fn skip_trivia(&mut self) {
        while !self.is_at_end() {
            match self.peek() {
                b' ' | b'\t' | b'\r' | b'\n' => { self.advance(); }
                b';' => {
                    while !self.is_at_end() && self.peek() != b'\n' { self.advance(); }
                }
                _ => break,
            }
        }
    }

    fn starts_signed_number(&self) -> bool {
        let next = self.peek_next();
        next.is_ascii_digit() || (next == b'.' && self.peek_at(2).is_ascii_digit())
    }

    // ─── Readers ─────────────────────────────────────────────────────────────

    /// Consumes the whole literal including both quotes. Escapes are only
    /// validated for termination here; decoding happens in `Token::to_variant`.
    fn read_string(&mut self, start_line: usize, start_col: usize) -> Result<()> {
        self.advance(); // opening quote
        loop {
            if self.is_at_end() {
                return Err(Error::new(ErrorCode::L002, "unterminated string literal")
                    .at(Span::new(start_line, start_col)));
            }
            match self.advance() {
                b'"' => return Ok(()),
                b'\\' if !self.is_at_end() => { self.advance(); }
                _ => {}
            }
        }
    }

    fn read_hash(&mut self, line: usize, col: usize) -> Result<TokenKind> {
        match self.peek_next() {
            b't' | b'f' if !is_ident_char(self.peek_at(2)) => {
                self.advance();
                self.advance();
                Ok(TokenKind::Boolean)
            }
            _ => Err(Error::new(ErrorCode::L001, "expected `#t` or `#f`").at(Span::new(line, col))),
        }
    }

    /// `-?\.?[0-9]+\.?[0-9]*`
    fn read_number(&mut self, start: usize, line: usize, col: usize) -> Result<()> {
        if self.peek() == b'-' { self.advance(); }
        if self.peek() == b'.' { self.advance(); }
        while self.peek().is_ascii_digit() { self.advance(); }
        if self.peek() == b'.' {
            self.advance();
            while self.peek().is_ascii_digit() { self.advance(); }
        }
        // `12abc` is one bad literal, not a number then a name
        if is_ident_start(self.peek()) {
            self.read_ident();
            return Err(Error::new(
                ErrorCode::L004,
                format!("malformed number `{}`", &self.source[start..self.pos]),
            ).at(Span::new(line, col)));
        }
        Ok(())
    }

    fn read_ident(&mut self) {
        while !self.is_at_end() && is_ident_char(self.peek()) {
            self.advance();
        }
    }
}

fn is_ident_start(ch: u8) -> bool {
    ch.is_ascii_alphabetic() || matches!(ch, b'-' | b'_' | b'?' | b'!' | b'*' | b'+' | b'/' | b'<' | b'>' | b'=')
}

fn is_ident_char(ch: u8) -> bool {
    is_ident_start(ch) || ch.is_ascii_digit() || ch == b'.'
}

// ─── Tests ───────────────────────────────────────────────────────────────────
