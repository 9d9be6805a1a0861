use std::rc::Rc;

use crate::error::{Error, ErrorCode, Result};
use crate::syntax::ast::{Ast, BinOp, Span};
use crate::syntax::token::{Token, TokenKind};

/// Parse exactly one top-level form.
pub fn parse(tokens: Vec<Token>) -> Result<Ast> {
    Parser::new(tokens).parse()
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn parse(mut self) -> Result<Ast> {
        let ast = self.parse_form()?;
        if let Some(tok) = self.peek() {
            return Err(self.error_at(tok, format!(
                "expected end of input after top-level form, found {} `{}`", tok.kind, tok.text
            )));
        }
        Ok(ast)
    }

    // ─── Forms ───────────────────────────────────────────────────────────────

    fn parse_form(&mut self) -> Result<Ast> {
        let tok = self.advance()?;
        match tok.kind {
            TokenKind::LParen => self.parse_compound(tok.span()),
            TokenKind::Identifier => Ok(Ast::Variable(tok)),
            TokenKind::Nil | TokenKind::Number | TokenKind::String | TokenKind::Boolean => Ast::atomic(tok),
            TokenKind::RParen => Err(self.error_at(&tok, "unexpected `)`")),
        }
    }

    /// Called with the opening `(` already consumed.
    fn parse_compound(&mut self, open: Span) -> Result<Ast> {
        let head = match self.peek() {
            Some(tok) if tok.kind == TokenKind::Identifier => tok.clone(),
            Some(tok) => {
                return Err(self.error_at(tok, format!(
                    "expected a special form or procedure name, found {} `{}`", tok.kind, tok.text
                )));
            }
            None => return Err(self.eof_error("a special form or procedure name")),
        };

        match head.text.as_str() {
            "begin"      => self.parse_begin(open),
            "lambda"     => self.parse_lambda(open),
            "if"         => self.parse_if(open),
            "set"        => self.parse_set(),
            "print-line" => self.parse_print_line(open),
            text => match BinOp::from_symbol(text) {
                Some(op) => self.parse_operator(op),
                None     => self.parse_procedure(),
            },
        }
    }

    fn parse_begin(&mut self, open: Span) -> Result<Ast> {
        self.advance()?; // begin
        let forms = self.parse_until_close()?;
        Ok(Ast::List(forms, open))
    }

    fn parse_lambda(&mut self, open: Span) -> Result<Ast> {
        self.advance()?; // lambda
        self.expect(TokenKind::LParen)?;
        let mut parameters = Vec::new();
        while !self.check(TokenKind::RParen) {
            parameters.push(self.expect(TokenKind::Identifier)?);
        }
        self.expect(TokenKind::RParen)?;
        let body = self.parse_form()?;
        self.expect(TokenKind::RParen)?;
        Ok(Ast::Lambda { parameters: Rc::from(parameters), body: Rc::new(body), span: open })
    }

    fn parse_if(&mut self, open: Span) -> Result<Ast> {
        self.advance()?; // if
        let test = self.parse_form()?;
        let consequent = self.parse_form()?;
        let alternate = self.parse_form()?;
        self.expect(TokenKind::RParen)?;
        Ok(Ast::If {
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
            span: open,
        })
    }

    fn parse_set(&mut self) -> Result<Ast> {
        self.advance()?; // set
        let identifier = self.expect(TokenKind::Identifier)?;
        let value = self.parse_form()?;
        self.expect(TokenKind::RParen)?;
        Ok(Ast::Set { identifier, value: Box::new(value) })
    }

    fn parse_operator(&mut self, op: BinOp) -> Result<Ast> {
        let operation = self.advance()?;
        let left = self.parse_form()?;
        let right = self.parse_form()?;
        self.expect(TokenKind::RParen)?;
        Ok(Ast::Operator { op, operation, left: Box::new(left), right: Box::new(right) })
    }

    fn parse_print_line(&mut self, open: Span) -> Result<Ast> {
        self.advance()?; // print-line
        let expr = self.parse_form()?;
        self.expect(TokenKind::RParen)?;
        Ok(Ast::PrintLine(Box::new(expr), open))
    }

    fn parse_procedure(&mut self) -> Result<Ast> {
        let identifier = self.advance()?;
        let args_span = self.peek().map(Token::span).unwrap_or_else(|| identifier.span());
        let args = self.parse_until_close()?;
        Ok(Ast::Procedure { identifier, arguments: Box::new(Ast::List(args, args_span)) })
    }

    /// Forms up to and including the closing `)`.
    fn parse_until_close(&mut self) -> Result<Vec<Ast>> {
        let mut forms = Vec::new();
        while !self.check(TokenKind::RParen) {
            forms.push(self.parse_form()?);
        }
        self.expect(TokenKind::RParen)?;
        Ok(forms)
    }

    // ─── Helpers ─────────────────────────────────────────────────────────────

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Result<Token> {
        match self.tokens.get(self.pos) {
            Some(tok) => {
                self.pos += 1;
                Ok(tok.clone())
            }
            None => Err(self.eof_error("a form")),
        }
    }

    /// False at end of input, so loops fall through to `expect` and report it.
    fn check(&self, kind: TokenKind) -> bool {
        self.peek().is_some_and(|t| t.kind == kind)
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        if self.check(kind) {
            return self.advance();
        }
        match self.peek() {
            Some(tok) => Err(self.error_at(tok, format!(
                "expected {}, found {} `{}`", kind, tok.kind, tok.text
            ))),
            None => Err(self.eof_error(kind.as_str())),
        }
    }

    fn error_at(&self, tok: &Token, msg: impl Into<String>) -> Error {
        Error::new(ErrorCode::P001, msg).at(tok.span())
    }

    fn eof_error(&self, expected: &str) -> Error {
        let err = Error::new(ErrorCode::P002, format!("expected {expected}, found end of input"));
        match self.tokens.last() {
            Some(tok) => err.at(tok.span()),
            None => err,
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::variant::Variant;
    use crate::syntax::lexer::Lexer;
    use pretty_assertions::assert_eq;

    fn parse_src(src: &str) -> Ast {
        let tokens = Lexer::new(src).tokenize().unwrap_or_else(|e| panic!("lex failed: {e}"));
        parse(tokens).unwrap_or_else(|e| panic!("parse failed: {e}"))
    }

    fn parse_err(src: &str) -> Error {
        let tokens = Lexer::new(src).tokenize().unwrap_or_else(|e| panic!("lex failed: {e}"));
        parse(tokens).expect_err("expected parse to fail")
    }

    fn names(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    // ── atoms ────────────────────────────────────────────────────────────────

    #[test]
    fn literal_atom() {
        match parse_src("12.5") {
            Ast::Atomic { value, .. } => assert_eq!(value, Variant::Number(12.5)),
            other => panic!("expected Atomic, got {other:?}"),
        }
    }

    #[test]
    fn nil_atom() {
        assert!(matches!(parse_src("nil"), Ast::Atomic { value: Variant::Nil, .. }));
    }

    #[test]
    fn bare_identifier_is_variable() {
        match parse_src("counter") {
            Ast::Variable(tok) => assert_eq!(tok.text, "counter"),
            other => panic!("expected Variable, got {other:?}"),
        }
    }

    // ── special forms ────────────────────────────────────────────────────────

    #[test]
    fn begin_collects_forms() {
        match parse_src("(begin (set a 10) (set b 2) a)") {
            Ast::List(forms, _) => {
                assert_eq!(forms.len(), 3);
                assert!(matches!(forms[0], Ast::Set { .. }));
                assert!(matches!(forms[2], Ast::Variable(_)));
            }
            other => panic!("expected List, got {other:?}"),
        }
    }

    #[test]
    fn empty_begin() {
        assert!(matches!(parse_src("(begin)"), Ast::List(ref f, _) if f.is_empty()));
    }

    #[test]
    fn lambda_params_and_body() {
        match parse_src("(lambda (x y) (+ x y))") {
            Ast::Lambda { parameters, body, .. } => {
                assert_eq!(names(&parameters), vec!["x", "y"]);
                assert!(matches!(*body, Ast::Operator { op: BinOp::Add, .. }));
            }
            other => panic!("expected Lambda, got {other:?}"),
        }
    }

    #[test]
    fn lambda_without_params() {
        match parse_src("(lambda () 1)") {
            Ast::Lambda { parameters, .. } => assert!(parameters.is_empty()),
            other => panic!("expected Lambda, got {other:?}"),
        }
    }

    #[test]
    fn if_has_three_branches() {
        assert!(matches!(parse_src("(if (= 3 2) (+ 1 3) nil)"), Ast::If { .. }));
    }

    #[test]
    fn set_form() {
        match parse_src("(set a (lambda (x) x))") {
            Ast::Set { identifier, value } => {
                assert_eq!(identifier.text, "a");
                assert!(matches!(*value, Ast::Lambda { .. }));
            }
            other => panic!("expected Set, got {other:?}"),
        }
    }

    #[test]
    fn every_operator_symbol() {
        for (src, op) in [
            ("(+ 1 2)", BinOp::Add), ("(- 1 2)", BinOp::Sub),
            ("(* 1 2)", BinOp::Mul), ("(/ 1 2)", BinOp::Div),
            ("(< 1 2)", BinOp::Lt), ("(> 1 2)", BinOp::Gt),
            ("(<= 1 2)", BinOp::LtEq), ("(>= 1 2)", BinOp::GtEq),
            ("(= 1 2)", BinOp::Eq),
        ] {
            match parse_src(src) {
                Ast::Operator { op: got, .. } => assert_eq!(got, op, "{src}"),
                other => panic!("{src}: expected Operator, got {other:?}"),
            }
        }
    }

    #[test]
    fn print_line_form() {
        assert!(matches!(parse_src("(print-line c)"), Ast::PrintLine(..)));
    }

    #[test]
    fn procedure_call_wraps_args_in_list() {
        match parse_src("(f 5 (g 4))") {
            Ast::Procedure { identifier, arguments } => {
                assert_eq!(identifier.text, "f");
                match *arguments {
                    Ast::List(ref args, _) => {
                        assert_eq!(args.len(), 2);
                        assert!(matches!(args[1], Ast::Procedure { .. }));
                    }
                    ref other => panic!("expected List, got {other:?}"),
                }
            }
            other => panic!("expected Procedure, got {other:?}"),
        }
    }

    #[test]
    fn node_spans_point_at_source() {
        let ast = parse_src("(begin\n  (set a 1))");
        assert_eq!(ast.span(), Span::new(1, 1));
        match ast {
            Ast::List(forms, _) => assert_eq!(forms[0].span(), Span::new(2, 8)),
            other => panic!("expected List, got {other:?}"),
        }
    }

    // ── errors ───────────────────────────────────────────────────────────────

    #[test]
    fn error_empty_input() {
        assert_eq!(parse(Vec::new()).unwrap_err().code, ErrorCode::P002);
    }

    #[test]
    fn error_empty_parens() {
        let err = parse_err("()");
        assert_eq!(err.code, ErrorCode::P001);
        assert_eq!(err.span, Some(Span::new(1, 2)));
    }

    #[test]
    fn error_non_identifier_head() {
        assert_eq!(parse_err("(1 2 3)").code, ErrorCode::P001);
        assert_eq!(parse_err("((lambda (x) x) 1)").code, ErrorCode::P001);
    }

    #[test]
    fn error_if_missing_alternate() {
        assert_eq!(parse_err("(if #t 1)").code, ErrorCode::P001);
    }

    #[test]
    fn error_set_requires_identifier() {
        let err = parse_err("(set 5 1)");
        assert_eq!(err.code, ErrorCode::P001);
        assert_eq!(err.span, Some(Span::new(1, 6)));
    }

    #[test]
    fn error_lambda_param_must_be_identifier() {
        assert_eq!(parse_err("(lambda (x 1) x)").code, ErrorCode::P001);
    }

    #[test]
    fn error_operator_too_many_operands() {
        assert_eq!(parse_err("(+ 1 2 3)").code, ErrorCode::P001);
    }

    #[test]
    fn error_trailing_form() {
        let err = parse_err("(set a 1) (set b 2)");
        assert_eq!(err.code, ErrorCode::P001);
        assert_eq!(err.span, Some(Span::new(1, 11)));
    }
}
