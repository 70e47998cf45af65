//! Parser for the Lox programming language.
//!
//! This module provides the [`Parser`] struct which transforms a token
//! stream into a statement list ([`Stmt`]) via recursive-descent parsing
//! with precedence climbing.
//!
//! # Grammar
//!
//! ```text
//! program        → declaration* EOF
//! declaration    → funDecl | varDecl | statement
//! funDecl        → "fun" IDENT "(" parameters? ")" block
//! varDecl        → "var" IDENT ("=" expression)? ";"
//! statement      → exprStmt | forStmt | ifStmt | printStmt
//!                | returnStmt | whileStmt | block
//! exprStmt       → expression ";"
//! forStmt        → "for" "(" (varDecl | exprStmt | ";") expression? ";"
//!                              expression? ")" statement
//! ifStmt         → "if" "(" expression ")" statement ("else" statement)?
//! printStmt      → "print" expression ";"
//! returnStmt     → "return" expression? ";"
//! whileStmt      → "while" "(" expression ")" statement
//! block          → "{" declaration* "}"
//!
//! expression     → assignment
//! assignment     → IDENT "=" assignment | logic_or
//! logic_or       → logic_and ("or" logic_and)*
//! logic_and      → equality ("and" equality)*
//! equality       → comparison (("!="|"==") comparison)*
//! comparison     → term (("<"|"<="|">"|">=") term)*
//! term           → factor (("-"|"+") factor)*
//! factor         → unary (("/"|"*") unary)*
//! unary          → ("!"|"-") unary | call
//! call           → primary ("(" arguments? ")")*
//! primary        → NUMBER | STRING | "true" | "false" | "nil"
//!                | "(" expression ")" | IDENT
//! arguments      → expression ("," expression)*
//! parameters     → IDENT ("," IDENT)*
//! ```
//!
//! # See Also
//!
//! * [`crate::lexer`] - Produces the token stream consumed by the parser
//! * [`crate::ast`] - Defines the AST types produced by the parser
//! * [`crate::resolver`] - Consumes the statement list next in the pipeline

use std::rc::Rc;

use crate::ast::{Expr, FunctionDecl, Stmt};
use crate::error::{report_parse_error, ParseError};
use crate::token::{Literal, Token, TokenKind};
use crate::value::Value;

const MAX_ARGS: usize = 255;

/// A recursive-descent parser for Lox.
///
/// Holds the full token stream and a cursor. Captures the first
/// [`ParseError`] encountered in `error` and keeps parsing via
/// [`Parser::synchronize`] so later errors in the same source are still
/// reported, even though only the first is ultimately returned.
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    error: Option<ParseError>,
}

impl Parser {
    /// # Panics
    /// Panics if the token list is empty. The scanner always produces at
    /// least an `Eof` token.
    pub fn new(tokens: Vec<Token>) -> Self {
        assert!(!tokens.is_empty(), "token list must not be empty");
        Parser {
            tokens,
            current: 0,
            error: None,
        }
    }

    pub fn parse(&mut self) -> Result<Vec<Stmt>, ParseError> {
        let mut statements = Vec::new();

        while !self.is_at_end() {
            match self.declaration() {
                Ok(stmt) => statements.push(stmt),
                Err(()) => self.synchronize(),
            }
        }

        match self.error.take() {
            Some(err) => Err(err),
            None => Ok(statements),
        }
    }

    // --- token stream primitives -----------------------------------

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn check(&self, kind: TokenKind) -> bool {
        !self.is_at_end() && self.peek().kind == kind
    }

    fn advance(&mut self) -> Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous().clone()
    }

    fn matches(&mut self, kinds: &[TokenKind]) -> bool {
        for kind in kinds {
            if self.check(*kind) {
                self.advance();
                return true;
            }
        }
        false
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> Result<Token, ()> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            let token = self.peek().clone();
            self.error_at(token, message)
        }
    }

    /// Records a parse error at `token`, reports it to stderr immediately,
    /// and fails the current production. The first error recorded across
    /// the whole parse is what `parse()` ultimately returns.
    fn error_at<T>(&mut self, token: Token, message: &str) -> Result<T, ()> {
        self.record_error(token, message);
        Err(())
    }

    /// Same as [`Parser::error_at`] but does not fail the current
    /// production — used for the "don't desynchronize" cases (invalid
    /// assignment target, over-255 argument/parameter lists) where parsing
    /// continues normally after the error is recorded.
    fn record_error(&mut self, token: Token, message: &str) {
        let err = ParseError::new(message, token);
        report_parse_error(&err);
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    /// Discards tokens until just past a `;` or up to a token that begins a
    /// new declaration, so the next top-level `declaration()` call starts
    /// from a known-good position.
    fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous().kind == TokenKind::Semicolon {
                return;
            }

            if matches!(
                self.peek().kind,
                TokenKind::Class
                    | TokenKind::Fun
                    | TokenKind::Var
                    | TokenKind::For
                    | TokenKind::If
                    | TokenKind::While
                    | TokenKind::Print
                    | TokenKind::Return
            ) {
                return;
            }

            self.advance();
        }
    }

    // --- declarations -------------------------------------------------

    fn declaration(&mut self) -> Result<Stmt, ()> {
        if self.matches(&[TokenKind::Fun]) {
            return self.function_declaration();
        }
        if self.matches(&[TokenKind::Var]) {
            return self.var_declaration();
        }
        self.statement()
    }

    fn function_declaration(&mut self) -> Result<Stmt, ()> {
        let name = self.consume(TokenKind::Identifier, "Expect function name.")?;
        self.consume(TokenKind::LeftParen, "Expect '(' after function name.")?;

        let mut params = Vec::new();
        let mut too_many_params = false;
        if !self.check(TokenKind::RightParen) {
            loop {
                if params.len() >= MAX_ARGS {
                    too_many_params = true;
                }
                params.push(self.consume(TokenKind::Identifier, "Expect parameter name.")?);
                if !self.matches(&[TokenKind::Comma]) {
                    break;
                }
            }
        }
        let right_paren = self.consume(TokenKind::RightParen, "Expect ')' after parameters.")?;
        if too_many_params {
            self.record_error(right_paren, "Can't have more than 255 parameters.");
        }

        self.consume(TokenKind::LeftBrace, "Expect '{' before function body.")?;
        let body = self.block()?;

        Ok(Stmt::Function(Rc::new(FunctionDecl { name, params, body })))
    }

    fn var_declaration(&mut self) -> Result<Stmt, ()> {
        let name = self.consume(TokenKind::Identifier, "Expect variable name.")?;

        let initializer = if self.matches(&[TokenKind::Equal]) {
            self.expression()?
        } else {
            Expr::Literal(Value::Nil)
        };

        self.consume(TokenKind::Semicolon, "Expect ';' after variable declaration.")?;
        Ok(Stmt::Var(name, initializer))
    }

    // --- statements -----------------------------------------------------

    fn statement(&mut self) -> Result<Stmt, ()> {
        if self.matches(&[TokenKind::For]) {
            return self.for_statement();
        }
        if self.matches(&[TokenKind::If]) {
            return self.if_statement();
        }
        if self.matches(&[TokenKind::Print]) {
            return self.print_statement();
        }
        if self.matches(&[TokenKind::Return]) {
            return self.return_statement();
        }
        if self.matches(&[TokenKind::While]) {
            return self.while_statement();
        }
        if self.matches(&[TokenKind::LeftBrace]) {
            return Ok(Stmt::Block(self.block()?));
        }
        self.expression_statement()
    }

    fn for_statement(&mut self) -> Result<Stmt, ()> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'for'.")?;

        let initializer = if self.matches(&[TokenKind::Semicolon]) {
            None
        } else if self.matches(&[TokenKind::Var]) {
            Some(self.var_declaration()?)
        } else {
            Some(self.expression_statement()?)
        };

        let condition = if self.check(TokenKind::Semicolon) {
            Expr::Literal(Value::Bool(true))
        } else {
            self.expression()?
        };
        self.consume(TokenKind::Semicolon, "Expect ';' after loop condition.")?;

        let increment = if self.check(TokenKind::RightParen) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(TokenKind::RightParen, "Expect ')' after for clauses.")?;

        let mut body = self.statement()?;

        if let Some(increment) = increment {
            body = Stmt::Block(vec![body, Stmt::Expression(increment)]);
        }
        body = Stmt::While(condition, Box::new(body));

        if let Some(initializer) = initializer {
            body = Stmt::Block(vec![initializer, body]);
        }

        Ok(body)
    }

    fn if_statement(&mut self) -> Result<Stmt, ()> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'if'.")?;
        let condition = self.expression()?;
        self.consume(TokenKind::RightParen, "Expect ')' after if condition.")?;

        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.matches(&[TokenKind::Else]) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };

        Ok(Stmt::If(condition, then_branch, else_branch))
    }

    fn print_statement(&mut self) -> Result<Stmt, ()> {
        let value = self.expression()?;
        self.consume(TokenKind::Semicolon, "Expect ';' after value.")?;
        Ok(Stmt::Print(value))
    }

    fn return_statement(&mut self) -> Result<Stmt, ()> {
        let keyword = self.previous().clone();
        let value = if self.check(TokenKind::Semicolon) {
            Expr::Literal(Value::Nil)
        } else {
            self.expression()?
        };
        self.consume(TokenKind::Semicolon, "Expect ';' after return value.")?;
        Ok(Stmt::Return(keyword, value))
    }

    fn while_statement(&mut self) -> Result<Stmt, ()> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'while'.")?;
        let condition = self.expression()?;
        self.consume(TokenKind::RightParen, "Expect ')' after condition.")?;
        let body = Box::new(self.statement()?);
        Ok(Stmt::While(condition, body))
    }

    fn block(&mut self) -> Result<Vec<Stmt>, ()> {
        let mut statements = Vec::new();

        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            statements.push(self.declaration()?);
        }

        self.consume(TokenKind::RightBrace, "Expect '}' after block.")?;
        Ok(statements)
    }

    fn expression_statement(&mut self) -> Result<Stmt, ()> {
        let expr = self.expression()?;
        self.consume(TokenKind::Semicolon, "Expect ';' after expression.")?;
        Ok(Stmt::Expression(expr))
    }

    // --- expressions ------------------------------------------------------

    fn expression(&mut self) -> Result<Expr, ()> {
        self.assignment()
    }

    fn assignment(&mut self) -> Result<Expr, ()> {
        let expr = self.or()?;

        if self.matches(&[TokenKind::Equal]) {
            let equals = self.previous().clone();
            let value = self.assignment()?;

            return match expr {
                Expr::Variable(name) => Ok(Expr::Assign(name, Box::new(value))),
                _ => {
                    // The parser state is still good here, so this error is
                    // recorded without desynchronizing.
                    self.record_error(equals, "Invalid assignment target.");
                    Ok(value)
                }
            };
        }

        Ok(expr)
    }

    fn or(&mut self) -> Result<Expr, ()> {
        let mut expr = self.and()?;
        while self.matches(&[TokenKind::Or]) {
            let op = self.previous().clone();
            let right = self.and()?;
            expr = Expr::Logical(Box::new(expr), op, Box::new(right));
        }
        Ok(expr)
    }

    fn and(&mut self) -> Result<Expr, ()> {
        let mut expr = self.equality()?;
        while self.matches(&[TokenKind::And]) {
            let op = self.previous().clone();
            let right = self.equality()?;
            expr = Expr::Logical(Box::new(expr), op, Box::new(right));
        }
        Ok(expr)
    }

    fn equality(&mut self) -> Result<Expr, ()> {
        let mut expr = self.comparison()?;
        while self.matches(&[TokenKind::BangEqual, TokenKind::EqualEqual]) {
            let op = self.previous().clone();
            let right = self.comparison()?;
            expr = Expr::Binary(Box::new(expr), op, Box::new(right));
        }
        Ok(expr)
    }

    fn comparison(&mut self) -> Result<Expr, ()> {
        let mut expr = self.term()?;
        while self.matches(&[
            TokenKind::Greater,
            TokenKind::GreaterEqual,
            TokenKind::Less,
            TokenKind::LessEqual,
        ]) {
            let op = self.previous().clone();
            let right = self.term()?;
            expr = Expr::Binary(Box::new(expr), op, Box::new(right));
        }
        Ok(expr)
    }

    fn term(&mut self) -> Result<Expr, ()> {
        let mut expr = self.factor()?;
        while self.matches(&[TokenKind::Minus, TokenKind::Plus]) {
            let op = self.previous().clone();
            let right = self.factor()?;
            expr = Expr::Binary(Box::new(expr), op, Box::new(right));
        }
        Ok(expr)
    }

    fn factor(&mut self) -> Result<Expr, ()> {
        let mut expr = self.unary()?;
        while self.matches(&[TokenKind::Slash, TokenKind::Star]) {
            let op = self.previous().clone();
            let right = self.unary()?;
            expr = Expr::Binary(Box::new(expr), op, Box::new(right));
        }
        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr, ()> {
        if self.matches(&[TokenKind::Bang, TokenKind::Minus]) {
            let op = self.previous().clone();
            let right = self.unary()?;
            return Ok(Expr::Unary(op, Box::new(right)));
        }
        self.call()
    }

    fn call(&mut self) -> Result<Expr, ()> {
        let mut expr = self.primary()?;

        loop {
            if self.matches(&[TokenKind::LeftParen]) {
                expr = self.finish_call(expr)?;
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr) -> Result<Expr, ()> {
        let mut args = Vec::new();
        let mut too_many_args = false;

        if !self.check(TokenKind::RightParen) {
            loop {
                if args.len() >= MAX_ARGS {
                    too_many_args = true;
                }
                args.push(self.expression()?);
                if !self.matches(&[TokenKind::Comma]) {
                    break;
                }
            }
        }

        let paren = self.consume(TokenKind::RightParen, "Expect ')' after arguments.")?;
        if too_many_args {
            self.record_error(paren.clone(), "Can't have more than 255 arguments.");
        }
        Ok(Expr::Call(Box::new(callee), paren, args))
    }

    fn primary(&mut self) -> Result<Expr, ()> {
        if self.matches(&[TokenKind::False]) {
            return Ok(Expr::Literal(Value::Bool(false)));
        }
        if self.matches(&[TokenKind::True]) {
            return Ok(Expr::Literal(Value::Bool(true)));
        }
        if self.matches(&[TokenKind::Nil]) {
            return Ok(Expr::Literal(Value::Nil));
        }
        if self.matches(&[TokenKind::Number]) {
            return match &self.previous().literal {
                Some(Literal::Number(n)) => Ok(Expr::Literal(Value::Number(*n))),
                _ => unreachable!("scanner guarantees a Number literal on a Number token"),
            };
        }
        if self.matches(&[TokenKind::String]) {
            return match &self.previous().literal {
                Some(Literal::Str(s)) => Ok(Expr::Literal(Value::string(s.clone()))),
                _ => unreachable!("scanner guarantees a Str literal on a String token"),
            };
        }
        if self.matches(&[TokenKind::Identifier]) {
            return Ok(Expr::Variable(Rc::new(self.previous().clone())));
        }
        if self.matches(&[TokenKind::LeftParen]) {
            let expr = self.expression()?;
            self.consume(TokenKind::RightParen, "Expect ')' after expression.")?;
            return Ok(Expr::Grouping(Box::new(expr)));
        }

        let token = self.peek().clone();
        self.error_at(token, "Expect expression.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse(source: &str) -> Result<Vec<Stmt>, ParseError> {
        let tokens = Lexer::new(source).tokenize().unwrap();
        Parser::new(tokens).parse()
    }

    #[test]
    fn empty_source_yields_empty_program() {
        assert_eq!(parse("").unwrap().len(), 0);
    }

    #[test]
    fn parses_print_statement() {
        let stmts = parse("print 1 + 2;").unwrap();
        assert_eq!(stmts.len(), 1);
        assert!(matches!(stmts[0], Stmt::Print(_)));
    }

    #[test]
    fn missing_expression_is_a_parse_error() {
        let err = parse("print;").unwrap_err();
        assert_eq!(err.to_string(), "[line 1] Error at ';': Expect expression.");
    }

    #[test]
    fn for_loop_desugars_to_while_in_a_block() {
        let stmts = parse("for (var i = 0; i < 1; i = i + 1) print i;").unwrap();
        assert_eq!(stmts.len(), 1);
        match &stmts[0] {
            Stmt::Block(inner) => {
                assert_eq!(inner.len(), 2);
                assert!(matches!(inner[0], Stmt::Var(..)));
                assert!(matches!(inner[1], Stmt::While(..)));
            }
            other => panic!("expected a block, got {other:?}"),
        }
    }

    #[test]
    fn invalid_assignment_target_does_not_desynchronize() {
        // "a + b" is not assignable; the parser should still accept the
        // rest of the statement and only flag the assignment.
        let err = parse("a + b = c;").unwrap_err();
        assert!(err.message.contains("Invalid assignment target"));
    }

    #[test]
    fn function_declaration_parses_params_and_body() {
        let stmts = parse("fun add(a, b) { return a + b; }").unwrap();
        match &stmts[0] {
            Stmt::Function(decl) => {
                assert_eq!(decl.params.len(), 2);
                assert_eq!(decl.body.len(), 1);
            }
            other => panic!("expected a function declaration, got {other:?}"),
        }
    }

    #[test]
    fn call_with_no_arguments() {
        let stmts = parse("clock();").unwrap();
        match &stmts[0] {
            Stmt::Expression(Expr::Call(_, _, args)) => assert!(args.is_empty()),
            other => panic!("expected a zero-arg call, got {other:?}"),
        }
    }

    #[test]
    fn too_many_call_arguments_errors_at_closing_paren() {
        let args = (0..257).map(|n| n.to_string()).collect::<Vec<_>>().join(", ");
        let err = parse(&format!("f({args});")).unwrap_err();
        assert_eq!(err.message, "Can't have more than 255 arguments.");
        assert_eq!(err.token.lexeme, ")");
    }

    #[test]
    fn too_many_function_parameters_errors_at_closing_paren() {
        let params = (0..257).map(|n| format!("p{n}")).collect::<Vec<_>>().join(", ");
        let err = parse(&format!("fun f({params}) {{}}")).unwrap_err();
        assert_eq!(err.message, "Can't have more than 255 parameters.");
        assert_eq!(err.token.lexeme, ")");
    }
}
