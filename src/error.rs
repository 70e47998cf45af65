//! Diagnostic types shared across the scan/parse/resolve/execute pipeline.
//!
//! Each error carries just enough location info to print the stderr
//! contract expected by the reference test suite. Formatting follows the
//! same manual `Display` impl style as the teacher's `LexError`/
//! `ResolverError`, not `thiserror`.

use std::fmt;

use crate::token::{Token, TokenKind};

/// A lexical error: the scanner encountered something it can't tokenize.
#[derive(Debug)]
pub struct ScanError {
    pub message: String,
    pub line: usize,
}

impl ScanError {
    pub fn new(message: impl Into<String>, line: usize) -> Self {
        ScanError {
            message: message.into(),
            line,
        }
    }
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[line {}] Error: {}", self.line, self.message)
    }
}

impl std::error::Error for ScanError {}

/// A syntax error: the parser couldn't make sense of the token stream at a
/// particular point.
#[derive(Debug)]
pub struct ParseError {
    pub message: String,
    pub token: Token,
}

impl ParseError {
    pub fn new(message: impl Into<String>, token: Token) -> Self {
        ParseError {
            message: message.into(),
            token,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[line {}] Error {}: {}",
            self.token.line,
            where_clause(&self.token),
            self.message
        )
    }
}

impl std::error::Error for ParseError {}

/// A resolve-time or runtime error. Both stages share this shape and the
/// same exit code (70) — see SPEC_FULL.md §7.
#[derive(Debug)]
pub struct ExecuteError {
    pub message: String,
    pub token: Token,
}

impl ExecuteError {
    pub fn new(message: impl Into<String>, token: Token) -> Self {
        ExecuteError {
            message: message.into(),
            token,
        }
    }
}

impl fmt::Display for ExecuteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[line {}] Error: {}", self.token.line, self.message)
    }
}

impl std::error::Error for ExecuteError {}

fn where_clause(token: &Token) -> String {
    if token.kind == TokenKind::Eof {
        "at end".to_string()
    } else {
        format!("at '{}'", token.lexeme)
    }
}

/// Writes a `ScanError` to stderr in the `[line L] Error: MSG` form.
pub fn report_scan_error(error: &ScanError) {
    eprintln!("{error}");
}

/// Writes a `ParseError` to stderr in the `[line L] Error at 'LEXEME': MSG`
/// (or `at end`) form.
pub fn report_parse_error(error: &ParseError) {
    eprintln!("{error}");
}

/// Writes an `ExecuteError` (resolve-time or runtime) to stderr.
pub fn report_execute_error(error: &ExecuteError) {
    eprintln!("{error}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Token;

    #[test]
    fn parse_error_at_lexeme() {
        let token = Token::new(TokenKind::Semicolon, ";", None, 1, 7);
        let err = ParseError::new("Expect expression.", token);
        assert_eq!(err.to_string(), "[line 1] Error at ';': Expect expression.");
    }

    #[test]
    fn parse_error_at_end() {
        let token = Token::new(TokenKind::Eof, "", None, 3, 1);
        let err = ParseError::new("Expect expression.", token);
        assert_eq!(err.to_string(), "[line 3] Error at end: Expect expression.");
    }

    #[test]
    fn scan_error_format() {
        let err = ScanError::new("Unterminated string.", 4);
        assert_eq!(err.to_string(), "[line 4] Error: Unterminated string.");
    }

    #[test]
    fn execute_error_format() {
        let token = Token::new(TokenKind::Minus, "-", None, 2, 1);
        let err = ExecuteError::new("Unsupported operand for '-', must be 'number'.", token);
        assert_eq!(
            err.to_string(),
            "[line 2] Error: Unsupported operand for '-', must be 'number'."
        );
    }
}
