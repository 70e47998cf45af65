//! Scanner for Lox source text.
//!
//! Converts a source string into a flat token stream, tracking line and
//! column for every token so the parser and later stages can point at exact
//! source positions in diagnostics.

use crate::error::ScanError;
use crate::token::{keyword, Literal, Token, TokenKind};

pub struct Lexer {
    chars: Vec<char>,
    start: usize,
    current: usize,
    line: usize,
    line_start: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Lexer {
            chars: source.chars().collect(),
            start: 0,
            current: 0,
            line: 1,
            line_start: 0,
        }
    }

    /// Scans the whole source, returning a token list terminated by `Eof`.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, ScanError> {
        let mut tokens = Vec::new();

        while !self.is_at_end() {
            self.start = self.current;
            if let Some(token) = self.scan_token()? {
                tokens.push(token);
            }
        }

        let column = self.current - self.line_start + 1;
        tokens.push(Token::new(TokenKind::Eof, "", None, self.line, column));

        Ok(tokens)
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.chars.len()
    }

    fn advance(&mut self) -> char {
        let c = self.chars[self.current];
        self.current += 1;
        c
    }

    fn peek(&self) -> char {
        self.chars.get(self.current).copied().unwrap_or('\0')
    }

    fn peek_next(&self) -> char {
        self.chars.get(self.current + 1).copied().unwrap_or('\0')
    }

    fn matches(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.chars[self.current] != expected {
            return false;
        }
        self.current += 1;
        true
    }

    fn column(&self) -> usize {
        self.start - self.line_start + 1
    }

    fn lexeme(&self) -> String {
        self.chars[self.start..self.current].iter().collect()
    }

    fn make(&self, kind: TokenKind) -> Token {
        Token::new(kind, self.lexeme(), None, self.line, self.column())
    }

    fn make_literal(&self, kind: TokenKind, literal: Literal) -> Token {
        Token::new(kind, self.lexeme(), Some(literal), self.line, self.column())
    }

    fn scan_token(&mut self) -> Result<Option<Token>, ScanError> {
        let c = self.advance();

        let token = match c {
            '(' => Some(self.make(TokenKind::LeftParen)),
            ')' => Some(self.make(TokenKind::RightParen)),
            '{' => Some(self.make(TokenKind::LeftBrace)),
            '}' => Some(self.make(TokenKind::RightBrace)),
            ',' => Some(self.make(TokenKind::Comma)),
            '.' => Some(self.make(TokenKind::Dot)),
            '-' => Some(self.make(TokenKind::Minus)),
            '+' => Some(self.make(TokenKind::Plus)),
            ';' => Some(self.make(TokenKind::Semicolon)),
            '*' => Some(self.make(TokenKind::Star)),
            '!' => {
                let kind = if self.matches('=') {
                    TokenKind::BangEqual
                } else {
                    TokenKind::Bang
                };
                Some(self.make(kind))
            }
            '=' => {
                let kind = if self.matches('=') {
                    TokenKind::EqualEqual
                } else {
                    TokenKind::Equal
                };
                Some(self.make(kind))
            }
            '<' => {
                let kind = if self.matches('=') {
                    TokenKind::LessEqual
                } else {
                    TokenKind::Less
                };
                Some(self.make(kind))
            }
            '>' => {
                let kind = if self.matches('=') {
                    TokenKind::GreaterEqual
                } else {
                    TokenKind::Greater
                };
                Some(self.make(kind))
            }
            '/' => {
                if self.matches('/') {
                    while self.peek() != '\n' && !self.is_at_end() {
                        self.advance();
                    }
                    None
                } else {
                    Some(self.make(TokenKind::Slash))
                }
            }
            ' ' | '\r' | '\t' => None,
            '\n' => {
                self.line += 1;
                self.line_start = self.current;
                None
            }
            '"' => Some(self.string()?),
            c if c.is_ascii_digit() => Some(self.number()),
            c if is_alpha(c) => Some(self.identifier()),
            other => {
                return Err(ScanError::new(
                    format!("Unexpected character: {other}."),
                    self.line,
                ))
            }
        };

        Ok(token)
    }

    fn string(&mut self) -> Result<Token, ScanError> {
        let start_line = self.line;

        while self.peek() != '"' && !self.is_at_end() {
            if self.peek() == '\n' {
                self.line += 1;
                self.line_start = self.current + 1;
            }
            self.advance();
        }

        if self.is_at_end() {
            return Err(ScanError::new("Unterminated string.", start_line));
        }

        // The closing quote.
        self.advance();

        let value: String = self.chars[self.start + 1..self.current - 1].iter().collect();
        Ok(self.make_literal(TokenKind::String, Literal::Str(value)))
    }

    fn number(&mut self) -> Token {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            // Consume the '.'.
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let text = self.lexeme();
        let value: f64 = text.parse().expect("scanned number lexeme must parse");
        self.make_literal(TokenKind::Number, Literal::Number(value))
    }

    fn identifier(&mut self) -> Token {
        while is_alphanumeric(self.peek()) {
            self.advance();
        }

        let text = self.lexeme();
        let kind = keyword(&text).unwrap_or(TokenKind::Identifier);
        self.make(kind)
    }
}

fn is_alpha(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_alphanumeric(c: char) -> bool {
    is_alpha(c) || c.is_ascii_digit()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn single_character_tokens() {
        assert_eq!(
            kinds("(){},.-+;/*"),
            vec![
                TokenKind::LeftParen,
                TokenKind::RightParen,
                TokenKind::LeftBrace,
                TokenKind::RightBrace,
                TokenKind::Comma,
                TokenKind::Dot,
                TokenKind::Minus,
                TokenKind::Plus,
                TokenKind::Semicolon,
                TokenKind::Slash,
                TokenKind::Star,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn two_character_tokens() {
        assert_eq!(
            kinds("! != = == < <= > >="),
            vec![
                TokenKind::Bang,
                TokenKind::BangEqual,
                TokenKind::Equal,
                TokenKind::EqualEqual,
                TokenKind::Less,
                TokenKind::LessEqual,
                TokenKind::Greater,
                TokenKind::GreaterEqual,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(kinds("// a comment\n1"), vec![TokenKind::Number, TokenKind::Eof]);
    }

    #[test]
    fn keywords_map_correctly() {
        assert_eq!(
            kinds("and class else false fun for if nil or print return super this true var while"),
            vec![
                TokenKind::And,
                TokenKind::Class,
                TokenKind::Else,
                TokenKind::False,
                TokenKind::Fun,
                TokenKind::For,
                TokenKind::If,
                TokenKind::Nil,
                TokenKind::Or,
                TokenKind::Print,
                TokenKind::Return,
                TokenKind::Super,
                TokenKind::This,
                TokenKind::True,
                TokenKind::Var,
                TokenKind::While,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn number_literal_value() {
        let tokens = Lexer::new("3.14").tokenize().unwrap();
        assert_eq!(tokens[0].literal, Some(Literal::Number(3.14)));
    }

    #[test]
    fn trailing_dot_is_not_part_of_number() {
        assert_eq!(
            kinds("1."),
            vec![TokenKind::Number, TokenKind::Dot, TokenKind::Eof]
        );
    }

    #[test]
    fn string_literal_trims_quotes() {
        let tokens = Lexer::new("\"hi\"").tokenize().unwrap();
        assert_eq!(tokens[0].literal, Some(Literal::Str("hi".to_string())));
    }

    #[test]
    fn multiline_string_advances_line() {
        let tokens = Lexer::new("\"a\nb\"\nidentifier").tokenize().unwrap();
        // identifier token should be on line 3.
        assert_eq!(tokens[1].line, 3);
    }

    #[test]
    fn unterminated_string_errors_at_opening_line() {
        let err = Lexer::new("\n\"unterminated").tokenize().unwrap_err();
        assert_eq!(err.line, 2);
        assert!(err.message.contains("Unterminated string"));
    }

    #[test]
    fn unexpected_character_errors() {
        let err = Lexer::new("@").tokenize().unwrap_err();
        assert!(err.message.contains("Unexpected character: @"));
    }

    #[test]
    fn column_tracking() {
        let tokens = Lexer::new("  foo").tokenize().unwrap();
        assert_eq!(tokens[0].column, 3);
    }

    #[test]
    fn column_resets_on_newline() {
        let tokens = Lexer::new("a\n  b").tokenize().unwrap();
        assert_eq!(tokens[1].line, 2);
        assert_eq!(tokens[1].column, 3);
    }

    #[test]
    fn identifiers_are_ascii_only() {
        assert_eq!(kinds("_underscore1"), vec![TokenKind::Identifier, TokenKind::Eof]);
    }
}
