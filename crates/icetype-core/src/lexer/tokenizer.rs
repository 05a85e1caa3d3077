//! Field-language tokenizer implementation.

use crate::schema::RelationOperator;

use super::{Span, Token, TokenKind};

/// A lexer that tokenizes a single field or relation definition string.
pub struct Lexer<'a> {
    /// The input source text.
    input: &'a str,
    /// The current byte position.
    pos: usize,
    /// The byte position of the start of the current token.
    start: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            start: 0,
        }
    }

    /// Returns the current character without advancing.
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    /// Returns the next character without advancing.
    fn peek_next(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    /// Advances to the next character and returns it.
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Skips insignificant whitespace between tokens.
    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|c| c.is_whitespace()) {
            self.advance();
        }
    }

    /// Creates a span from start to current position.
    fn make_span(&self) -> Span {
        Span::new(self.start, self.pos)
    }

    /// Creates a token with the current span.
    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, self.make_span())
    }

    /// Scans an identifier, continuing through `.` for dotted paths
    /// like `Post.author`.
    fn scan_identifier(&mut self) -> Token {
        loop {
            while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
                self.advance();
            }
            // A dot followed by an identifier character extends the path.
            if self.peek() == Some('.')
                && self
                    .peek_next()
                    .is_some_and(|c| c.is_alphabetic() || c == '_')
            {
                self.advance();
                continue;
            }
            break;
        }

        let text = &self.input[self.start..self.pos];
        self.make_token(TokenKind::Identifier(String::from(text)))
    }

    /// Scans a number (integer or float), with an optional leading `-`.
    fn scan_number(&mut self) -> Token {
        if self.peek() == Some('-') {
            self.advance();
        }
        let mut is_float = false;

        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }

        if self.peek() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            self.advance();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        let text = &self.input[self.start..self.pos];

        if is_float {
            match text.parse::<f64>() {
                Ok(f) => self.make_token(TokenKind::Float(f)),
                Err(e) => self.make_token(TokenKind::Error(format!("invalid float: {e}"))),
            }
        } else {
            match text.parse::<i64>() {
                Ok(i) => self.make_token(TokenKind::Integer(i)),
                Err(e) => self.make_token(TokenKind::Error(format!("invalid integer: {e}"))),
            }
        }
    }

    /// Scans a string literal delimited by `quote`. Quotes are escaped
    /// by doubling (`'it''s'`).
    fn scan_string(&mut self, quote: char) -> Token {
        self.advance(); // consume opening quote
        let mut value = String::new();

        loop {
            match self.peek() {
                Some(c) if c == quote => {
                    if self.peek_next() == Some(quote) {
                        value.push(quote);
                        self.advance();
                        self.advance();
                    } else {
                        break;
                    }
                }
                Some(c) => {
                    value.push(c);
                    self.advance();
                }
                None => {
                    return self
                        .make_token(TokenKind::Error(String::from("unterminated string literal")));
                }
            }
        }

        self.advance(); // consume closing quote
        self.make_token(TokenKind::String(value))
    }

    /// Scans the next token.
    #[must_use]
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();
        self.start = self.pos;

        let c = match self.advance() {
            Some(c) => c,
            None => return self.make_token(TokenKind::Eof),
        };

        match c {
            '(' => self.make_token(TokenKind::LeftParen),
            ')' => self.make_token(TokenKind::RightParen),
            ',' => self.make_token(TokenKind::Comma),
            '=' => self.make_token(TokenKind::Eq),
            '!' => self.make_token(TokenKind::Bang),
            '?' => self.make_token(TokenKind::Question),
            '#' => self.make_token(TokenKind::Hash),

            // `[` is only valid as part of the `[]` array marker.
            '[' => {
                if self.peek() == Some(']') {
                    self.advance();
                    self.make_token(TokenKind::ArrayMarker)
                } else {
                    self.make_token(TokenKind::Error(String::from("expected `]` after `[`")))
                }
            }

            // `->` forward relation, or a negative number in a default.
            '-' => {
                if self.peek() == Some('>') {
                    self.advance();
                    self.make_token(TokenKind::Relation(RelationOperator::Forward))
                } else if self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.pos = self.start;
                    self.scan_number()
                } else {
                    self.make_token(TokenKind::Error(String::from("unexpected character: -")))
                }
            }

            // `~` only ever starts the fuzzy-forward operator `~>`.
            '~' => {
                if self.peek() == Some('>') {
                    self.advance();
                    self.make_token(TokenKind::Relation(RelationOperator::FuzzyForward))
                } else {
                    self.make_token(TokenKind::Error(String::from("unexpected character: ~")))
                }
            }

            // `<-` backward, `<~` fuzzy-backward. Longest match: the
            // second character decides which of the two it is.
            '<' => match self.peek() {
                Some('-') => {
                    self.advance();
                    self.make_token(TokenKind::Relation(RelationOperator::Backward))
                }
                Some('~') => {
                    self.advance();
                    self.make_token(TokenKind::Relation(RelationOperator::FuzzyBackward))
                }
                _ => self.make_token(TokenKind::Error(String::from("unexpected character: <"))),
            },

            '\'' => {
                self.pos = self.start;
                self.scan_string('\'')
            }
            '"' => {
                self.pos = self.start;
                self.scan_string('"')
            }

            c if c.is_ascii_digit() => {
                self.pos = self.start;
                self.scan_number()
            }

            c if c.is_alphabetic() || c == '_' => {
                self.pos = self.start;
                self.scan_identifier()
            }

            _ => self.make_token(TokenKind::Error(format!("unexpected character: {c}"))),
        }
    }

    /// Tokenizes the entire input and returns all tokens, ending with EOF.
    #[must_use]
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_terminal = token.is_eof() || matches!(token.kind, TokenKind::Error(_));
            tokens.push(token);
            if is_terminal {
                break;
            }
        }
        tokens
    }
}
