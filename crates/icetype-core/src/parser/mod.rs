//! Field-language parser.
//!
//! Hand-written recursive descent over the token stream produced by the
//! lexer. `parse_schema` is the single entry point turning a raw
//! definition into a canonical [`IceTypeSchema`](crate::IceTypeSchema).

mod error;
mod field;
mod relation;
mod schema;

pub use error::ParseError;
pub use field::parse_type_string;
pub use relation::{is_relation_string, parse_relation_string};
pub use schema::{parse_directives, parse_schema, KNOWN_DIRECTIVES};

use crate::lexer::{Lexer, Span, Token, TokenKind};

/// Tokenizes a field or relation definition string.
///
/// # Errors
///
/// Returns a [`ParseError`] carrying the offending byte offset when the
/// input contains a character that cannot start a valid token.
pub fn tokenize(text: &str) -> Result<Vec<Token>, ParseError> {
    let tokens = Lexer::new(text).tokenize();
    if let Some(token) = tokens
        .iter()
        .find(|t| matches!(t.kind, TokenKind::Error(_)))
    {
        if let TokenKind::Error(message) = &token.kind {
            return Err(ParseError::new(message.clone(), text, token.span));
        }
    }
    Ok(tokens)
}

/// A cursor over a tokenized definition string, shared by the field and
/// relation parsers.
pub(crate) struct Cursor<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Tokenizes `source` and positions the cursor at the first token.
    pub(crate) fn new(source: &'a str) -> Result<Self, ParseError> {
        let tokens = tokenize(source)?;
        Ok(Self {
            source,
            tokens,
            pos: 0,
        })
    }

    /// The current token.
    pub(crate) fn current(&self) -> &Token {
        // The token list always ends with EOF, so `pos` is clamped there.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    /// Advances past the current token and returns it.
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    /// Returns true if the current token matches `kind` exactly.
    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        &self.current().kind == kind
    }

    /// Consumes an identifier or errors.
    pub(crate) fn expect_identifier(&mut self, what: &str) -> Result<(String, Span), ParseError> {
        let token = self.current().clone();
        match token.kind {
            TokenKind::Identifier(name) => {
                self.advance();
                Ok((name, token.span))
            }
            kind => Err(ParseError::unexpected(what, kind, self.source, token.span)),
        }
    }

    /// Consumes a specific token kind or errors.
    pub(crate) fn expect(&mut self, kind: &TokenKind, what: &str) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            let token = self.current();
            Err(ParseError::unexpected(
                what,
                token.kind.clone(),
                self.source,
                token.span,
            ))
        }
    }

    /// Errors unless the cursor has consumed all input.
    pub(crate) fn expect_eof(&self) -> Result<(), ParseError> {
        let token = self.current();
        if token.is_eof() {
            Ok(())
        } else {
            Err(ParseError::unexpected(
                "end of input",
                token.kind.clone(),
                self.source,
                token.span,
            ))
        }
    }

    /// The source text being parsed.
    pub(crate) fn source(&self) -> &str {
        self.source
    }
}
