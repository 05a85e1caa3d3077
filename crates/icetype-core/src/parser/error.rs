//! Parser error type.

use serde::{Deserialize, Serialize};

use crate::lexer::{Span, TokenKind};

/// A parse error, carrying the source text and the byte offset of the
/// offending token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("{message} at offset {} in `{source_text}`", span.start)]
pub struct ParseError {
    /// The error message.
    pub message: String,
    /// The definition text being parsed.
    pub source_text: String,
    /// The location of the error.
    pub span: Span,
    /// Expected tokens (if applicable).
    pub expected: Option<String>,
    /// The actual token found.
    pub found: Option<TokenKind>,
}

impl ParseError {
    /// Creates a new parse error.
    #[must_use]
    pub fn new(message: impl Into<String>, source_text: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            source_text: source_text.into(),
            span,
            expected: None,
            found: None,
        }
    }

    /// The source fragment the span points at.
    #[must_use]
    pub fn offending_text(&self) -> &str {
        self.span.slice(&self.source_text)
    }

    /// Creates an "unexpected token" error.
    #[must_use]
    pub fn unexpected(
        expected: impl Into<String>,
        found: TokenKind,
        source_text: impl Into<String>,
        span: Span,
    ) -> Self {
        let expected_str: String = expected.into();
        Self {
            message: format!(
                "unexpected token: expected {}, found {}",
                expected_str,
                found.describe()
            ),
            source_text: source_text.into(),
            span,
            expected: Some(expected_str),
            found: Some(found),
        }
    }

    /// Creates an "unknown type" error.
    #[must_use]
    pub fn unknown_type(name: &str, source_text: impl Into<String>, span: Span) -> Self {
        Self {
            message: format!("unknown type `{name}`"),
            source_text: source_text.into(),
            span,
            expected: None,
            found: None,
        }
    }

    /// Creates an "unknown directive" error.
    #[must_use]
    pub fn unknown_directive(key: &str) -> Self {
        Self {
            message: format!("unknown directive `{key}`"),
            source_text: key.to_string(),
            span: Span::new(0, key.len()),
            expected: None,
            found: None,
        }
    }

    /// Creates a directive-payload error.
    #[must_use]
    pub fn directive(key: &str, message: impl Into<String>) -> Self {
        Self {
            message: format!("invalid `{key}` directive: {}", message.into()),
            source_text: key.to_string(),
            span: Span::new(0, key.len()),
            expected: None,
            found: None,
        }
    }
}
