//! Token types for the field-language lexer.

use serde::{Deserialize, Serialize};

use crate::schema::RelationOperator;

use super::Span;

/// The kind of token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TokenKind {
    /// Identifier or dotted path (e.g., `decimal`, `Post.author`).
    Identifier(String),
    /// Integer literal (e.g., `10` in `decimal(10,2)` or a default).
    Integer(i64),
    /// Float literal (only valid in default clauses).
    Float(f64),
    /// Quoted string literal (only valid in default clauses).
    String(String),
    /// `!` — required/unique modifier.
    Bang,
    /// `?` — optional modifier.
    Question,
    /// `#` — indexed modifier.
    Hash,
    /// `[]` — array marker.
    ArrayMarker,
    /// One of the four relation operators.
    Relation(RelationOperator),
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `,`
    Comma,
    /// `=` — introduces a default clause.
    Eq,
    /// End of input.
    Eof,
    /// Invalid/unknown token.
    Error(String),
}

impl TokenKind {
    /// Returns a short human-readable description for error messages.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Identifier(name) => format!("identifier `{name}`"),
            Self::Integer(n) => format!("number `{n}`"),
            Self::Float(f) => format!("number `{f}`"),
            Self::String(s) => format!("string `{s}`"),
            Self::Bang => "`!`".to_string(),
            Self::Question => "`?`".to_string(),
            Self::Hash => "`#`".to_string(),
            Self::ArrayMarker => "`[]`".to_string(),
            Self::Relation(op) => format!("`{}`", op.as_str()),
            Self::LeftParen => "`(`".to_string(),
            Self::RightParen => "`)`".to_string(),
            Self::Comma => "`,`".to_string(),
            Self::Eq => "`=`".to_string(),
            Self::Eof => "end of input".to_string(),
            Self::Error(msg) => format!("invalid token ({msg})"),
        }
    }
}

/// A token with its span in the source text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The location in the source text.
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Returns true if this is an EOF token.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    /// Returns the identifier text if this is an identifier token.
    #[must_use]
    pub fn as_identifier(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Identifier(name) => Some(name),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_is_eof() {
        let eof = Token::new(TokenKind::Eof, Span::new(0, 0));
        let ident = Token::new(TokenKind::Identifier("uuid".into()), Span::new(0, 4));
        assert!(eof.is_eof());
        assert!(!ident.is_eof());
    }

    #[test]
    fn test_token_as_identifier() {
        let ident = Token::new(TokenKind::Identifier("uuid".into()), Span::new(0, 4));
        let bang = Token::new(TokenKind::Bang, Span::new(4, 5));
        assert_eq!(ident.as_identifier(), Some("uuid"));
        assert_eq!(bang.as_identifier(), None);
    }

    #[test]
    fn test_describe() {
        assert_eq!(TokenKind::Bang.describe(), "`!`");
        assert_eq!(
            TokenKind::Relation(RelationOperator::FuzzyForward).describe(),
            "`~>`"
        );
        assert_eq!(TokenKind::Eof.describe(), "end of input");
    }
}
