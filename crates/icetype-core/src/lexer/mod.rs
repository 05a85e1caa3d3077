//! Field-language lexer/tokenizer.
//!
//! This module provides a hand-written lexer for the field-definition
//! language that produces a flat stream of tokens.

mod span;
mod token;
mod tokenizer;

pub use span::Span;
pub use token::{Token, TokenKind};
pub use tokenizer::Lexer;
