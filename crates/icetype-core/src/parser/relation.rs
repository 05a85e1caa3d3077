//! Relation expression parsing.

use crate::lexer::TokenKind;
use crate::schema::{RelationDefinition, RelationOperator};

use super::{Cursor, ParseError};

/// Returns true if `text` is a relation expression rather than a scalar
/// type string. Relations start with one of the four operators.
#[must_use]
pub fn is_relation_string(text: &str) -> bool {
    let trimmed = text.trim_start();
    trimmed.starts_with("->")
        || trimmed.starts_with("~>")
        || trimmed.starts_with("<-")
        || trimmed.starts_with("<~")
}

/// Parses a relation expression.
///
/// Forward form: `-> Target` / `~> Target`, with optional `?` and `[]`.
/// Backward form: `<- Target.field` / `<~ Target.field`, with optional
/// `[]`; the remote field is mandatory.
///
/// # Errors
///
/// Returns a [`ParseError`] when the operator is missing, the target is
/// malformed, or a modifier is illegal for the operator direction.
pub fn parse_relation_string(text: &str) -> Result<RelationDefinition, ParseError> {
    let mut cursor = Cursor::new(text)?;

    let token = cursor.current().clone();
    let operator = match token.kind {
        TokenKind::Relation(op) => {
            cursor.advance();
            op
        }
        kind => {
            return Err(ParseError::unexpected(
                "a relation operator",
                kind,
                cursor.source(),
                token.span,
            ))
        }
    };

    let (target, target_span) = cursor.expect_identifier("a target type name")?;

    let mut relation = if operator.is_backward() {
        let Some((target_type, target_field)) = split_target_path(&target) else {
            return Err(ParseError::new(
                format!("backward relation target must be `Type.field`, got `{target}`"),
                cursor.source(),
                target_span,
            ));
        };
        RelationDefinition {
            operator,
            target_type,
            target_field: Some(target_field),
            is_array: false,
            is_optional: false,
        }
    } else {
        if target.contains('.') {
            return Err(ParseError::new(
                format!("forward relation target must be a bare type name, got `{target}`"),
                cursor.source(),
                target_span,
            ));
        }
        RelationDefinition {
            operator,
            target_type: target,
            target_field: None,
            is_array: false,
            is_optional: false,
        }
    };

    loop {
        let token = cursor.current().clone();
        match token.kind {
            TokenKind::Question => {
                if operator.is_backward() {
                    return Err(ParseError::new(
                        "backward relations cannot be optional",
                        cursor.source(),
                        token.span,
                    ));
                }
                if relation.is_optional {
                    return Err(ParseError::new(
                        "duplicate `?` on relation",
                        cursor.source(),
                        token.span,
                    ));
                }
                relation.is_optional = true;
                cursor.advance();
            }
            TokenKind::ArrayMarker => {
                if relation.is_array {
                    return Err(ParseError::new(
                        "duplicate array marker on relation",
                        cursor.source(),
                        token.span,
                    ));
                }
                relation.is_array = true;
                cursor.advance();
            }
            _ => break,
        }
    }

    cursor.expect_eof()?;
    Ok(relation)
}

/// Splits `Type.field` into its two parts. Exactly one dot is allowed.
fn split_target_path(target: &str) -> Option<(String, String)> {
    let mut parts = target.split('.');
    let type_name = parts.next()?;
    let field_name = parts.next()?;
    if parts.next().is_some() || type_name.is_empty() || field_name.is_empty() {
        return None;
    }
    Some((type_name.to_string(), field_name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_relation_string() {
        assert!(is_relation_string("-> User"));
        assert!(is_relation_string("~> Tag[]"));
        assert!(is_relation_string("<- Post.author[]"));
        assert!(is_relation_string("  <~ Event.actor"));
        assert!(!is_relation_string("string!"));
        assert!(!is_relation_string("decimal(10,2)"));
    }

    #[test]
    fn test_forward_relation() {
        let r = parse_relation_string("-> User").unwrap();
        assert_eq!(r.operator, RelationOperator::Forward);
        assert_eq!(r.target_type, "User");
        assert_eq!(r.target_field, None);
        assert!(!r.is_array);
        assert!(!r.is_optional);
    }

    #[test]
    fn test_forward_optional() {
        let r = parse_relation_string("-> User?").unwrap();
        assert!(r.is_optional);
    }

    #[test]
    fn test_fuzzy_forward_array() {
        let r = parse_relation_string("~> Tag[]").unwrap();
        assert_eq!(r.operator, RelationOperator::FuzzyForward);
        assert!(r.is_array);
    }

    #[test]
    fn test_backward_relation() {
        let r = parse_relation_string("<- Post.author[]").unwrap();
        assert_eq!(r.operator, RelationOperator::Backward);
        assert_eq!(r.target_type, "Post");
        assert_eq!(r.target_field.as_deref(), Some("author"));
        assert!(r.is_array);
    }

    #[test]
    fn test_fuzzy_backward_relation() {
        let r = parse_relation_string("<~ Event.actor").unwrap();
        assert_eq!(r.operator, RelationOperator::FuzzyBackward);
        assert_eq!(r.target_field.as_deref(), Some("actor"));
    }

    #[test]
    fn test_backward_requires_field_path() {
        let err = parse_relation_string("<- Post").unwrap_err();
        assert!(err.message.contains("`Type.field`"));
        assert!(parse_relation_string("<- Post.author.name").is_err());
    }

    #[test]
    fn test_forward_rejects_field_path() {
        let err = parse_relation_string("-> Post.author").unwrap_err();
        assert!(err.message.contains("bare type name"));
    }

    #[test]
    fn test_backward_rejects_optional() {
        let err = parse_relation_string("<- Post.author?").unwrap_err();
        assert!(err.message.contains("cannot be optional"));
    }

    #[test]
    fn test_missing_operator_rejected() {
        assert!(parse_relation_string("User").is_err());
    }

    #[test]
    fn test_trailing_garbage_rejected() {
        assert!(parse_relation_string("-> User extra").is_err());
    }
}
