//! Field type-string parsing.

use crate::lexer::TokenKind;
use crate::schema::{DefaultValue, FieldDefinition, FieldModifier};
use crate::types::{self, TypeClass};

use super::{Cursor, ParseError};

/// Parses a field-language type string (e.g. `"decimal(10,2)?"`,
/// `"string# = 'n/a'"`) into a [`FieldDefinition`] with an empty name.
///
/// # Errors
///
/// Returns a [`ParseError`] on unknown types, malformed parameter lists,
/// duplicate or contradictory modifiers, or trailing garbage.
pub fn parse_type_string(text: &str) -> Result<FieldDefinition, ParseError> {
    let mut cursor = Cursor::new(text)?;

    let (name, span) = cursor.expect_identifier("a type name")?;
    let Some((canonical, class)) = types::lookup(&name) else {
        return Err(ParseError::unknown_type(&name, cursor.source(), span));
    };

    let mut field = FieldDefinition::new("", canonical);

    if cursor.check(&TokenKind::LeftParen) {
        if class != TypeClass::Parametric {
            let token = cursor.current();
            return Err(ParseError::new(
                format!("type `{canonical}` does not take parameters"),
                cursor.source(),
                token.span,
            ));
        }
        parse_parameters(&mut cursor, &mut field)?;
    }

    parse_modifiers(&mut cursor, &mut field)?;

    if cursor.check(&TokenKind::Eq) {
        cursor.advance();
        field.default = Some(parse_default(&mut cursor)?);
    }

    cursor.expect_eof()?;
    Ok(field)
}

/// Parses `(precision[,scale])` into the field.
fn parse_parameters(cursor: &mut Cursor<'_>, field: &mut FieldDefinition) -> Result<(), ParseError> {
    cursor.expect(&TokenKind::LeftParen, "`(`")?;
    field.precision = Some(expect_parameter(cursor, "precision")?);
    if cursor.check(&TokenKind::Comma) {
        cursor.advance();
        field.scale = Some(expect_parameter(cursor, "scale")?);
    }
    cursor.expect(&TokenKind::RightParen, "`)`")?;
    Ok(())
}

/// Consumes one non-negative integer type parameter.
fn expect_parameter(cursor: &mut Cursor<'_>, what: &str) -> Result<u32, ParseError> {
    let token = cursor.current().clone();
    if let TokenKind::Integer(n) = token.kind {
        if let Ok(value) = u32::try_from(n) {
            cursor.advance();
            return Ok(value);
        }
    }
    Err(ParseError::unexpected(
        format!("a {what} number"),
        token.kind,
        cursor.source(),
        token.span,
    ))
}

/// Parses trailing modifier symbols and array markers, in any order.
/// Duplicate modifiers and the contradictory `!?` pair are rejected;
/// `[]` may close the type after the base type or after a modifier,
/// but only once.
fn parse_modifiers(cursor: &mut Cursor<'_>, field: &mut FieldDefinition) -> Result<(), ParseError> {
    loop {
        let token = cursor.current().clone();
        let modifier = match token.kind {
            TokenKind::Bang => Some(FieldModifier::Required),
            TokenKind::Question => Some(FieldModifier::Optional),
            TokenKind::Hash => Some(FieldModifier::Indexed),
            TokenKind::ArrayMarker => {
                if field.is_array {
                    return Err(ParseError::new(
                        "duplicate array marker",
                        cursor.source(),
                        token.span,
                    ));
                }
                field.is_array = true;
                cursor.advance();
                continue;
            }
            _ => None,
        };
        let Some(modifier) = modifier else { break };

        if field.modifier == modifier {
            return Err(ParseError::new(
                format!("duplicate modifier `{}`", symbol(modifier)),
                cursor.source(),
                token.span,
            ));
        }
        if field.modifier != FieldModifier::Plain {
            return Err(ParseError::new(
                format!(
                    "contradictory modifiers `{}` and `{}`",
                    symbol(field.modifier),
                    symbol(modifier)
                ),
                cursor.source(),
                token.span,
            ));
        }
        field.modifier = modifier;
        cursor.advance();
    }
    Ok(())
}

fn symbol(modifier: FieldModifier) -> char {
    modifier.symbol().unwrap_or(' ')
}

/// Parses the literal after `=`: string, number, boolean, or a
/// zero-argument function call like `now()`.
fn parse_default(cursor: &mut Cursor<'_>) -> Result<DefaultValue, ParseError> {
    let token = cursor.current().clone();
    match token.kind {
        TokenKind::String(s) => {
            cursor.advance();
            Ok(DefaultValue::String(s))
        }
        TokenKind::Integer(n) => {
            cursor.advance();
            Ok(DefaultValue::Integer(n))
        }
        TokenKind::Float(f) => {
            cursor.advance();
            Ok(DefaultValue::Float(f))
        }
        TokenKind::Identifier(name) if name == "true" || name == "false" => {
            cursor.advance();
            Ok(DefaultValue::Bool(name == "true"))
        }
        TokenKind::Identifier(name) => {
            cursor.advance();
            cursor.expect(&TokenKind::LeftParen, "`(` after default function name")?;
            cursor.expect(&TokenKind::RightParen, "`)`")?;
            Ok(DefaultValue::Function(name))
        }
        kind => Err(ParseError::unexpected(
            "a default literal",
            kind,
            cursor.source(),
            token.span,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_primitive() {
        let f = parse_type_string("string").unwrap();
        assert_eq!(f.base_type, "string");
        assert_eq!(f.modifier, FieldModifier::Plain);
        assert!(!f.is_array);
        assert!(f.default.is_none());
    }

    #[test]
    fn test_parametric_with_optional_modifier() {
        let f = parse_type_string("decimal(10,2)?").unwrap();
        assert_eq!(f.base_type, "decimal");
        assert_eq!(f.precision, Some(10));
        assert_eq!(f.scale, Some(2));
        assert!(f.is_optional());
    }

    #[test]
    fn test_parametric_precision_only() {
        let f = parse_type_string("varchar(255)").unwrap();
        assert_eq!(f.precision, Some(255));
        assert_eq!(f.scale, None);
    }

    #[test]
    fn test_alias_resolution() {
        let f = parse_type_string("Boolean").unwrap();
        assert_eq!(f.base_type, "bool");
        let f = parse_type_string("TEXT!").unwrap();
        assert_eq!(f.base_type, "string");
        assert!(f.is_unique());
    }

    #[test]
    fn test_array_after_base_type() {
        let f = parse_type_string("string[]").unwrap();
        assert!(f.is_array);
        assert_eq!(f.modifier, FieldModifier::Plain);
    }

    #[test]
    fn test_array_after_modifier() {
        let f = parse_type_string("string?[]").unwrap();
        assert!(f.is_array);
        assert!(f.is_optional());
        // Order is free: marker may precede the modifier too.
        let f = parse_type_string("string[]?").unwrap();
        assert!(f.is_array);
        assert!(f.is_optional());
    }

    #[test]
    fn test_indexed_modifier() {
        let f = parse_type_string("string#").unwrap();
        assert!(f.is_indexed());
    }

    #[test]
    fn test_default_literals() {
        assert_eq!(
            parse_type_string("int = 42").unwrap().default,
            Some(DefaultValue::Integer(42))
        );
        assert_eq!(
            parse_type_string("float = 0.5").unwrap().default,
            Some(DefaultValue::Float(0.5))
        );
        assert_eq!(
            parse_type_string("bool = true").unwrap().default,
            Some(DefaultValue::Bool(true))
        );
        assert_eq!(
            parse_type_string("string = 'n/a'").unwrap().default,
            Some(DefaultValue::String("n/a".into()))
        );
        assert_eq!(
            parse_type_string("timestamp = now()").unwrap().default,
            Some(DefaultValue::Function("now".into()))
        );
        assert_eq!(
            parse_type_string("uuid! = uuid()").unwrap().default,
            Some(DefaultValue::Function("uuid".into()))
        );
    }

    #[test]
    fn test_unknown_type_rejected() {
        let err = parse_type_string("Post").unwrap_err();
        assert!(err.message.contains("unknown type `Post`"));
    }

    #[test]
    fn test_contradictory_modifiers_rejected() {
        let err = parse_type_string("string!?").unwrap_err();
        assert!(err.message.contains("contradictory"));
    }

    #[test]
    fn test_duplicate_modifier_rejected() {
        let err = parse_type_string("string??").unwrap_err();
        assert!(err.message.contains("duplicate modifier"));
    }

    #[test]
    fn test_duplicate_array_marker_rejected() {
        let err = parse_type_string("string[][]").unwrap_err();
        assert!(err.message.contains("duplicate array marker"));
    }

    #[test]
    fn test_parameters_on_non_parametric_rejected() {
        let err = parse_type_string("uuid(4)").unwrap_err();
        assert!(err.message.contains("does not take parameters"));
    }

    #[test]
    fn test_bare_identifier_default_rejected() {
        assert!(parse_type_string("string = banana").is_err());
    }

    #[test]
    fn test_trailing_garbage_rejected() {
        assert!(parse_type_string("string! extra").is_err());
    }

    #[test]
    fn test_malformed_parameter_list() {
        assert!(parse_type_string("decimal(10,").is_err());
        assert!(parse_type_string("decimal(x)").is_err());
        assert!(parse_type_string("decimal(-1)").is_err());
    }
}
