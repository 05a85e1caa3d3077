//! Whole-schema parsing: directives plus field definitions.

use indexmap::IndexMap;
use tracing::debug;

use crate::schema::{
    FieldDefinition, FieldModifier, IceTypeSchema, RawSchema, RawValue, SchemaDirectives,
};

use super::{is_relation_string, parse_relation_string, parse_type_string, ParseError};

/// Every `$`-prefixed key the parser accepts. Anything else is a typo
/// and rejected rather than silently carried along.
pub const KNOWN_DIRECTIVES: &[&str] = &[
    "$type",
    "$partitionBy",
    "$index",
    "$fts",
    "$vector",
    "$projection",
    "$from",
    "$expand",
    "$flatten",
];

/// Directives handled by the projection layer, not by this crate. They
/// are carried through verbatim in [`SchemaDirectives::extra`].
const PROJECTION_DIRECTIVES: &[&str] = &["$projection", "$from", "$expand", "$flatten"];

/// Parses the `$`-prefixed entries of a raw definition into structured
/// directives.
///
/// # Errors
///
/// Returns a [`ParseError`] on unknown directive keys or payloads of the
/// wrong JSON shape.
pub fn parse_directives(raw: &RawSchema) -> Result<SchemaDirectives, ParseError> {
    let mut directives = SchemaDirectives::default();

    for (key, value) in raw.entries.iter().filter(|(k, _)| k.starts_with('$')) {
        if !KNOWN_DIRECTIVES.contains(&key.as_str()) {
            return Err(ParseError::unknown_directive(key));
        }
        let json = to_json(value);
        match key.as_str() {
            "$type" => {
                let name = json
                    .as_str()
                    .ok_or_else(|| ParseError::directive(key, "expected a string"))?;
                directives.type_name = Some(name.to_string());
            }
            "$partitionBy" => directives.partition_by = string_list(key, &json)?,
            "$fts" => directives.fts = string_list(key, &json)?,
            "$index" => {
                let entries = json
                    .as_array()
                    .ok_or_else(|| ParseError::directive(key, "expected an array"))?;
                for entry in entries {
                    // Each entry is one index: either a single field name
                    // or a composite tuple of field names.
                    let tuple = match entry {
                        serde_json::Value::String(field) => vec![field.clone()],
                        serde_json::Value::Array(_) => string_list(key, entry)?,
                        _ => {
                            return Err(ParseError::directive(
                                key,
                                "entries must be field names or arrays of field names",
                            ))
                        }
                    };
                    if tuple.is_empty() {
                        return Err(ParseError::directive(key, "index tuple cannot be empty"));
                    }
                    directives.index.push(tuple);
                }
            }
            "$vector" => {
                let object = json
                    .as_object()
                    .ok_or_else(|| ParseError::directive(key, "expected an object"))?;
                let mut vector = IndexMap::new();
                for (field, dim) in object {
                    let dim = dim
                        .as_u64()
                        .and_then(|d| u32::try_from(d).ok())
                        .ok_or_else(|| {
                            ParseError::directive(key, format!("dimension for `{field}` must be an integer"))
                        })?;
                    vector.insert(field.clone(), dim);
                }
                directives.vector = vector;
            }
            _ => {
                debug_assert!(PROJECTION_DIRECTIVES.contains(&key.as_str()));
                directives.extra.insert(key.clone(), json);
            }
        }
    }

    Ok(directives)
}

/// Parses a raw definition into a canonical schema.
///
/// `$` entries become directives; every other entry is a field whose
/// value must be a field-language string. Field order is preserved.
///
/// # Errors
///
/// Returns the first [`ParseError`] hit: a bad directive, a duplicate
/// field name, a non-string field value, or a malformed definition.
pub fn parse_schema(raw: &RawSchema) -> Result<IceTypeSchema, ParseError> {
    let directives = parse_directives(raw)?;

    let mut schema = IceTypeSchema::new(
        directives
            .type_name
            .clone()
            .unwrap_or_else(|| raw.name.clone()),
    );
    schema.directives = directives;
    if let Some(version) = raw.version {
        schema.version = version;
    }
    if let Some(created_at) = raw.created_at {
        schema.created_at = created_at;
    }
    if let Some(updated_at) = raw.updated_at {
        schema.updated_at = updated_at;
    }

    for (name, value) in raw.entries.iter().filter(|(k, _)| !k.starts_with('$')) {
        if schema.fields.contains_key(name) {
            return Err(ParseError::new(
                format!("duplicate field `{name}`"),
                name.clone(),
                crate::lexer::Span::new(0, name.len()),
            ));
        }
        let RawValue::Text(definition) = value else {
            return Err(ParseError::new(
                format!("field `{name}` must be a definition string"),
                name.clone(),
                crate::lexer::Span::new(0, name.len()),
            ));
        };
        let field = parse_field(name, definition)?;
        schema = schema.field(field);
    }

    debug!(
        schema = %schema.name,
        fields = schema.fields.len(),
        relations = schema.relations.len(),
        "parsed schema"
    );
    Ok(schema)
}

/// Parses a single named definition, dispatching on relation syntax.
fn parse_field(name: &str, definition: &str) -> Result<FieldDefinition, ParseError> {
    if is_relation_string(definition) {
        let relation = parse_relation_string(definition)?;
        let mut field = FieldDefinition::new(name, relation.target_type.clone());
        if relation.is_optional {
            field.modifier = FieldModifier::Optional;
        }
        field.is_array = relation.is_array;
        field.relation = Some(relation);
        Ok(field)
    } else {
        Ok(parse_type_string(definition)?.named(name))
    }
}

/// Converts a raw value to its JSON shape for directive parsing.
fn to_json(value: &RawValue) -> serde_json::Value {
    match value {
        RawValue::Text(s) => serde_json::Value::String(s.clone()),
        RawValue::Json(v) => v.clone(),
    }
}

/// Extracts an array of strings from a directive payload.
fn string_list(key: &str, json: &serde_json::Value) -> Result<Vec<String>, ParseError> {
    let entries = json
        .as_array()
        .ok_or_else(|| ParseError::directive(key, "expected an array of field names"))?;
    entries
        .iter()
        .map(|entry| {
            entry
                .as_str()
                .map(ToString::to_string)
                .ok_or_else(|| ParseError::directive(key, "expected an array of field names"))
        })
        .collect()
}
