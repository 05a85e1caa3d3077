//! Type tables and dialect mapping.

use serde::{Deserialize, Serialize};

use crate::migrations::dialect::Dialect;

/// Primitive scalar types.
pub const PRIMITIVE_TYPES: &[&str] = &[
    "string",
    "int",
    "bigint",
    "float",
    "double",
    "bool",
    "uuid",
    "timestamp",
    "date",
    "time",
    "binary",
];

/// Types taking `(precision[,scale])` arguments.
pub const PARAMETRIC_TYPES: &[&str] = &["decimal", "numeric", "varchar", "char"];

/// Dynamically-shaped container types; take no parameters.
pub const GENERIC_TYPES: &[&str] = &["json", "object", "any"];

/// Case-insensitive synonyms mapped to canonical names.
pub const TYPE_ALIASES: &[(&str, &str)] = &[
    ("boolean", "bool"),
    ("integer", "int"),
    ("int32", "int"),
    ("int64", "bigint"),
    ("long", "bigint"),
    ("real", "float"),
    ("float64", "double"),
    ("str", "string"),
    ("text", "string"),
    ("datetime", "timestamp"),
    ("bytes", "binary"),
    ("blob", "binary"),
];

/// How a registered type consumes its definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeClass {
    /// Plain scalar type.
    Primitive,
    /// Takes `(precision[,scale])` arguments.
    Parametric,
    /// Dynamically-shaped container type.
    Generic,
}

/// Resolves an identifier (case-insensitively) to its canonical type
/// name, or `None` if it is not a registered type or alias.
#[must_use]
pub fn resolve_alias(name: &str) -> Option<&'static str> {
    let lower = name.to_ascii_lowercase();
    if let Some(&(_, canonical)) = TYPE_ALIASES.iter().find(|(alias, _)| *alias == lower) {
        return Some(canonical);
    }
    PRIMITIVE_TYPES
        .iter()
        .chain(PARAMETRIC_TYPES)
        .chain(GENERIC_TYPES)
        .find(|&&t| t == lower)
        .copied()
}

/// Classifies a canonical type name.
#[must_use]
pub fn classify(canonical: &str) -> Option<TypeClass> {
    if PRIMITIVE_TYPES.contains(&canonical) {
        Some(TypeClass::Primitive)
    } else if PARAMETRIC_TYPES.contains(&canonical) {
        Some(TypeClass::Parametric)
    } else if GENERIC_TYPES.contains(&canonical) {
        Some(TypeClass::Generic)
    } else {
        None
    }
}

/// Resolves and classifies an identifier in one step.
#[must_use]
pub fn lookup(name: &str) -> Option<(&'static str, TypeClass)> {
    let canonical = resolve_alias(name)?;
    let class = classify(canonical)?;
    Some((canonical, class))
}

/// Maps a canonical type name to the base SQL type for a dialect.
///
/// Parametric arguments and array wrapping are applied by the dialect
/// renderer; this hook only decides the base name.
#[must_use]
pub fn dialect_type(dialect: Dialect, canonical: &str) -> Option<&'static str> {
    let name = match dialect {
        Dialect::Postgres => match canonical {
            "string" => "TEXT",
            "int" => "INTEGER",
            "bigint" => "BIGINT",
            "float" => "REAL",
            "double" => "DOUBLE PRECISION",
            "bool" => "BOOLEAN",
            "uuid" => "UUID",
            "timestamp" => "TIMESTAMPTZ",
            "date" => "DATE",
            "time" => "TIME",
            "binary" => "BYTEA",
            "json" | "object" | "any" => "JSONB",
            "decimal" => "DECIMAL",
            "numeric" => "NUMERIC",
            "varchar" => "VARCHAR",
            "char" => "CHAR",
            _ => return None,
        },
        Dialect::Mysql => match canonical {
            "string" => "TEXT",
            "int" => "INT",
            "bigint" => "BIGINT",
            "float" => "FLOAT",
            "double" => "DOUBLE",
            "bool" => "TINYINT(1)",
            "uuid" => "CHAR(36)",
            "timestamp" => "DATETIME",
            "date" => "DATE",
            "time" => "TIME",
            "binary" => "BLOB",
            "json" | "object" | "any" => "JSON",
            "decimal" => "DECIMAL",
            "numeric" => "NUMERIC",
            "varchar" => "VARCHAR",
            "char" => "CHAR",
            _ => return None,
        },
        Dialect::Sqlite => match canonical {
            "string" | "uuid" | "timestamp" | "date" | "time" | "json" | "object" | "any"
            | "varchar" | "char" => "TEXT",
            "int" | "bigint" | "bool" => "INTEGER",
            "float" | "double" => "REAL",
            "binary" => "BLOB",
            "decimal" | "numeric" => "NUMERIC",
            _ => return None,
        },
        Dialect::DuckDb => match canonical {
            "string" | "varchar" | "char" => "VARCHAR",
            "int" => "INTEGER",
            "bigint" => "BIGINT",
            "float" => "REAL",
            "double" => "DOUBLE",
            "bool" => "BOOLEAN",
            "uuid" => "UUID",
            "timestamp" => "TIMESTAMP",
            "date" => "DATE",
            "time" => "TIME",
            "binary" => "BLOB",
            "json" | "object" | "any" => "JSON",
            "decimal" => "DECIMAL",
            "numeric" => "NUMERIC",
            _ => return None,
        },
        Dialect::ClickHouse => match canonical {
            "string" | "time" | "binary" | "varchar" | "char" => "String",
            "int" => "Int32",
            "bigint" => "Int64",
            "float" => "Float32",
            "double" => "Float64",
            "bool" => "Bool",
            "uuid" => "UUID",
            "timestamp" => "DateTime64(3)",
            "date" => "Date32",
            "json" | "object" | "any" => "String",
            "decimal" | "numeric" => "Decimal",
            _ => return None,
        },
    };
    Some(name)
}
