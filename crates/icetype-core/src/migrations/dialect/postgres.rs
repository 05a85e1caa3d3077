//! PostgreSQL-specific DDL rendering.

use crate::migrations::operation::{ColumnSpec, IndexKind, IndexSpec};

use super::{type_sql, Dialect};

/// `ALTER COLUMN ... TYPE ...` with a `USING` cast so lossless type
/// changes apply in place.
pub(super) fn alter_column_type(
    table: &str,
    dialect: &Dialect,
    new: &ColumnSpec,
) -> Option<String> {
    let column = dialect.quote_identifier(&new.name);
    let ty = type_sql(*dialect, new)?;
    Some(format!(
        "ALTER TABLE {table} ALTER COLUMN {column} TYPE {ty} USING {column}::{ty}"
    ))
}

pub(super) fn alter_nullability(
    table: &str,
    dialect: &Dialect,
    column: &str,
    nullable: bool,
) -> String {
    let column = dialect.quote_identifier(column);
    let action = if nullable { "DROP" } else { "SET" };
    format!("ALTER TABLE {table} ALTER COLUMN {column} {action} NOT NULL")
}

/// Index creation, including GIN full-text and HNSW vector indexes.
pub(super) fn create_index(table: &str, dialect: &Dialect, index: &IndexSpec) -> Option<String> {
    let name = dialect.quote_identifier(&index.name);
    match index.kind {
        IndexKind::BTree => {
            let unique = if index.unique { "UNIQUE " } else { "" };
            let columns = index
                .columns
                .iter()
                .map(|c| dialect.quote_identifier(c))
                .collect::<Vec<_>>()
                .join(", ");
            Some(format!("CREATE {unique}INDEX {name} ON {table} ({columns})"))
        }
        IndexKind::FullText => {
            let expression = index
                .columns
                .iter()
                .map(|c| dialect.quote_identifier(c))
                .collect::<Vec<_>>()
                .join(" || ' ' || ");
            Some(format!(
                "CREATE INDEX {name} ON {table} USING GIN (to_tsvector('simple', {expression}))"
            ))
        }
        IndexKind::Vector(_) => {
            let column = dialect.quote_identifier(index.columns.first()?);
            Some(format!(
                "CREATE INDEX {name} ON {table} USING hnsw ({column} vector_cosine_ops)"
            ))
        }
    }
}
