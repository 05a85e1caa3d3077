//! SQLite-specific DDL rendering.
//!
//! SQLite's `ALTER TABLE ... ADD COLUMN` cannot carry a UNIQUE
//! constraint, so added columns are rendered without one; everything
//! SQLite cannot express at all is rejected in `Dialect::supports`.

use crate::migrations::operation::ColumnSpec;

use super::{default_sql, type_sql, Dialect};

pub(super) fn add_column(table: &str, dialect: &Dialect, column: &ColumnSpec) -> Option<String> {
    let mut sql = format!(
        "ALTER TABLE {table} ADD COLUMN {} {}",
        dialect.quote_identifier(&column.name),
        type_sql(*dialect, column)?
    );
    if !column.nullable {
        sql.push_str(" NOT NULL");
    }
    if let Some(default) = &column.default {
        sql.push_str(" DEFAULT ");
        sql.push_str(&default_sql(*dialect, default));
    }
    Some(sql)
}
