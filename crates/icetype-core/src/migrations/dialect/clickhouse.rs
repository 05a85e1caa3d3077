//! ClickHouse-specific DDL rendering.
//!
//! ClickHouse folds nullability into the type (`Nullable(T)`) and
//! treats secondary indexes as data-skipping indexes attached to the
//! table, so all index DDL goes through `ALTER TABLE`.

use crate::migrations::operation::{ColumnSpec, IndexSpec};

use super::{type_sql, Dialect};

pub(super) fn modify_column(table: &str, dialect: &Dialect, new: &ColumnSpec) -> Option<String> {
    let column = dialect.quote_identifier(&new.name);
    let ty = type_sql(*dialect, new)?;
    Some(format!("ALTER TABLE {table} MODIFY COLUMN {column} {ty}"))
}

pub(super) fn add_index(table: &str, dialect: &Dialect, index: &IndexSpec) -> Option<String> {
    let name = dialect.quote_identifier(&index.name);
    let columns = index
        .columns
        .iter()
        .map(|c| dialect.quote_identifier(c))
        .collect::<Vec<_>>()
        .join(", ");
    Some(format!(
        "ALTER TABLE {table} ADD INDEX {name} ({columns}) TYPE minmax GRANULARITY 1"
    ))
}

pub(super) fn drop_index(table: &str, dialect: &Dialect, name: &str) -> Option<String> {
    Some(format!(
        "ALTER TABLE {table} DROP INDEX {}",
        dialect.quote_identifier(name)
    ))
}
