//! SQL dialects.
//!
//! A dialect decides three things: which operations it can execute at
//! all (`supports`), how identifiers are quoted, and how each operation
//! renders to DDL text. Unsupported operations are filtered out by the
//! planner and surfaced as warnings, never silently rendered.

mod clickhouse;
mod postgres;
mod sqlite;

use serde::{Deserialize, Serialize};

use crate::schema::DefaultValue;
use crate::types;

use super::operation::{
    ColumnSpec, ConstraintKind, IndexKind, MigrationOperation,
};

/// A supported SQL dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// PostgreSQL.
    Postgres,
    /// MySQL / MariaDB.
    Mysql,
    /// SQLite.
    Sqlite,
    /// DuckDB.
    DuckDb,
    /// ClickHouse.
    ClickHouse,
}

impl Dialect {
    /// The dialect's lowercase name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Mysql => "mysql",
            Self::Sqlite => "sqlite",
            Self::DuckDb => "duckdb",
            Self::ClickHouse => "clickhouse",
        }
    }

    /// Quotes an identifier for this dialect.
    #[must_use]
    pub fn quote_identifier(&self, name: &str) -> String {
        match self {
            Self::Mysql | Self::ClickHouse => format!("`{name}`"),
            _ => format!("\"{name}\""),
        }
    }

    /// Whether this dialect can execute the operation.
    ///
    /// The planner drops unsupported operations and records a warning
    /// for each; `render_operation` on an unsupported operation returns
    /// `None`.
    #[must_use]
    pub fn supports(&self, operation: &MigrationOperation) -> bool {
        match self {
            Self::Postgres => true,
            Self::Mysql => match operation {
                MigrationOperation::AlterColumnNullability { .. } => false,
                MigrationOperation::AddIndex { index } => {
                    !matches!(index.kind, IndexKind::Vector(_))
                }
                _ => true,
            },
            Self::Sqlite => match operation {
                MigrationOperation::AlterColumnType { .. }
                | MigrationOperation::AlterColumnNullability { .. }
                | MigrationOperation::AlterColumnDefault { .. }
                | MigrationOperation::AddConstraint { .. }
                | MigrationOperation::DropConstraint { .. } => false,
                MigrationOperation::AddIndex { index } => matches!(index.kind, IndexKind::BTree),
                _ => true,
            },
            Self::DuckDb => match operation {
                MigrationOperation::AddConstraint { .. }
                | MigrationOperation::DropConstraint { .. } => false,
                MigrationOperation::AddIndex { index } => matches!(index.kind, IndexKind::BTree),
                _ => true,
            },
            Self::ClickHouse => match operation {
                MigrationOperation::AlterColumnNullability { .. }
                | MigrationOperation::AddConstraint { .. }
                | MigrationOperation::DropConstraint { .. } => false,
                MigrationOperation::AddIndex { index } => {
                    !index.unique && matches!(index.kind, IndexKind::BTree)
                }
                _ => true,
            },
        }
    }

    /// Renders one operation against `table` as a DDL statement, or
    /// `None` when the operation is unsupported here.
    #[must_use]
    pub fn render_operation(&self, table: &str, operation: &MigrationOperation) -> Option<String> {
        if !self.supports(operation) {
            return None;
        }
        let t = self.quote_identifier(table);
        match operation {
            MigrationOperation::AddColumn { column } => match self {
                Self::Sqlite => sqlite::add_column(&t, self, column),
                _ => Some(format!(
                    "ALTER TABLE {t} ADD COLUMN {}",
                    column_sql(*self, column)?
                )),
            },
            MigrationOperation::DropColumn { column } => Some(format!(
                "ALTER TABLE {t} DROP COLUMN {}",
                self.quote_identifier(column)
            )),
            MigrationOperation::AlterColumnType { column, new } => match self {
                Self::Postgres => postgres::alter_column_type(&t, self, new),
                Self::Mysql => Some(format!(
                    "ALTER TABLE {t} MODIFY COLUMN {}",
                    column_sql(*self, new)?
                )),
                Self::DuckDb => Some(format!(
                    "ALTER TABLE {t} ALTER COLUMN {} SET DATA TYPE {}",
                    self.quote_identifier(column),
                    type_sql(*self, new)?
                )),
                Self::ClickHouse => clickhouse::modify_column(&t, self, new),
                Self::Sqlite => None,
            },
            MigrationOperation::AlterColumnNullability { column, nullable } => match self {
                Self::Postgres | Self::DuckDb => {
                    Some(postgres::alter_nullability(&t, self, column, *nullable))
                }
                _ => None,
            },
            MigrationOperation::AlterColumnDefault { column, default } => {
                let c = self.quote_identifier(column);
                match (self, default) {
                    (Self::Sqlite, _) => None,
                    (Self::ClickHouse, Some(default)) => Some(format!(
                        "ALTER TABLE {t} MODIFY COLUMN {c} DEFAULT {}",
                        default_sql(*self, default)
                    )),
                    (Self::ClickHouse, None) => {
                        Some(format!("ALTER TABLE {t} MODIFY COLUMN {c} REMOVE DEFAULT"))
                    }
                    (_, Some(default)) => Some(format!(
                        "ALTER TABLE {t} ALTER COLUMN {c} SET DEFAULT {}",
                        default_sql(*self, default)
                    )),
                    (_, None) => {
                        Some(format!("ALTER TABLE {t} ALTER COLUMN {c} DROP DEFAULT"))
                    }
                }
            }
            MigrationOperation::AddIndex { index } => match self {
                Self::Postgres => postgres::create_index(&t, self, index),
                Self::ClickHouse => clickhouse::add_index(&t, self, index),
                Self::Mysql if index.kind == IndexKind::FullText => Some(format!(
                    "CREATE FULLTEXT INDEX {} ON {t} ({})",
                    self.quote_identifier(&index.name),
                    column_list(*self, &index.columns)
                )),
                _ => {
                    let unique = if index.unique { "UNIQUE " } else { "" };
                    Some(format!(
                        "CREATE {unique}INDEX {} ON {t} ({})",
                        self.quote_identifier(&index.name),
                        column_list(*self, &index.columns)
                    ))
                }
            },
            MigrationOperation::DropIndex { name, .. } => match self {
                Self::Mysql => Some(format!(
                    "DROP INDEX {} ON {t}",
                    self.quote_identifier(name)
                )),
                Self::ClickHouse => clickhouse::drop_index(&t, self, name),
                _ => Some(format!("DROP INDEX {}", self.quote_identifier(name))),
            },
            MigrationOperation::AddConstraint { constraint } => {
                let body = match &constraint.kind {
                    ConstraintKind::Unique { columns } => {
                        format!("UNIQUE ({})", column_list(*self, columns))
                    }
                    ConstraintKind::ForeignKey {
                        column,
                        references_type,
                        references_field,
                    } => format!(
                        "FOREIGN KEY ({}) REFERENCES {} ({})",
                        self.quote_identifier(column),
                        self.quote_identifier(references_type),
                        self.quote_identifier(references_field)
                    ),
                };
                Some(format!(
                    "ALTER TABLE {t} ADD CONSTRAINT {} {body}",
                    self.quote_identifier(&constraint.name)
                ))
            }
            MigrationOperation::DropConstraint { name, .. } => Some(format!(
                "ALTER TABLE {t} DROP CONSTRAINT {}",
                self.quote_identifier(name)
            )),
        }
    }
}

/// Renders a column's full definition: name, type, constraints, default.
pub(super) fn column_sql(dialect: Dialect, column: &ColumnSpec) -> Option<String> {
    let mut sql = format!(
        "{} {}",
        dialect.quote_identifier(&column.name),
        type_sql(dialect, column)?
    );
    if !column.nullable && dialect != Dialect::ClickHouse {
        sql.push_str(" NOT NULL");
    }
    if column.unique && dialect != Dialect::ClickHouse {
        sql.push_str(" UNIQUE");
    }
    if let Some(default) = &column.default {
        sql.push_str(" DEFAULT ");
        sql.push_str(&default_sql(dialect, default));
    }
    Some(sql)
}

/// Renders a column's type, with parametric arguments and array
/// wrapping applied per dialect.
pub(super) fn type_sql(dialect: Dialect, column: &ColumnSpec) -> Option<String> {
    let base = types::dialect_type(dialect, &column.base_type)?;
    let mut sql = base.to_string();
    if let Some(precision) = column.precision {
        match column.scale {
            Some(scale) => sql.push_str(&format!("({precision},{scale})")),
            None => sql.push_str(&format!("({precision})")),
        }
    }
    if column.is_array {
        sql = match dialect {
            Dialect::Postgres | Dialect::DuckDb => format!("{sql}[]"),
            Dialect::ClickHouse => format!("Array({sql})"),
            Dialect::Mysql => "JSON".to_string(),
            Dialect::Sqlite => "TEXT".to_string(),
        };
    } else if dialect == Dialect::ClickHouse && column.nullable {
        sql = format!("Nullable({sql})");
    }
    Some(sql)
}

/// Renders a default value for a dialect.
pub(super) fn default_sql(dialect: Dialect, default: &DefaultValue) -> String {
    match default {
        DefaultValue::String(s) => format!("'{}'", s.replace('\'', "''")),
        DefaultValue::Integer(i) => i.to_string(),
        DefaultValue::Float(f) => f.to_string(),
        DefaultValue::Bool(b) => match dialect {
            Dialect::Mysql | Dialect::Sqlite | Dialect::ClickHouse => {
                if *b { "1" } else { "0" }.to_string()
            }
            _ => b.to_string().to_uppercase(),
        },
        DefaultValue::Function(name) => match (dialect, name.as_str()) {
            (_, "now") => "CURRENT_TIMESTAMP".to_string(),
            (Dialect::Postgres, "uuid") => "gen_random_uuid()".to_string(),
            (Dialect::ClickHouse, "uuid") => "generateUUIDv4()".to_string(),
            (Dialect::Mysql, "uuid") => "(UUID())".to_string(),
            (Dialect::DuckDb, "uuid") => "uuid()".to_string(),
            (_, other) => format!("{other}()"),
        },
    }
}

fn column_list(dialect: Dialect, columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| dialect.quote_identifier(c))
        .collect::<Vec<_>>()
        .join(", ")
}
