//! Schema diffing and migration planning.
//!
//! `diff_schemas` computes the semantic delta between two versions of a
//! schema; `generate_migration_plan` lowers that delta into ordered,
//! dialect-filtered DDL operations.

pub mod dialect;
pub mod diff;
pub mod operation;
pub mod plan;

pub use dialect::Dialect;
pub use diff::{diff_schemas, DirectiveValue, SchemaChange, SchemaDiff};
pub use operation::{
    ColumnSpec, ConstraintKind, ConstraintSpec, IndexKind, IndexSpec, MigrationOperation,
    MigrationStep,
};
pub use plan::{generate_migration_plan, MigrationPlan, PlanError, PlanOptions, PlanWarning};
