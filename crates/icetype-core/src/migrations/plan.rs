//! Migration planning.
//!
//! Lowers a [`SchemaDiff`] into an ordered list of DDL operations for
//! one dialect. Operations are bucketed so that constraint and index
//! drops come before column work and new indexes and constraints come
//! last; operations the dialect cannot execute are dropped and recorded
//! as warnings.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::schema::{FieldDefinition, FieldModifier};

use super::diff::{DirectiveValue, SchemaChange, SchemaDiff};
use super::dialect::Dialect;
use super::operation::{
    ColumnSpec, ConstraintKind, ConstraintSpec, IndexKind, IndexSpec, MigrationOperation,
    MigrationStep,
};

/// Options controlling plan generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanOptions {
    /// The target dialect.
    pub dialect: Dialect,
}

impl PlanOptions {
    /// Creates options for a dialect.
    #[must_use]
    pub const fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }
}

/// A non-fatal planning note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanWarning {
    /// The dialect cannot execute this operation; it was dropped from
    /// the plan and must be handled out of band.
    UnsupportedOperation {
        /// The dropped operation.
        operation: MigrationOperation,
    },
    /// Partitioning changed; no ALTER can express that, the table must
    /// be rebuilt and backfilled.
    PartitionChangeRequiresRebuild {
        /// The old partitioning fields.
        old: Vec<String>,
        /// The new partitioning fields.
        new: Vec<String>,
    },
}

impl std::fmt::Display for PlanWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedOperation { operation } => {
                write!(f, "operation unsupported by dialect: {operation:?}")
            }
            Self::PartitionChangeRequiresRebuild { old, new } => write!(
                f,
                "partitioning changed from [{}] to [{}]; table rebuild required",
                old.join(", "),
                new.join(", ")
            ),
        }
    }
}

/// An inconsistency in a generated plan.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    /// A step references a column after an earlier step dropped it.
    #[error("operation touches column `{column}` after it was dropped")]
    ColumnUsedAfterDrop {
        /// The column name.
        column: String,
    },
}

/// An ordered, dialect-filtered migration plan for one schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationPlan {
    /// The schema (table) being migrated.
    pub schema: String,
    /// The target dialect.
    pub dialect: Dialect,
    /// The ordered steps.
    pub steps: Vec<MigrationStep>,
    /// Warnings accumulated during planning.
    pub warnings: Vec<PlanWarning>,
}

impl MigrationPlan {
    /// Returns true when there is nothing to execute.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Whether any step is breaking.
    #[must_use]
    pub fn is_breaking(&self) -> bool {
        self.steps.iter().any(|s| s.breaking)
    }

    /// Renders every step as a DDL statement, in plan order.
    #[must_use]
    pub fn to_sql(&self) -> Vec<String> {
        self.steps
            .iter()
            .filter_map(|step| self.dialect.render_operation(&self.schema, &step.operation))
            .collect()
    }

    /// Checks internal consistency: no step may reference a column that
    /// an earlier step dropped.
    ///
    /// # Errors
    ///
    /// Returns a [`PlanError`] naming the first offending column.
    pub fn validate(&self) -> Result<(), PlanError> {
        let mut dropped: Vec<&str> = Vec::new();
        for step in &self.steps {
            for column in step.operation.columns() {
                if dropped.contains(&column) {
                    return Err(PlanError::ColumnUsedAfterDrop {
                        column: column.to_string(),
                    });
                }
            }
            if let MigrationOperation::DropColumn { column } = &step.operation {
                dropped.push(column);
            }
        }
        Ok(())
    }
}

/// Operation buckets, concatenated in a fixed safe order.
#[derive(Default)]
struct Buckets {
    drop_constraints: Vec<MigrationStep>,
    drop_indexes: Vec<MigrationStep>,
    add_columns: Vec<MigrationStep>,
    alters: Vec<MigrationStep>,
    drop_columns: Vec<MigrationStep>,
    add_indexes: Vec<MigrationStep>,
    add_constraints: Vec<MigrationStep>,
}

impl Buckets {
    fn push(&mut self, operation: MigrationOperation, breaking: bool) {
        let bucket = match &operation {
            MigrationOperation::DropConstraint { .. } => &mut self.drop_constraints,
            MigrationOperation::DropIndex { .. } => &mut self.drop_indexes,
            MigrationOperation::AddColumn { .. } => &mut self.add_columns,
            MigrationOperation::AlterColumnType { .. }
            | MigrationOperation::AlterColumnNullability { .. }
            | MigrationOperation::AlterColumnDefault { .. } => &mut self.alters,
            MigrationOperation::DropColumn { .. } => &mut self.drop_columns,
            MigrationOperation::AddIndex { .. } => &mut self.add_indexes,
            MigrationOperation::AddConstraint { .. } => &mut self.add_constraints,
        };
        bucket.push(MigrationStep {
            operation,
            breaking,
        });
    }

    fn into_steps(self) -> Vec<MigrationStep> {
        let mut steps = self.drop_constraints;
        steps.extend(self.drop_indexes);
        steps.extend(self.add_columns);
        steps.extend(self.alters);
        steps.extend(self.drop_columns);
        steps.extend(self.add_indexes);
        steps.extend(self.add_constraints);
        steps
    }
}

/// Generates the migration plan for a diff.
#[must_use]
pub fn generate_migration_plan(diff: &SchemaDiff, options: &PlanOptions) -> MigrationPlan {
    let mut buckets = Buckets::default();
    let mut warnings = Vec::new();
    let schema = diff.schema.as_str();

    for change in &diff.changes {
        let breaking = change.is_breaking();
        match change {
            SchemaChange::FieldAdded { name, field } => {
                plan_field_addition(schema, name, field, breaking, &mut buckets);
            }
            SchemaChange::FieldRemoved { name, field } => {
                plan_field_removal(schema, name, field, breaking, &mut buckets);
            }
            SchemaChange::FieldTypeChanged { name, old, new } => {
                match (is_physical(old), is_physical(new)) {
                    (true, true) => buckets.push(
                        MigrationOperation::AlterColumnType {
                            column: name.clone(),
                            new: column_spec(new),
                        },
                        breaking,
                    ),
                    (true, false) => plan_field_removal(schema, name, old, breaking, &mut buckets),
                    (false, true) => plan_field_addition(schema, name, new, breaking, &mut buckets),
                    (false, false) => {}
                }
            }
            SchemaChange::FieldModifierChanged { name, old, new } => {
                plan_modifier_change(schema, name, *old, *new, breaking, &mut buckets);
            }
            SchemaChange::DefaultChanged { name, new, .. } => {
                buckets.push(
                    MigrationOperation::AlterColumnDefault {
                        column: name.clone(),
                        default: new.clone(),
                    },
                    breaking,
                );
            }
            SchemaChange::DirectiveChanged {
                directive,
                old,
                new,
            } => {
                plan_directive_change(schema, directive, old, new, breaking, &mut buckets, &mut warnings);
            }
        }
    }

    let dialect = options.dialect;
    let steps = buckets
        .into_steps()
        .into_iter()
        .filter(|step| {
            if dialect.supports(&step.operation) {
                true
            } else {
                warnings.push(PlanWarning::UnsupportedOperation {
                    operation: step.operation.clone(),
                });
                false
            }
        })
        .collect::<Vec<_>>();

    debug!(
        schema,
        dialect = dialect.name(),
        steps = steps.len(),
        warnings = warnings.len(),
        "generated migration plan"
    );
    MigrationPlan {
        schema: schema.to_string(),
        dialect,
        steps,
        warnings,
    }
}

/// Whether a field maps to a physical column. Backward and to-many
/// relations are virtual; forward to-one relations store a key column.
fn is_physical(field: &FieldDefinition) -> bool {
    match &field.relation {
        None => true,
        Some(r) => !r.operator.is_backward() && !r.is_array,
    }
}

/// The column shape for a physical field. Forward relations store the
/// target's key as a uuid column.
fn column_spec(field: &FieldDefinition) -> ColumnSpec {
    if field.is_relation() {
        ColumnSpec {
            name: field.name.clone(),
            base_type: "uuid".to_string(),
            is_array: false,
            precision: None,
            scale: None,
            nullable: field.is_optional(),
            unique: false,
            default: None,
        }
    } else {
        ColumnSpec::from_field(field)
    }
}

fn plan_field_addition(
    schema: &str,
    name: &str,
    field: &FieldDefinition,
    breaking: bool,
    buckets: &mut Buckets,
) {
    if !is_physical(field) {
        return;
    }
    let mut column = column_spec(field);
    column.name = name.to_string();
    buckets.push(MigrationOperation::AddColumn { column }, breaking);

    if let Some(relation) = &field.relation {
        if !relation.operator.is_fuzzy() {
            buckets.push(
                MigrationOperation::AddConstraint {
                    constraint: ConstraintSpec {
                        name: fk_name(schema, name),
                        kind: ConstraintKind::ForeignKey {
                            column: name.to_string(),
                            references_type: relation.target_type.clone(),
                            references_field: "id".to_string(),
                        },
                    },
                },
                breaking,
            );
        }
    } else if field.is_indexed() {
        buckets.push(
            MigrationOperation::AddIndex {
                index: IndexSpec {
                    name: index_name(schema, &[name.to_string()]),
                    columns: vec![name.to_string()],
                    unique: false,
                    kind: IndexKind::BTree,
                },
            },
            breaking,
        );
    }
}

fn plan_field_removal(
    schema: &str,
    name: &str,
    field: &FieldDefinition,
    breaking: bool,
    buckets: &mut Buckets,
) {
    if !is_physical(field) {
        return;
    }
    if let Some(relation) = &field.relation {
        if !relation.operator.is_fuzzy() {
            buckets.push(
                MigrationOperation::DropConstraint {
                    name: fk_name(schema, name),
                    columns: vec![name.to_string()],
                },
                breaking,
            );
        }
    } else if field.is_indexed() {
        buckets.push(
            MigrationOperation::DropIndex {
                name: index_name(schema, &[name.to_string()]),
                columns: vec![name.to_string()],
            },
            breaking,
        );
    }
    buckets.push(
        MigrationOperation::DropColumn {
            column: name.to_string(),
        },
        breaking,
    );
}

fn plan_modifier_change(
    schema: &str,
    name: &str,
    old: FieldModifier,
    new: FieldModifier,
    breaking: bool,
    buckets: &mut Buckets,
) {
    let was_optional = old == FieldModifier::Optional;
    let is_optional = new == FieldModifier::Optional;
    if was_optional != is_optional {
        buckets.push(
            MigrationOperation::AlterColumnNullability {
                column: name.to_string(),
                nullable: is_optional,
            },
            breaking,
        );
    }

    let was_unique = old == FieldModifier::Required;
    let is_unique = new == FieldModifier::Required;
    if was_unique && !is_unique {
        buckets.push(
            MigrationOperation::DropConstraint {
                name: unique_name(schema, name),
                columns: vec![name.to_string()],
            },
            breaking,
        );
    } else if is_unique && !was_unique {
        buckets.push(
            MigrationOperation::AddConstraint {
                constraint: ConstraintSpec {
                    name: unique_name(schema, name),
                    kind: ConstraintKind::Unique {
                        columns: vec![name.to_string()],
                    },
                },
            },
            breaking,
        );
    }

    let was_indexed = old == FieldModifier::Indexed;
    let is_indexed = new == FieldModifier::Indexed;
    if was_indexed && !is_indexed {
        buckets.push(
            MigrationOperation::DropIndex {
                name: index_name(schema, &[name.to_string()]),
                columns: vec![name.to_string()],
            },
            breaking,
        );
    } else if is_indexed && !was_indexed {
        buckets.push(
            MigrationOperation::AddIndex {
                index: IndexSpec {
                    name: index_name(schema, &[name.to_string()]),
                    columns: vec![name.to_string()],
                    unique: false,
                    kind: IndexKind::BTree,
                },
            },
            breaking,
        );
    }
}

#[allow(clippy::too_many_arguments)]
fn plan_directive_change(
    schema: &str,
    directive: &str,
    old: &DirectiveValue,
    new: &DirectiveValue,
    breaking: bool,
    buckets: &mut Buckets,
    warnings: &mut Vec<PlanWarning>,
) {
    match (directive, old, new) {
        ("$partitionBy", DirectiveValue::FieldList(old), DirectiveValue::FieldList(new)) => {
            warnings.push(PlanWarning::PartitionChangeRequiresRebuild {
                old: old.clone(),
                new: new.clone(),
            });
        }
        ("$index", DirectiveValue::Tuples(old), DirectiveValue::Tuples(new)) => {
            for tuple in old.iter().filter(|t| !new.contains(t)) {
                buckets.push(
                    MigrationOperation::DropIndex {
                        name: index_name(schema, tuple),
                        columns: tuple.clone(),
                    },
                    breaking,
                );
            }
            for tuple in new.iter().filter(|t| !old.contains(t)) {
                buckets.push(
                    MigrationOperation::AddIndex {
                        index: IndexSpec {
                            name: index_name(schema, tuple),
                            columns: tuple.clone(),
                            unique: false,
                            kind: IndexKind::BTree,
                        },
                    },
                    breaking,
                );
            }
        }
        ("$fts", DirectiveValue::FieldList(old), DirectiveValue::FieldList(new)) => {
            for field in old.iter().filter(|f| !new.contains(f)) {
                buckets.push(
                    MigrationOperation::DropIndex {
                        name: fts_name(schema, field),
                        columns: vec![field.clone()],
                    },
                    breaking,
                );
            }
            for field in new.iter().filter(|f| !old.contains(f)) {
                buckets.push(
                    MigrationOperation::AddIndex {
                        index: IndexSpec {
                            name: fts_name(schema, field),
                            columns: vec![field.clone()],
                            unique: false,
                            kind: IndexKind::FullText,
                        },
                    },
                    breaking,
                );
            }
        }
        ("$vector", DirectiveValue::Dimensions(old), DirectiveValue::Dimensions(new)) => {
            for (field, dim) in old {
                if new.get(field) != Some(dim) {
                    buckets.push(
                        MigrationOperation::DropIndex {
                            name: vector_name(schema, field),
                            columns: vec![field.clone()],
                        },
                        breaking,
                    );
                }
            }
            for (field, dim) in new {
                if old.get(field) != Some(dim) {
                    buckets.push(
                        MigrationOperation::AddIndex {
                            index: IndexSpec {
                                name: vector_name(schema, field),
                                columns: vec![field.clone()],
                                unique: false,
                                kind: IndexKind::Vector(*dim),
                            },
                        },
                        breaking,
                    );
                }
            }
        }
        _ => {}
    }
}

fn index_name(schema: &str, columns: &[String]) -> String {
    format!("idx_{}_{}", schema.to_lowercase(), columns.join("_"))
}

fn fts_name(schema: &str, field: &str) -> String {
    format!("fts_{}_{field}", schema.to_lowercase())
}

fn vector_name(schema: &str, field: &str) -> String {
    format!("vec_{}_{field}", schema.to_lowercase())
}

fn unique_name(schema: &str, field: &str) -> String {
    format!("uq_{}_{field}", schema.to_lowercase())
}

fn fk_name(schema: &str, field: &str) -> String {
    format!("fk_{}_{field}", schema.to_lowercase())
}
