//! Migration operations.
//!
//! The dialect-neutral DDL vocabulary the planner emits. Rendering to
//! SQL text happens in the dialect module.

use serde::{Deserialize, Serialize};

use crate::schema::{DefaultValue, FieldDefinition};

/// A dialect-neutral column description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Column name.
    pub name: String,
    /// Canonical base type from the type registry.
    pub base_type: String,
    /// Whether the column holds an array.
    pub is_array: bool,
    /// Precision for parametric types.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    /// Scale for parametric types.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
    /// Whether NULL is allowed.
    pub nullable: bool,
    /// Whether a UNIQUE constraint applies.
    pub unique: bool,
    /// Default value, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultValue>,
}

impl ColumnSpec {
    /// Builds a column spec from a scalar field definition.
    #[must_use]
    pub fn from_field(field: &FieldDefinition) -> Self {
        Self {
            name: field.name.clone(),
            base_type: field.base_type.clone(),
            is_array: field.is_array,
            precision: field.precision,
            scale: field.scale,
            nullable: field.is_optional(),
            unique: field.is_unique(),
            default: field.default.clone(),
        }
    }
}

/// The kind of index to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexKind {
    /// Ordinary b-tree index.
    BTree,
    /// Full-text-search index.
    FullText,
    /// Vector similarity index with the given dimension.
    Vector(u32),
}

/// A dialect-neutral index description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSpec {
    /// Index name.
    pub name: String,
    /// Indexed columns, in order.
    pub columns: Vec<String>,
    /// Whether the index enforces uniqueness.
    pub unique: bool,
    /// Index kind.
    pub kind: IndexKind,
}

/// The kind of table constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    /// A UNIQUE constraint over one or more columns.
    Unique {
        /// Constrained columns.
        columns: Vec<String>,
    },
    /// A foreign key from one column to another schema's field.
    ForeignKey {
        /// The local column.
        column: String,
        /// The referenced schema.
        references_type: String,
        /// The referenced field.
        references_field: String,
    },
}

/// A dialect-neutral constraint description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintSpec {
    /// Constraint name.
    pub name: String,
    /// What the constraint enforces.
    pub kind: ConstraintKind,
}

/// A single dialect-neutral DDL operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum MigrationOperation {
    /// Add a column.
    AddColumn {
        /// The column to add.
        column: ColumnSpec,
    },
    /// Drop a column.
    DropColumn {
        /// The column name.
        column: String,
    },
    /// Change a column's type shape.
    AlterColumnType {
        /// The column name.
        column: String,
        /// The target column shape.
        new: ColumnSpec,
    },
    /// Change a column's nullability.
    AlterColumnNullability {
        /// The column name.
        column: String,
        /// Whether NULL is now allowed.
        nullable: bool,
    },
    /// Set or clear a column's default value.
    AlterColumnDefault {
        /// The column name.
        column: String,
        /// The new default, or `None` to clear it.
        default: Option<DefaultValue>,
    },
    /// Create an index.
    AddIndex {
        /// The index to create.
        index: IndexSpec,
    },
    /// Drop an index.
    DropIndex {
        /// The index name.
        name: String,
        /// The columns it covered.
        columns: Vec<String>,
    },
    /// Add a table constraint.
    AddConstraint {
        /// The constraint to add.
        constraint: ConstraintSpec,
    },
    /// Drop a table constraint.
    DropConstraint {
        /// The constraint name.
        name: String,
        /// The columns it covered.
        columns: Vec<String>,
    },
}

impl MigrationOperation {
    /// The columns this operation touches, used for plan validation.
    #[must_use]
    pub fn columns(&self) -> Vec<&str> {
        match self {
            Self::AddColumn { column } | Self::AlterColumnType { column: _, new: column } => {
                vec![column.name.as_str()]
            }
            Self::DropColumn { column }
            | Self::AlterColumnNullability { column, .. }
            | Self::AlterColumnDefault { column, .. } => {
                vec![column.as_str()]
            }
            Self::AddIndex { index } => index.columns.iter().map(String::as_str).collect(),
            Self::DropIndex { columns, .. } | Self::DropConstraint { columns, .. } => {
                columns.iter().map(String::as_str).collect()
            }
            Self::AddConstraint { constraint } => match &constraint.kind {
                ConstraintKind::Unique { columns } => {
                    columns.iter().map(String::as_str).collect()
                }
                ConstraintKind::ForeignKey { column, .. } => vec![column.as_str()],
            },
        }
    }
}

/// One planned operation, tagged with whether it is breaking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationStep {
    /// The operation.
    pub operation: MigrationOperation,
    /// Whether this step came from a breaking change.
    pub breaking: bool,
}
