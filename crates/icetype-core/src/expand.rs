//! Relation expansion.
//!
//! Flattens related entities into a single wide schema by walking
//! dotted relation paths: expanding `author` on `Post` pulls every
//! scalar field of the author's schema in as `author_<field>`. Used by
//! projection schemas and denormalized read models.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::schema::{FieldModifier, IceTypeSchema, SchemaMap};

/// Expansion failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum ExpandError {
    /// A path segment names no field on the schema reached at that hop.
    #[error("`{schema}` has no field `{segment}`")]
    UnknownPathSegment {
        /// The schema reached at this hop.
        schema: String,
        /// The offending segment.
        segment: String,
    },
    /// A path segment names a scalar field, which cannot be walked
    /// through.
    #[error("`{schema}.{segment}` is not a relation")]
    NotARelation {
        /// The schema reached at this hop.
        schema: String,
        /// The offending segment.
        segment: String,
    },
    /// The relation's target schema is not in the schema set.
    #[error("relation `{segment}` targets unknown schema `{target}`")]
    MissingTargetSchema {
        /// The missing schema name.
        target: String,
        /// The segment whose relation pointed at it.
        segment: String,
    },
    /// The path revisits a schema already on its walk.
    #[error("expanding `{path}` on `{schema}` would cycle")]
    CyclicExpansion {
        /// The root schema.
        schema: String,
        /// The cyclic path.
        path: String,
    },
}

impl ExpandError {
    /// A stable machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::UnknownPathSegment { .. } => "unknown_path_segment",
            Self::NotARelation { .. } => "not_a_relation",
            Self::MissingTargetSchema { .. } => "missing_target_schema",
            Self::CyclicExpansion { .. } => "cyclic_expansion",
        }
    }
}

/// The result of expanding relation paths into a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpandedSchema {
    /// The widened schema: the original fields plus one prefixed copy
    /// of every scalar field reached along each expanded path.
    pub schema: IceTypeSchema,
    /// The paths that were expanded, in request order.
    pub expanded_paths: Vec<String>,
}

/// Expands dotted relation paths into a widened copy of `schema`.
///
/// Each hop merges the target's scalar fields under a `path_` prefix
/// with underscores between segments. Fields reached through an
/// optional or to-many relation become optional: a row may have no
/// related entity to fill them.
///
/// # Errors
///
/// Returns an [`ExpandError`] for unknown segments, scalar segments,
/// missing target schemas, and cyclic paths.
pub fn expand_relations(
    schema: &IceTypeSchema,
    paths: &[String],
    schemas: &SchemaMap,
) -> Result<ExpandedSchema, ExpandError> {
    let mut expanded = schema.clone();
    let mut expanded_paths = Vec::with_capacity(paths.len());

    for path in paths {
        let mut current = schema;
        let mut prefix = String::new();
        let mut nullable_hop = false;
        let mut visited = vec![schema.name.clone()];

        for segment in path.split('.') {
            let field = current.get_field(segment).ok_or_else(|| {
                ExpandError::UnknownPathSegment {
                    schema: current.name.clone(),
                    segment: segment.to_string(),
                }
            })?;
            let relation = field.relation.as_ref().ok_or_else(|| {
                ExpandError::NotARelation {
                    schema: current.name.clone(),
                    segment: segment.to_string(),
                }
            })?;
            let target = schemas.get(&relation.target_type).ok_or_else(|| {
                ExpandError::MissingTargetSchema {
                    target: relation.target_type.clone(),
                    segment: segment.to_string(),
                }
            })?;
            if visited.contains(&target.name) {
                return Err(ExpandError::CyclicExpansion {
                    schema: schema.name.clone(),
                    path: path.clone(),
                });
            }
            visited.push(target.name.clone());
            nullable_hop = nullable_hop || relation.is_optional || relation.is_array;

            prefix = if prefix.is_empty() {
                segment.to_string()
            } else {
                format!("{prefix}_{segment}")
            };

            for scalar in target.scalar_fields() {
                let merged_name = format!("{prefix}_{}", scalar.name);
                let mut merged = scalar.clone().named(&merged_name);
                if nullable_hop {
                    merged.modifier = FieldModifier::Optional;
                }
                // Later paths win on collision; the projection layer
                // rejects ambiguous expansions before this point.
                expanded.fields.insert(merged_name, merged);
            }
            current = target;
        }
        expanded_paths.push(path.clone());
    }

    debug!(
        schema = %schema.name,
        paths = expanded_paths.len(),
        fields = expanded.fields.len(),
        "expanded relations"
    );
    Ok(ExpandedSchema {
        schema: expanded,
        expanded_paths,
    })
}
