//! Cross-schema validation.
//!
//! Parsing checks each definition string in isolation; validation checks
//! the properties that need the whole schema, or the whole schema set:
//! relation targets, directive field references, and constraint shapes.
//! All problems are accumulated, never short-circuited.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::schema::{IceTypeSchema, SchemaMap};

/// A single validation problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Dotted path to the offending element, e.g. `User.posts` or
    /// `User.$index[1]`.
    pub path: String,
    /// Human-readable description.
    pub message: String,
}

impl ValidationIssue {
    fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// The outcome of validating one schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// True when no issues were found.
    pub valid: bool,
    /// All issues found, in field/directive order.
    pub errors: Vec<ValidationIssue>,
}

impl ValidationResult {
    fn from_issues(errors: Vec<ValidationIssue>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Validates a schema against the full schema set.
///
/// `schemas` supplies the relation targets; the schema under validation
/// need not be a member of it. Never fails: every problem becomes an
/// issue in the result.
#[must_use]
pub fn validate_schema(schema: &IceTypeSchema, schemas: &SchemaMap) -> ValidationResult {
    let mut issues = Vec::new();

    for (name, field) in &schema.fields {
        let path = format!("{}.{}", schema.name, name);
        if field.is_unique() && field.is_array {
            issues.push(ValidationIssue::new(
                &path,
                "unique constraint cannot apply to an array field",
            ));
        }
        if let Some(relation) = &field.relation {
            let Some(target) = schemas.get(&relation.target_type) else {
                issues.push(ValidationIssue::new(
                    &path,
                    format!("relation target `{}` is not a known schema", relation.target_type),
                ));
                continue;
            };
            if let Some(target_field) = &relation.target_field {
                if target.get_field(target_field).is_none() {
                    issues.push(ValidationIssue::new(
                        &path,
                        format!(
                            "relation target field `{}.{}` does not exist",
                            relation.target_type, target_field
                        ),
                    ));
                }
            }
        }
    }

    check_directives(schema, &mut issues);

    debug!(
        schema = %schema.name,
        issues = issues.len(),
        "validated schema"
    );
    ValidationResult::from_issues(issues)
}

fn check_directives(schema: &IceTypeSchema, issues: &mut Vec<ValidationIssue>) {
    let directives = &schema.directives;

    for field in &directives.partition_by {
        let path = format!("{}.$partitionBy", schema.name);
        match schema.get_field(field) {
            None => issues.push(ValidationIssue::new(
                &path,
                format!("partition field `{field}` is not declared"),
            )),
            Some(f) if f.is_optional() => issues.push(ValidationIssue::new(
                &path,
                format!("partition field `{field}` cannot be optional"),
            )),
            Some(_) => {}
        }
    }

    for (i, tuple) in directives.index.iter().enumerate() {
        let path = format!("{}.$index[{i}]", schema.name);
        for field in tuple {
            if schema.get_field(field).is_none() {
                issues.push(ValidationIssue::new(
                    &path,
                    format!("index field `{field}` is not declared"),
                ));
            }
        }
    }

    for field in &directives.fts {
        if schema.get_field(field).is_none() {
            issues.push(ValidationIssue::new(
                format!("{}.$fts", schema.name),
                format!("full-text field `{field}` is not declared"),
            ));
        }
    }

    for (field, dim) in &directives.vector {
        let path = format!("{}.$vector", schema.name);
        if schema.get_field(field).is_none() {
            issues.push(ValidationIssue::new(
                &path,
                format!("vector field `{field}` is not declared"),
            ));
        }
        if *dim == 0 {
            issues.push(ValidationIssue::new(
                &path,
                format!("vector field `{field}` must have a non-zero dimension"),
            ));
        }
    }
}
