//! Schema diff engine.
//!
//! Compares two versions of the same schema field by field and directive
//! by directive. The diff is semantic, not textual: field order changes
//! and alias spelling differences produce no changes.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::schema::{
    DefaultValue, FieldDefinition, FieldModifier, IceTypeSchema, RelationOperator,
};

/// A directive payload captured on either side of a change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectiveValue {
    /// An ordered field-name list (`$partitionBy`, `$fts`).
    FieldList(Vec<String>),
    /// Composite index tuples (`$index`).
    Tuples(Vec<Vec<String>>),
    /// Vector fields mapped to dimensions (`$vector`).
    Dimensions(IndexMap<String, u32>),
}

/// A single semantic change between two schema versions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SchemaChange {
    /// A field exists only in the new schema.
    FieldAdded {
        /// Field name.
        name: String,
        /// The new field.
        field: FieldDefinition,
    },
    /// A field exists only in the old schema.
    FieldRemoved {
        /// Field name.
        name: String,
        /// The removed field, kept for reversal.
        field: FieldDefinition,
    },
    /// A field's type shape or relation changed.
    FieldTypeChanged {
        /// Field name.
        name: String,
        /// The old definition.
        old: FieldDefinition,
        /// The new definition.
        new: FieldDefinition,
    },
    /// A field's modifier changed.
    FieldModifierChanged {
        /// Field name.
        name: String,
        /// The old modifier.
        old: FieldModifier,
        /// The new modifier.
        new: FieldModifier,
    },
    /// A field's default value changed.
    DefaultChanged {
        /// Field name.
        name: String,
        /// The old default.
        old: Option<DefaultValue>,
        /// The new default.
        new: Option<DefaultValue>,
    },
    /// A schema-level directive changed.
    DirectiveChanged {
        /// Directive key, e.g. `$index`.
        directive: String,
        /// The old payload.
        old: DirectiveValue,
        /// The new payload.
        new: DirectiveValue,
    },
}

impl SchemaChange {
    /// Whether applying this change can lose data or invalidate readers
    /// of the old schema.
    #[must_use]
    pub fn is_breaking(&self) -> bool {
        match self {
            Self::FieldAdded { .. } | Self::DefaultChanged { .. } => false,
            Self::FieldRemoved { .. } | Self::FieldTypeChanged { .. } => true,
            Self::FieldModifierChanged { old, new, .. } => {
                let became_required =
                    *old == FieldModifier::Optional && *new != FieldModifier::Optional;
                let unique_removed =
                    *old == FieldModifier::Required && *new != FieldModifier::Required;
                let index_removed =
                    *old == FieldModifier::Indexed && *new != FieldModifier::Indexed;
                became_required || unique_removed || index_removed
            }
            Self::DirectiveChanged {
                directive,
                old,
                new,
            } => directive_change_is_breaking(directive, old, new),
        }
    }
}

fn directive_change_is_breaking(directive: &str, old: &DirectiveValue, new: &DirectiveValue) -> bool {
    match directive {
        // Repartitioning always rewrites the physical layout.
        "$partitionBy" => true,
        "$index" => {
            let (DirectiveValue::Tuples(old), DirectiveValue::Tuples(new)) = (old, new) else {
                return true;
            };
            let new_set: BTreeSet<&Vec<String>> = new.iter().collect();
            old.iter().any(|tuple| !new_set.contains(tuple))
        }
        "$fts" => {
            let (DirectiveValue::FieldList(old), DirectiveValue::FieldList(new)) = (old, new)
            else {
                return true;
            };
            let new_set: BTreeSet<&String> = new.iter().collect();
            old.iter().any(|field| !new_set.contains(field))
        }
        "$vector" => {
            let (DirectiveValue::Dimensions(old), DirectiveValue::Dimensions(new)) = (old, new)
            else {
                return true;
            };
            old.iter().any(|(field, dim)| new.get(field) != Some(dim))
        }
        _ => true,
    }
}

/// The full delta between two versions of one schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDiff {
    /// The schema name (taken from the new side).
    pub schema: String,
    /// All changes: additions first, then in-place changes, then
    /// removals, then directive changes.
    pub changes: Vec<SchemaChange>,
    /// True when any change is breaking.
    pub is_breaking: bool,
}

impl SchemaDiff {
    /// Returns true when the two schemas were semantically identical.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Returns the inverse diff: applying it to the new schema yields
    /// the old one. Change order is reversed so removals undo last.
    #[must_use]
    pub fn reverse(&self) -> Self {
        let changes: Vec<SchemaChange> = self
            .changes
            .iter()
            .rev()
            .map(|change| match change.clone() {
                SchemaChange::FieldAdded { name, field } => {
                    SchemaChange::FieldRemoved { name, field }
                }
                SchemaChange::FieldRemoved { name, field } => {
                    SchemaChange::FieldAdded { name, field }
                }
                SchemaChange::FieldTypeChanged { name, old, new } => {
                    SchemaChange::FieldTypeChanged {
                        name,
                        old: new,
                        new: old,
                    }
                }
                SchemaChange::FieldModifierChanged { name, old, new } => {
                    SchemaChange::FieldModifierChanged {
                        name,
                        old: new,
                        new: old,
                    }
                }
                SchemaChange::DefaultChanged { name, old, new } => SchemaChange::DefaultChanged {
                    name,
                    old: new,
                    new: old,
                },
                SchemaChange::DirectiveChanged {
                    directive,
                    old,
                    new,
                } => SchemaChange::DirectiveChanged {
                    directive,
                    old: new,
                    new: old,
                },
            })
            .collect();
        let is_breaking = changes.iter().any(SchemaChange::is_breaking);
        Self {
            schema: self.schema.clone(),
            changes,
            is_breaking,
        }
    }
}

/// Computes the semantic delta from `old` to `new`.
#[must_use]
pub fn diff_schemas(old: &IceTypeSchema, new: &IceTypeSchema) -> SchemaDiff {
    let mut changes = Vec::new();

    for (name, field) in &new.fields {
        if !old.fields.contains_key(name) {
            changes.push(SchemaChange::FieldAdded {
                name: name.clone(),
                field: field.clone(),
            });
        }
    }

    for (name, new_field) in &new.fields {
        let Some(old_field) = old.get_field(name) else {
            continue;
        };
        if old_field.type_signature() != new_field.type_signature()
            || relation_shape(old_field) != relation_shape(new_field)
        {
            changes.push(SchemaChange::FieldTypeChanged {
                name: name.clone(),
                old: old_field.clone(),
                new: new_field.clone(),
            });
        }
        if old_field.modifier != new_field.modifier {
            changes.push(SchemaChange::FieldModifierChanged {
                name: name.clone(),
                old: old_field.modifier,
                new: new_field.modifier,
            });
        }
        if old_field.default != new_field.default {
            changes.push(SchemaChange::DefaultChanged {
                name: name.clone(),
                old: old_field.default.clone(),
                new: new_field.default.clone(),
            });
        }
    }

    for (name, field) in &old.fields {
        if !new.fields.contains_key(name) {
            changes.push(SchemaChange::FieldRemoved {
                name: name.clone(),
                field: field.clone(),
            });
        }
    }

    diff_directives(old, new, &mut changes);

    let is_breaking = changes.iter().any(SchemaChange::is_breaking);
    debug!(
        schema = %new.name,
        changes = changes.len(),
        breaking = is_breaking,
        "computed schema diff"
    );
    SchemaDiff {
        schema: new.name.clone(),
        changes,
        is_breaking,
    }
}

/// The comparable shape of a relation: operator, target type, and remote
/// field. Optionality is a modifier-level property and arrayness is part
/// of the type signature, so neither belongs here.
fn relation_shape(field: &FieldDefinition) -> Option<(RelationOperator, &str, Option<&str>)> {
    field
        .relation
        .as_ref()
        .map(|r| (r.operator, r.target_type.as_str(), r.target_field.as_deref()))
}

fn diff_directives(old: &IceTypeSchema, new: &IceTypeSchema, changes: &mut Vec<SchemaChange>) {
    let (od, nd) = (&old.directives, &new.directives);

    if od.partition_by != nd.partition_by {
        changes.push(SchemaChange::DirectiveChanged {
            directive: "$partitionBy".to_string(),
            old: DirectiveValue::FieldList(od.partition_by.clone()),
            new: DirectiveValue::FieldList(nd.partition_by.clone()),
        });
    }

    // Index tuples and fts fields are sets: reordering is not a change.
    let old_index: BTreeSet<&Vec<String>> = od.index.iter().collect();
    let new_index: BTreeSet<&Vec<String>> = nd.index.iter().collect();
    if old_index != new_index {
        changes.push(SchemaChange::DirectiveChanged {
            directive: "$index".to_string(),
            old: DirectiveValue::Tuples(od.index.clone()),
            new: DirectiveValue::Tuples(nd.index.clone()),
        });
    }

    let old_fts: BTreeSet<&String> = od.fts.iter().collect();
    let new_fts: BTreeSet<&String> = nd.fts.iter().collect();
    if old_fts != new_fts {
        changes.push(SchemaChange::DirectiveChanged {
            directive: "$fts".to_string(),
            old: DirectiveValue::FieldList(od.fts.clone()),
            new: DirectiveValue::FieldList(nd.fts.clone()),
        });
    }

    if od.vector != nd.vector {
        changes.push(SchemaChange::DirectiveChanged {
            directive: "$vector".to_string(),
            old: DirectiveValue::Dimensions(od.vector.clone()),
            new: DirectiveValue::Dimensions(nd.vector.clone()),
        });
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::parser::parse_schema;
    use crate::schema::RawSchema;

    use super::*;

    fn parse(raw: RawSchema) -> IceTypeSchema {
        parse_schema(&raw).unwrap()
    }

    fn base_user() -> RawSchema {
        RawSchema::new("User")
            .field("id", "uuid!")
            .field("name", "string")
            .field("age", "int?")
    }

    #[test]
    fn test_identical_schemas_empty_diff() {
        let diff = diff_schemas(&parse(base_user()), &parse(base_user()));
        assert!(diff.is_empty());
        assert!(!diff.is_breaking);
    }

    #[test]
    fn test_field_addition_is_not_breaking() {
        let new = parse(base_user().field("email", "string!"));
        let diff = diff_schemas(&parse(base_user()), &new);
        assert_eq!(diff.changes.len(), 1);
        assert!(matches!(
            &diff.changes[0],
            SchemaChange::FieldAdded { name, .. } if name == "email"
        ));
        assert!(!diff.is_breaking);
    }

    #[test]
    fn test_field_removal_is_breaking() {
        let old = parse(base_user().field("email", "string!"));
        let diff = diff_schemas(&old, &parse(base_user()));
        assert!(matches!(
            &diff.changes[0],
            SchemaChange::FieldRemoved { name, .. } if name == "email"
        ));
        assert!(diff.is_breaking);
    }

    #[test]
    fn test_type_change_is_breaking() {
        let old = parse(RawSchema::new("User").field("age", "string"));
        let new = parse(RawSchema::new("User").field("age", "int"));
        let diff = diff_schemas(&old, &new);
        assert_eq!(diff.changes.len(), 1);
        assert!(matches!(
            &diff.changes[0],
            SchemaChange::FieldTypeChanged { name, .. } if name == "age"
        ));
        assert!(diff.is_breaking);
    }

    #[test]
    fn test_alias_spelling_is_not_a_change() {
        let old = parse(RawSchema::new("User").field("ok", "boolean"));
        let new = parse(RawSchema::new("User").field("ok", "bool"));
        assert!(diff_schemas(&old, &new).is_empty());
    }

    #[test]
    fn test_field_reorder_is_not_a_change() {
        let old = parse(RawSchema::new("User").field("a", "int").field("b", "int"));
        let new = parse(RawSchema::new("User").field("b", "int").field("a", "int"));
        assert!(diff_schemas(&old, &new).is_empty());
    }

    #[test]
    fn test_modifier_breaking_rules() {
        let cases = [
            ("string", "string?", false),
            ("string?", "string", true),
            ("string", "string!", false),
            ("string!", "string", true),
            ("string#", "string", true),
            ("string", "string#", false),
        ];
        for (old_def, new_def, breaking) in cases {
            let old = parse(RawSchema::new("T").field("f", old_def));
            let new = parse(RawSchema::new("T").field("f", new_def));
            let diff = diff_schemas(&old, &new);
            assert_eq!(
                diff.is_breaking, breaking,
                "`{old_def}` -> `{new_def}` breaking should be {breaking}"
            );
        }
    }

    #[test]
    fn test_default_change_is_not_breaking() {
        let old = parse(RawSchema::new("T").field("n", "int = 0"));
        let new = parse(RawSchema::new("T").field("n", "int = 1"));
        let diff = diff_schemas(&old, &new);
        assert!(matches!(&diff.changes[0], SchemaChange::DefaultChanged { .. }));
        assert!(!diff.is_breaking);
    }

    #[test]
    fn test_partition_change_is_breaking() {
        let old = parse(base_user().directive("$partitionBy", json!(["id"])));
        let new = parse(base_user().directive("$partitionBy", json!(["name"])));
        let diff = diff_schemas(&old, &new);
        assert!(diff.is_breaking);
    }

    #[test]
    fn test_index_addition_not_breaking_removal_breaking() {
        let none = parse(base_user());
        let indexed = parse(base_user().directive("$index", json!([["name"]])));
        assert!(!diff_schemas(&none, &indexed).is_breaking);
        assert!(diff_schemas(&indexed, &none).is_breaking);
    }

    #[test]
    fn test_index_reorder_is_not_a_change() {
        let ab = parse(base_user().directive("$index", json!([["id"], ["name"]])));
        let ba = parse(base_user().directive("$index", json!([["name"], ["id"]])));
        assert!(diff_schemas(&ab, &ba).is_empty());
    }

    #[test]
    fn test_vector_dimension_change_is_breaking() {
        let old = parse(base_user().directive("$vector", json!({"name": 512})));
        let new = parse(base_user().directive("$vector", json!({"name": 768})));
        assert!(diff_schemas(&old, &new).is_breaking);
    }

    #[test]
    fn test_relation_retarget_is_a_type_change() {
        let old = parse(RawSchema::new("Post").field("author", "-> User"));
        let new = parse(RawSchema::new("Post").field("author", "-> Account"));
        let diff = diff_schemas(&old, &new);
        assert!(matches!(
            &diff.changes[0],
            SchemaChange::FieldTypeChanged { .. }
        ));
    }

    #[test]
    fn test_relation_loosening_is_a_modifier_change_only() {
        let old = parse(RawSchema::new("Post").field("author", "-> User"));
        let new = parse(RawSchema::new("Post").field("author", "-> User?"));
        let diff = diff_schemas(&old, &new);
        assert_eq!(diff.changes.len(), 1);
        assert!(matches!(
            &diff.changes[0],
            SchemaChange::FieldModifierChanged { name, old, new }
                if name == "author"
                    && *old == FieldModifier::Plain
                    && *new == FieldModifier::Optional
        ));
        assert!(!diff.is_breaking);
        // Tightening it back is the breaking direction.
        assert!(diff.reverse().is_breaking);
    }

    #[test]
    fn test_reverse_round_trip() {
        let old = parse(base_user().field("email", "string!"));
        let new = parse(base_user().field("bio", "string?"));
        let diff = diff_schemas(&old, &new);
        let reversed = diff.reverse();
        assert_eq!(reversed.changes.len(), diff.changes.len());
        // The reverse of the reverse restores the original changes, in
        // the original order.
        assert_eq!(reversed.reverse().changes, diff.changes);
        // Adding bio reversed is removing bio.
        assert!(reversed.changes.iter().any(|c| matches!(
            c,
            SchemaChange::FieldRemoved { name, .. } if name == "bio"
        )));
        assert!(reversed.is_breaking);
    }
}
