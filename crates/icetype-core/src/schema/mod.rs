//! Canonical schema model.
//!
//! These types are produced by the parser and consumed read-only by the
//! validator, diff engine, migration planner, relation expansion, and the
//! external dialect adapters. Nothing mutates a schema in place: every
//! transform produces a new value.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::version::SchemaVersion;

/// Ordered map from schema name to schema, used wherever relation targets
/// must resolve across entities.
pub type SchemaMap = IndexMap<String, IceTypeSchema>;

/// Field modifier symbol applied to a type.
///
/// Exactly one modifier may appear on a field; `!` implies both
/// required and unique, `?` implies optional, `#` implies indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldModifier {
    /// No modifier: required, not unique, not indexed.
    #[default]
    Plain,
    /// `!` — required and unique.
    Required,
    /// `?` — optional (nullable).
    Optional,
    /// `#` — indexed.
    Indexed,
}

impl FieldModifier {
    /// Returns the modifier for a symbol character, if any.
    #[must_use]
    pub const fn from_symbol(c: char) -> Option<Self> {
        match c {
            '!' => Some(Self::Required),
            '?' => Some(Self::Optional),
            '#' => Some(Self::Indexed),
            _ => None,
        }
    }

    /// Returns the symbol character for this modifier, if any.
    #[must_use]
    pub const fn symbol(&self) -> Option<char> {
        match self {
            Self::Plain => None,
            Self::Required => Some('!'),
            Self::Optional => Some('?'),
            Self::Indexed => Some('#'),
        }
    }
}

/// A parsed default value from a trailing `= <literal>` clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultValue {
    /// String literal default.
    String(String),
    /// Integer literal default.
    Integer(i64),
    /// Float literal default.
    Float(f64),
    /// Boolean literal default.
    Bool(bool),
    /// Zero-argument function call shorthand, e.g. `now()` or `uuid()`.
    Function(String),
}

impl DefaultValue {
    /// Renders the default back in field-language syntax.
    #[must_use]
    pub fn to_field_language(&self) -> String {
        match self {
            Self::String(s) => format!("'{}'", s.replace('\'', "''")),
            Self::Integer(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Function(name) => format!("{name}()"),
        }
    }
}

/// The four relation operators of the field language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationOperator {
    /// `->` — forward reference to another entity.
    Forward,
    /// `~>` — fuzzy forward reference (no enforced constraint).
    FuzzyForward,
    /// `<-` — backward reference, inverting a remote field.
    Backward,
    /// `<~` — fuzzy backward reference.
    FuzzyBackward,
}

impl RelationOperator {
    /// Returns the operator's source text.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Forward => "->",
            Self::FuzzyForward => "~>",
            Self::Backward => "<-",
            Self::FuzzyBackward => "<~",
        }
    }

    /// Returns true for `<-` and `<~`.
    #[must_use]
    pub const fn is_backward(&self) -> bool {
        matches!(self, Self::Backward | Self::FuzzyBackward)
    }

    /// Returns true for `~>` and `<~`.
    #[must_use]
    pub const fn is_fuzzy(&self) -> bool {
        matches!(self, Self::FuzzyForward | Self::FuzzyBackward)
    }
}

/// A parsed relation expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationDefinition {
    /// The relation operator.
    pub operator: RelationOperator,
    /// The referenced entity type.
    pub target_type: String,
    /// The remote field this relation inverts. Always present for
    /// backward operators, never for forward ones.
    pub target_field: Option<String>,
    /// Whether the relation is to-many (`[]`).
    pub is_array: bool,
    /// Whether the relation is optional (`?`, forward only).
    pub is_optional: bool,
}

/// A single parsed field definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Field name (column name in DDL output).
    pub name: String,
    /// Canonical base type name from the type registry, or the relation
    /// target type when `relation` is present.
    pub base_type: String,
    /// The single modifier applied to the field.
    pub modifier: FieldModifier,
    /// Whether the field is an array (`[]`), orthogonal to the modifier.
    pub is_array: bool,
    /// Precision argument for parametric types (e.g. `decimal(10,2)`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    /// Scale argument for parametric types.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
    /// Default value from a trailing `= <literal>` clause.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultValue>,
    /// Present iff the field's type is a relation expression.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relation: Option<RelationDefinition>,
}

impl FieldDefinition {
    /// Creates a plain field of the given base type.
    #[must_use]
    pub fn new(name: impl Into<String>, base_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_type: base_type.into(),
            modifier: FieldModifier::Plain,
            is_array: false,
            precision: None,
            scale: None,
            default: None,
            relation: None,
        }
    }

    /// Returns a copy with the given name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the modifier.
    #[must_use]
    pub const fn modifier(mut self, modifier: FieldModifier) -> Self {
        self.modifier = modifier;
        self
    }

    /// Marks the field as an array.
    #[must_use]
    pub const fn array(mut self) -> Self {
        self.is_array = true;
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn default_value(mut self, value: DefaultValue) -> Self {
        self.default = Some(value);
        self
    }

    /// Whether the field is optional (`?`).
    #[must_use]
    pub const fn is_optional(&self) -> bool {
        matches!(self.modifier, FieldModifier::Optional)
    }

    /// Whether the field carries a unique constraint (`!`).
    #[must_use]
    pub const fn is_unique(&self) -> bool {
        matches!(self.modifier, FieldModifier::Required)
    }

    /// Whether the field is indexed (`#`).
    #[must_use]
    pub const fn is_indexed(&self) -> bool {
        matches!(self.modifier, FieldModifier::Indexed)
    }

    /// Whether the field is a relation rather than a primitive.
    #[must_use]
    pub const fn is_relation(&self) -> bool {
        self.relation.is_some()
    }

    /// The comparable type shape: base type, arrayness, and parameters.
    /// Two fields with equal signatures need no type migration.
    #[must_use]
    pub fn type_signature(&self) -> (String, bool, Option<u32>, Option<u32>) {
        (
            self.base_type.clone(),
            self.is_array,
            self.precision,
            self.scale,
        )
    }
}

/// Parsed `$`-prefixed schema-level directives.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SchemaDirectives {
    /// `$type` — overrides the schema name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    /// `$partitionBy` — ordered partitioning field names.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub partition_by: Vec<String>,
    /// `$index` — composite index field tuples.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub index: Vec<Vec<String>>,
    /// `$fts` — full-text-search field names.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fts: Vec<String>,
    /// `$vector` — vector-index field names mapped to dimensions.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub vector: IndexMap<String, u32>,
    /// Projection-layer directives (`$projection`, `$from`, `$expand`,
    /// `$flatten`) carried through verbatim for the projection generator.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub extra: IndexMap<String, serde_json::Value>,
}

impl SchemaDirectives {
    /// Returns true if no directive is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.type_name.is_none()
            && self.partition_by.is_empty()
            && self.index.is_empty()
            && self.fts.is_empty()
            && self.vector.is_empty()
            && self.extra.is_empty()
    }
}

/// The canonical, frozen schema value produced by the parser.
///
/// Field insertion order is declaration order; downstream DDL column
/// order depends on it, which is why `fields` is an ordered map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IceTypeSchema {
    /// Entity name.
    pub name: String,
    /// Schema version.
    pub version: SchemaVersion,
    /// Declared fields, keyed by name, in declaration order.
    pub fields: IndexMap<String, FieldDefinition>,
    /// Schema-level directives.
    pub directives: SchemaDirectives,
    /// Relation fields, keyed by field name, in declaration order.
    pub relations: IndexMap<String, RelationDefinition>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last-update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl IceTypeSchema {
    /// Creates an empty schema with version 1.0.0 and fresh timestamps.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            version: SchemaVersion::default(),
            fields: IndexMap::new(),
            directives: SchemaDirectives::default(),
            relations: IndexMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Adds a field, keeping the relation map in sync.
    #[must_use]
    pub fn field(mut self, field: FieldDefinition) -> Self {
        if let Some(relation) = &field.relation {
            self.relations.insert(field.name.clone(), relation.clone());
        }
        self.fields.insert(field.name.clone(), field);
        self
    }

    /// Gets a field by name.
    #[must_use]
    pub fn get_field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.get(name)
    }

    /// Returns the non-relation fields in declaration order.
    pub fn scalar_fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.fields.values().filter(|f| !f.is_relation())
    }

    /// Returns field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

/// A raw directive or field value, as supplied by the host layer.
///
/// Field-language strings stay strings; directive payloads keep their
/// JSON shape and are validated by `parse_directives`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    /// A field-language definition string, e.g. `"decimal(10,2)?"`.
    Text(String),
    /// A structured directive payload, e.g. the array for `$partitionBy`.
    Json(serde_json::Value),
}

/// The strictly-typed raw schema definition accepted at the parse
/// boundary: an ordered association list of keys to raw values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSchema {
    /// Fallback entity name, used unless a `$type` directive overrides it.
    pub name: String,
    /// Schema version, defaulting to 1.0.0 when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<SchemaVersion>,
    /// Creation timestamp override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Update timestamp override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Keys (field names and `$` directives) in declaration order.
    pub entries: Vec<(String, RawValue)>,
}

impl RawSchema {
    /// Creates an empty raw definition.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            created_at: None,
            updated_at: None,
            entries: Vec::new(),
        }
    }

    /// Adds a field-language entry.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, definition: impl Into<String>) -> Self {
        self.entries
            .push((name.into(), RawValue::Text(definition.into())));
        self
    }

    /// Adds a directive entry with a structured payload.
    #[must_use]
    pub fn directive(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.entries.push((key.into(), RawValue::Json(value)));
        self
    }

    /// Sets the schema version.
    #[must_use]
    pub fn version(mut self, version: SchemaVersion) -> Self {
        self.version = Some(version);
        self
    }

    /// Builds a raw definition from a JSON object, preserving key order.
    /// String values become field-language entries; everything under a
    /// `$` key keeps its JSON shape for directive parsing.
    ///
    /// Returns `None` if `value` is not a JSON object.
    #[must_use]
    pub fn from_json(name: impl Into<String>, value: &serde_json::Value) -> Option<Self> {
        let object = value.as_object()?;
        let mut raw = Self::new(name);
        for (key, entry) in object {
            if key.starts_with('$') {
                raw.entries
                    .push((key.clone(), RawValue::Json(entry.clone())));
            } else if let Some(text) = entry.as_str() {
                raw.entries
                    .push((key.clone(), RawValue::Text(text.to_string())));
            } else {
                raw.entries
                    .push((key.clone(), RawValue::Json(entry.clone())));
            }
        }
        Some(raw)
    }
}
