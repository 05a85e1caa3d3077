//! # icetype-core
//!
//! A compiler for a compact field-language: schemas are written as
//! short annotated type strings (`"uuid!"`, `"decimal(10,2)?"`,
//! `"<- Post.author[]"`) and compiled into a canonical model with
//! versioning, diffing, and migration planning on top.
//!
//! This crate provides:
//! - A hand-written lexer and recursive descent parser for field and
//!   relation definitions
//! - A canonical schema model with `$`-prefixed schema directives
//! - Type inference from sample values
//! - Cross-schema validation of relations and directive references
//! - A semantic diff engine and a dialect-aware migration planner
//!
//! ## Parsing a schema
//!
//! ```rust
//! use icetype_core::{parse_schema, RawSchema};
//!
//! let raw = RawSchema::new("User")
//!     .field("id", "uuid!")
//!     .field("email", "string!")
//!     .field("bio", "string?")
//!     .field("posts", "<- Post.author[]");
//!
//! let schema = parse_schema(&raw).unwrap();
//! assert!(schema.get_field("bio").unwrap().is_optional());
//! assert!(schema.relations.contains_key("posts"));
//! ```
//!
//! ## Diffing and planning
//!
//! ```rust
//! use icetype_core::{
//!     diff_schemas, generate_migration_plan, parse_schema, Dialect, PlanOptions, RawSchema,
//! };
//!
//! let v1 = parse_schema(&RawSchema::new("User").field("id", "uuid!")).unwrap();
//! let v2 = parse_schema(
//!     &RawSchema::new("User")
//!         .field("id", "uuid!")
//!         .field("email", "string!"),
//! )
//! .unwrap();
//!
//! let diff = diff_schemas(&v1, &v2);
//! assert!(!diff.is_breaking);
//!
//! let plan = generate_migration_plan(&diff, &PlanOptions::new(Dialect::Postgres));
//! assert_eq!(plan.to_sql().len(), 1);
//! ```

pub mod adapter;
pub mod expand;
pub mod infer;
pub mod lexer;
pub mod migrations;
pub mod parser;
pub mod schema;
pub mod types;
pub mod validate;
pub mod version;

pub use adapter::SchemaAdapter;
pub use expand::{expand_relations, ExpandError, ExpandedSchema};
pub use infer::{infer_type, SampleValue};
pub use lexer::{Lexer, Span, Token, TokenKind};
pub use migrations::{
    diff_schemas, generate_migration_plan, Dialect, MigrationOperation, MigrationPlan,
    MigrationStep, PlanError, PlanOptions, PlanWarning, SchemaChange, SchemaDiff,
};
pub use parser::{
    is_relation_string, parse_directives, parse_relation_string, parse_schema, parse_type_string,
    tokenize, ParseError,
};
pub use schema::{
    DefaultValue, FieldDefinition, FieldModifier, IceTypeSchema, RawSchema, RawValue,
    RelationDefinition, RelationOperator, SchemaDirectives, SchemaMap,
};
pub use validate::{validate_schema, ValidationIssue, ValidationResult};
pub use version::{compare_versions, is_compatible, SchemaVersion, VersionParseError};
