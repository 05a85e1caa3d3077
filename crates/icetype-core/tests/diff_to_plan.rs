//! Integration tests for the diff engine and migration planner.
//!
//! These tests walk realistic schema evolutions end to end: parse both
//! versions, diff them, plan for a dialect, and check the rendered DDL.

use serde_json::json;

use icetype_core::{
    diff_schemas, generate_migration_plan, is_compatible, parse_schema, Dialect,
    MigrationOperation, MigrationPlan, PlanOptions, PlanWarning, RawSchema, SchemaChange,
    SchemaDiff, SchemaVersion,
};

fn parse(raw: RawSchema) -> icetype_core::IceTypeSchema {
    parse_schema(&raw).unwrap()
}

fn user_v1() -> RawSchema {
    RawSchema::new("User")
        .field("id", "uuid!")
        .field("name", "string")
        .field("age", "string")
        .field("legacy_code", "int#")
}

fn user_v2() -> RawSchema {
    RawSchema::new("User")
        .field("id", "uuid!")
        .field("name", "string")
        .field("age", "int")
        .field("email", "string!")
        .directive("$index", json!([["name"]]))
}

#[test]
fn evolution_diff_captures_every_change() {
    let diff = diff_schemas(&parse(user_v1()), &parse(user_v2()));
    assert_eq!(diff.schema, "User");
    assert_eq!(diff.changes.len(), 4);
    assert!(diff.is_breaking);

    assert!(diff.changes.iter().any(|c| matches!(
        c,
        SchemaChange::FieldAdded { name, .. } if name == "email"
    )));
    assert!(diff.changes.iter().any(|c| matches!(
        c,
        SchemaChange::FieldTypeChanged { name, .. } if name == "age"
    )));
    assert!(diff.changes.iter().any(|c| matches!(
        c,
        SchemaChange::FieldRemoved { name, .. } if name == "legacy_code"
    )));
    assert!(diff.changes.iter().any(|c| matches!(
        c,
        SchemaChange::DirectiveChanged { directive, .. } if directive == "$index"
    )));
}

#[test]
fn addition_alone_is_never_breaking() {
    let v1 = parse(RawSchema::new("User").field("id", "uuid!"));
    let v2 = parse(
        RawSchema::new("User")
            .field("id", "uuid!")
            .field("email", "string!"),
    );
    let forward = diff_schemas(&v1, &v2);
    assert!(!forward.is_breaking);
    // The reverse direction removes the field, which is breaking.
    let backward = diff_schemas(&v2, &v1);
    assert!(backward.is_breaking);
    assert_eq!(forward.reverse().changes, backward.changes);
}

#[test]
fn postgres_plan_for_the_evolution() {
    let diff = diff_schemas(&parse(user_v1()), &parse(user_v2()));
    let plan = generate_migration_plan(&diff, &PlanOptions::new(Dialect::Postgres));
    plan.validate().unwrap();
    assert!(plan.is_breaking());

    let sql = plan.to_sql();
    assert_eq!(sql.len(), plan.steps.len());
    assert!(sql.iter().any(|s| s.contains("ADD COLUMN \"email\"")));
    assert!(sql
        .iter()
        .any(|s| s.contains("ALTER COLUMN \"age\" TYPE INTEGER")));
    assert!(sql.iter().any(|s| s.contains("DROP COLUMN \"legacy_code\"")));
    assert!(sql
        .iter()
        .any(|s| s.contains("CREATE INDEX \"idx_user_name\"")));

    // The index on the removed column is dropped before the column.
    let drop_index = sql
        .iter()
        .position(|s| s.contains("DROP INDEX \"idx_user_legacy_code\""))
        .unwrap();
    let drop_column = sql
        .iter()
        .position(|s| s.contains("DROP COLUMN \"legacy_code\""))
        .unwrap();
    assert!(drop_index < drop_column);
}

#[test]
fn sqlite_filters_what_it_cannot_run() {
    let diff = diff_schemas(&parse(user_v1()), &parse(user_v2()));
    let plan = generate_migration_plan(&diff, &PlanOptions::new(Dialect::Sqlite));
    plan.validate().unwrap();

    // The type change cannot run on SQLite.
    assert!(plan.warnings.iter().any(|w| matches!(
        w,
        PlanWarning::UnsupportedOperation {
            operation: MigrationOperation::AlterColumnType { column, .. }
        } if column == "age"
    )));
    assert!(!plan
        .steps
        .iter()
        .any(|s| matches!(s.operation, MigrationOperation::AlterColumnType { .. })));
    // Column additions and drops still plan.
    assert!(plan
        .steps
        .iter()
        .any(|s| matches!(s.operation, MigrationOperation::AddColumn { .. })));
}

#[test]
fn clickhouse_renders_its_own_ddl() {
    let diff = diff_schemas(&parse(user_v1()), &parse(user_v2()));
    let plan = generate_migration_plan(&diff, &PlanOptions::new(Dialect::ClickHouse));
    let sql = plan.to_sql();
    assert!(sql.iter().any(|s| s.contains("MODIFY COLUMN `age` Int32")));
    assert!(sql
        .iter()
        .any(|s| s.contains("ADD INDEX `idx_user_name`")));
}

#[test]
fn relation_evolution_plans_foreign_keys() {
    let v1 = RawSchema::new("Post").field("id", "uuid!");
    let v2 = RawSchema::new("Post")
        .field("id", "uuid!")
        .field("author", "-> User")
        .field("comments", "<- Comment.post[]");
    let diff = diff_schemas(&parse(v1), &parse(v2));
    let plan = generate_migration_plan(&diff, &PlanOptions::new(Dialect::Postgres));
    let sql = plan.to_sql();

    // One key column plus its constraint; the backward relation is
    // virtual and produces nothing.
    assert_eq!(sql.len(), 2);
    assert!(sql[0].contains("ADD COLUMN \"author\" UUID NOT NULL"));
    assert!(sql[1].contains("ADD CONSTRAINT \"fk_post_author\""));
    assert!(sql[1].contains("REFERENCES \"User\" (\"id\")"));

    // ClickHouse cannot enforce the constraint; only the column lands.
    let ch = generate_migration_plan(&diff, &PlanOptions::new(Dialect::ClickHouse));
    assert_eq!(ch.to_sql().len(), 1);
    assert_eq!(ch.warnings.len(), 1);
}

#[test]
fn relation_loosening_plans_a_nullability_alter_only() {
    let v1 = RawSchema::new("Post")
        .field("id", "uuid!")
        .field("author", "-> User");
    let v2 = RawSchema::new("Post")
        .field("id", "uuid!")
        .field("author", "-> User?");
    let diff = diff_schemas(&parse(v1), &parse(v2));
    assert!(!diff.is_breaking);

    let plan = generate_migration_plan(&diff, &PlanOptions::new(Dialect::Postgres));
    let sql = plan.to_sql();
    assert_eq!(sql.len(), 1);
    assert!(sql[0].contains("ALTER COLUMN \"author\" DROP NOT NULL"));
    assert!(!plan
        .steps
        .iter()
        .any(|s| matches!(s.operation, MigrationOperation::AlterColumnType { .. })));
    assert!(!plan.is_breaking());
}

#[test]
fn diff_and_plan_round_trip_through_json() {
    let diff = diff_schemas(&parse(user_v1()), &parse(user_v2()));
    let encoded = serde_json::to_string(&diff).unwrap();
    let decoded: SchemaDiff = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded, diff);

    let plan = generate_migration_plan(&diff, &PlanOptions::new(Dialect::Postgres));
    let encoded = serde_json::to_string(&plan).unwrap();
    let decoded: MigrationPlan = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded, plan);
    assert_eq!(decoded.to_sql(), plan.to_sql());
}

#[test]
fn partition_changes_warn_on_every_dialect() {
    let v1 = user_v1().directive("$partitionBy", json!(["id"]));
    let v2 = user_v1().directive("$partitionBy", json!(["name"]));
    let diff = diff_schemas(&parse(v1), &parse(v2));
    assert!(diff.is_breaking);
    for dialect in [Dialect::Postgres, Dialect::Sqlite, Dialect::ClickHouse] {
        let plan = generate_migration_plan(&diff, &PlanOptions::new(dialect));
        assert!(plan.is_empty());
        assert!(matches!(
            plan.warnings[0],
            PlanWarning::PartitionChangeRequiresRebuild { .. }
        ));
    }
}

#[test]
fn version_compatibility_tracks_breaking_diffs() {
    // A non-breaking evolution should ship as a minor bump.
    let v1 = SchemaVersion::new(1, 2, 0);
    assert!(is_compatible(v1, v1.bump_minor()));
    assert!(is_compatible(v1, v1.bump_patch()));
    // A breaking evolution needs a major bump, which readers of the old
    // schema must not accept.
    assert!(!is_compatible(v1, v1.bump_major()));
    // Downgrades are never accepted.
    assert!(!is_compatible(v1.bump_minor(), v1));
}

#[test]
fn empty_diff_plans_nothing_everywhere() {
    let schema = parse(user_v2());
    let diff = diff_schemas(&schema, &schema);
    assert!(diff.is_empty());
    for dialect in [
        Dialect::Postgres,
        Dialect::Mysql,
        Dialect::Sqlite,
        Dialect::DuckDb,
        Dialect::ClickHouse,
    ] {
        let plan = generate_migration_plan(&diff, &PlanOptions::new(dialect));
        assert!(plan.is_empty());
        assert!(plan.warnings.is_empty());
        assert!(plan.to_sql().is_empty());
    }
}
