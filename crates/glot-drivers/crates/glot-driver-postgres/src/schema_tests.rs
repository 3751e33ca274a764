//! Tests for PostgreSQL catalog parsing helpers

use crate::schema::{
    build_create_table, fold_trigger_rows, normalize_column_type, parse_version_banner,
};
use glot_core::{
    BackendAttr, ColumnInfo, ForeignKeyAction, IndexInfo, KeyUsageInfo, Row, TriggerEvent,
    TriggerForEach, TriggerTiming, Value,
};

// Version banner tests

#[test]
fn test_version_banner_linux() {
    let info = parse_version_banner(
        "PostgreSQL 16.2 on x86_64-pc-linux-gnu, compiled by gcc (GCC) 13.2.0, 64-bit",
    );
    assert_eq!(info.name, "PostgreSQL");
    assert_eq!(info.number, "16.2");
    assert_eq!(info.arch.as_deref(), Some("x86_64"));
    assert_eq!(info.os.as_deref(), Some("linux"));
}

#[test]
fn test_version_banner_with_distro_suffix() {
    let info = parse_version_banner(
        "PostgreSQL 15.6 (Debian 15.6-1.pgdg120+2) on aarch64-unknown-linux-gnu, compiled by gcc",
    );
    assert_eq!(info.number, "15.6");
    assert_eq!(info.arch.as_deref(), Some("aarch64"));
    assert_eq!(info.os.as_deref(), Some("linux"));
}

#[test]
fn test_version_banner_darwin() {
    let info = parse_version_banner("PostgreSQL 14.11 on x86_64-apple-darwin23.4.0");
    assert_eq!(info.arch.as_deref(), Some("x86_64"));
    assert_eq!(info.os.as_deref(), Some("darwin23.4.0"));
}

#[test]
fn test_version_banner_empty() {
    let info = parse_version_banner("");
    assert_eq!(info.name, "PostgreSQL");
    assert!(info.number.is_empty());
    assert_eq!(info.arch, None);
    assert_eq!(info.os, None);
}

// Column type normalization tests

#[test]
fn test_normalize_scalar_types() {
    assert_eq!(normalize_column_type("integer", "int4"), ("INTEGER".to_string(), false));
    assert_eq!(normalize_column_type("text", "text"), ("TEXT".to_string(), false));
    assert_eq!(
        normalize_column_type("double precision", "float8"),
        ("DOUBLE PRECISION".to_string(), false)
    );
}

#[test]
fn test_normalize_character_types_to_canonical_names() {
    assert_eq!(
        normalize_column_type("character varying", "varchar"),
        ("VARCHAR".to_string(), false)
    );
    assert_eq!(normalize_column_type("character", "bpchar"), ("CHAR".to_string(), false));
}

#[test]
fn test_normalize_drops_without_time_zone() {
    assert_eq!(
        normalize_column_type("timestamp without time zone", "timestamp"),
        ("TIMESTAMP".to_string(), false)
    );
    assert_eq!(
        normalize_column_type("timestamp with time zone", "timestamptz"),
        ("TIMESTAMP WITH TIME ZONE".to_string(), false)
    );
    assert_eq!(
        normalize_column_type("time without time zone", "time"),
        ("TIME".to_string(), false)
    );
}

#[test]
fn test_normalize_array_types() {
    assert_eq!(normalize_column_type("ARRAY", "_int4"), ("INTEGER".to_string(), true));
    assert_eq!(normalize_column_type("ARRAY", "_text"), ("TEXT".to_string(), true));
    // Unmapped element encodings strip the marker and upper-case
    assert_eq!(normalize_column_type("ARRAY", "_citext"), ("CITEXT".to_string(), true));
}

#[test]
fn test_normalize_user_defined_types() {
    assert_eq!(normalize_column_type("USER-DEFINED", "mood"), ("MOOD".to_string(), false));
}

// Trigger row folding tests

fn trigger_row(
    name: &str,
    table: &str,
    timing: &str,
    event: &str,
    orientation: &str,
    action: &str,
) -> Row {
    Row::new(
        vec![
            "trigger_name".to_string(),
            "event_object_table".to_string(),
            "action_timing".to_string(),
            "event_manipulation".to_string(),
            "action_orientation".to_string(),
            "action_statement".to_string(),
        ],
        vec![
            Value::String(name.to_string()),
            Value::String(table.to_string()),
            Value::String(timing.to_string()),
            Value::String(event.to_string()),
            Value::String(orientation.to_string()),
            Value::String(action.to_string()),
        ],
    )
}

#[test]
fn test_fold_merges_one_row_per_event() {
    let rows = vec![
        trigger_row("audit_trg", "users", "AFTER", "INSERT", "ROW", "EXECUTE FUNCTION audit()"),
        trigger_row("audit_trg", "users", "AFTER", "UPDATE", "ROW", "EXECUTE FUNCTION audit()"),
        trigger_row("purge_trg", "users", "BEFORE", "DELETE", "STATEMENT", "EXECUTE FUNCTION purge()"),
    ];

    let triggers = fold_trigger_rows("public", &rows);
    assert_eq!(triggers.len(), 2);

    let audit = &triggers[0];
    assert_eq!(audit.name, "audit_trg");
    assert_eq!(audit.table_name, "users");
    assert_eq!(audit.timing, TriggerTiming::After);
    assert_eq!(audit.events, vec![TriggerEvent::Insert, TriggerEvent::Update]);
    assert_eq!(audit.for_each, TriggerForEach::Row);
    assert_eq!(audit.definition.as_deref(), Some("EXECUTE FUNCTION audit()"));
    assert!(audit.enabled);

    let purge = &triggers[1];
    assert_eq!(purge.events, vec![TriggerEvent::Delete]);
    assert_eq!(purge.timing, TriggerTiming::Before);
    assert_eq!(purge.for_each, TriggerForEach::Statement);
}

#[test]
fn test_fold_keeps_same_name_on_different_tables_apart() {
    let rows = vec![
        trigger_row("touch_trg", "users", "BEFORE", "UPDATE", "ROW", "EXECUTE FUNCTION touch()"),
        trigger_row("touch_trg", "orders", "BEFORE", "UPDATE", "ROW", "EXECUTE FUNCTION touch()"),
    ];

    let triggers = fold_trigger_rows("public", &rows);
    assert_eq!(triggers.len(), 2);
}

// CREATE TABLE reconstruction tests

fn column(name: &str, data_type: &str) -> ColumnInfo {
    ColumnInfo {
        name: name.to_string(),
        ordinal: 0,
        data_type: data_type.to_string(),
        is_array: false,
        nullable: true,
        default_value: None,
        max_length: None,
        precision: None,
        scale: None,
        is_primary_key: false,
        is_auto_increment: false,
        is_unique: false,
        on_update: BackendAttr::Unsupported,
        comment: None,
    }
}

#[test]
fn test_create_table_renders_columns_and_keys() {
    let mut id = column("id", "BIGINT");
    id.nullable = false;
    id.is_auto_increment = true;
    id.is_primary_key = true;

    let mut email = column("email", "VARCHAR");
    email.nullable = false;
    email.max_length = Some(255);

    let mut total = column("total", "NUMERIC");
    total.precision = Some(12);
    total.scale = Some(2);

    let mut created_at = column("created_at", "TIMESTAMP WITH TIME ZONE");
    created_at.default_value = Some("now()".to_string());

    let indexes = vec![
        IndexInfo {
            name: "orders_pkey".to_string(),
            columns: vec!["id".to_string()],
            is_unique: true,
            is_primary: true,
            index_type: "btree".to_string(),
            cardinality: BackendAttr::Unsupported,
            comment: None,
        },
        IndexInfo {
            name: "orders_email_key".to_string(),
            columns: vec!["email".to_string()],
            is_unique: true,
            is_primary: false,
            index_type: "btree".to_string(),
            cardinality: BackendAttr::Unsupported,
            comment: None,
        },
    ];

    let keys = vec![KeyUsageInfo {
        schema: "public".to_string(),
        table: "orders".to_string(),
        column: "user_id".to_string(),
        position: 1,
        constraint_name: "orders_user_fk".to_string(),
        referenced_schema: "public".to_string(),
        referenced_table: "users".to_string(),
        referenced_column: "id".to_string(),
        on_update: ForeignKeyAction::NoAction,
        on_delete: ForeignKeyAction::Cascade,
    }];

    let ddl = build_create_table(
        "public",
        "orders",
        &[id, email, total, created_at],
        &indexes,
        &keys,
    );

    assert!(ddl.starts_with("CREATE TABLE \"public\".\"orders\" (\n"));
    assert!(ddl.contains("\"id\" BIGINT GENERATED BY DEFAULT AS IDENTITY NOT NULL"));
    assert!(ddl.contains("\"email\" VARCHAR(255) NOT NULL"));
    assert!(ddl.contains("\"total\" NUMERIC(12, 2)"));
    assert!(ddl.contains("\"created_at\" TIMESTAMP WITH TIME ZONE DEFAULT now()"));
    assert!(ddl.contains("CONSTRAINT \"orders_pkey\" PRIMARY KEY (\"id\")"));
    assert!(ddl.contains(
        "CONSTRAINT \"orders_user_fk\" FOREIGN KEY (\"user_id\") REFERENCES \"public\".\"users\" (\"id\") ON UPDATE NO ACTION ON DELETE CASCADE"
    ));
    assert!(ddl.contains(
        "CREATE UNIQUE INDEX \"orders_email_key\" ON \"public\".\"orders\" USING btree (\"email\");"
    ));
}

#[test]
fn test_create_table_composite_foreign_key() {
    let keys = vec![
        KeyUsageInfo {
            schema: "public".to_string(),
            table: "lines".to_string(),
            column: "order_id".to_string(),
            position: 1,
            constraint_name: "lines_order_fk".to_string(),
            referenced_schema: "public".to_string(),
            referenced_table: "orders".to_string(),
            referenced_column: "id".to_string(),
            on_update: ForeignKeyAction::NoAction,
            on_delete: ForeignKeyAction::Restrict,
        },
        KeyUsageInfo {
            schema: "public".to_string(),
            table: "lines".to_string(),
            column: "order_version".to_string(),
            position: 2,
            constraint_name: "lines_order_fk".to_string(),
            referenced_schema: "public".to_string(),
            referenced_table: "orders".to_string(),
            referenced_column: "version".to_string(),
            on_update: ForeignKeyAction::NoAction,
            on_delete: ForeignKeyAction::Restrict,
        },
    ];

    let ddl = build_create_table(
        "public",
        "lines",
        &[column("order_id", "BIGINT"), column("order_version", "INTEGER")],
        &[],
        &keys,
    );

    assert!(ddl.contains(
        "FOREIGN KEY (\"order_id\", \"order_version\") REFERENCES \"public\".\"orders\" (\"id\", \"version\")"
    ));
}

#[test]
fn test_create_table_array_column() {
    let mut tags = column("tags", "TEXT");
    tags.is_array = true;

    let ddl = build_create_table("public", "posts", &[tags], &[], &[]);
    assert!(ddl.contains("\"tags\" TEXT[]"));
}
