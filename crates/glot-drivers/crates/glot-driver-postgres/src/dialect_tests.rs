//! Tests for the PostgreSQL dialect description

use crate::dialect::{PG_ARRAY_TYPES, postgres_dialect};
use glot_core::DataTypeCategory;

#[test]
fn test_dialect_identity() {
    let dialect = postgres_dialect();
    assert_eq!(dialect.id, "postgres");
    assert_eq!(dialect.display_name, "PostgreSQL");
    assert_eq!(dialect.identifier_quote, '"');
    assert_eq!(dialect.string_quote, '\'');
    assert_eq!(dialect.statement_terminator, ';');
}

#[test]
fn test_find_type_by_canonical_name() {
    let dialect = postgres_dialect();
    assert!(dialect.find_type("INTEGER").is_some());
    assert!(dialect.find_type("text").is_some());
    assert!(dialect.find_type("TIMESTAMP WITH TIME ZONE").is_some());
    assert!(dialect.find_type("NO SUCH TYPE").is_none());
}

#[test]
fn test_find_type_by_catalog_alias() {
    let dialect = postgres_dialect();
    assert_eq!(dialect.find_type("int4").map(|t| t.name.as_ref()), Some("INTEGER"));
    assert_eq!(dialect.find_type("INT8").map(|t| t.name.as_ref()), Some("BIGINT"));
    assert_eq!(dialect.find_type("bool").map(|t| t.name.as_ref()), Some("BOOLEAN"));
    assert_eq!(dialect.find_type("bpchar").map(|t| t.name.as_ref()), Some("CHAR"));
    assert_eq!(
        dialect.find_type("timestamptz").map(|t| t.name.as_ref()),
        Some("TIMESTAMP WITH TIME ZONE")
    );
    assert_eq!(
        dialect.find_type("character varying").map(|t| t.name.as_ref()),
        Some("VARCHAR")
    );
}

#[test]
fn test_varchar_length_metadata() {
    let dialect = postgres_dialect();
    let varchar = dialect.find_type("VARCHAR").unwrap();
    assert!(varchar.accepts_length);
    assert_eq!(varchar.default_length, Some(255));
    assert_eq!(varchar.max_length, Some(10_485_760));
}

#[test]
fn test_numeric_accepts_scale() {
    let dialect = postgres_dialect();
    let numeric = dialect.find_type("NUMERIC").unwrap();
    assert!(numeric.accepts_length);
    assert!(numeric.accepts_scale);
    assert_eq!(numeric.category, DataTypeCategory::Decimal);
}

#[test]
fn test_type_categories_populated() {
    let dialect = postgres_dialect();
    assert!(dialect.data_types_by_category(DataTypeCategory::Integer).count() >= 3);
    assert!(dialect.data_types_by_category(DataTypeCategory::Json).count() >= 2);
    assert!(dialect.data_types_by_category(DataTypeCategory::Network).count() >= 3);
}

#[test]
fn test_array_encoding_resolution() {
    assert_eq!(PG_ARRAY_TYPES.resolve("_int4").as_deref(), Some("INTEGER"));
    assert_eq!(PG_ARRAY_TYPES.resolve("_text").as_deref(), Some("TEXT"));
    assert_eq!(PG_ARRAY_TYPES.resolve("_timestamptz").as_deref(), Some("TIMESTAMP WITH TIME ZONE"));
    // Unmapped encodings strip the marker and upper-case the element
    assert_eq!(PG_ARRAY_TYPES.resolve("_citext").as_deref(), Some("CITEXT"));
    // Non-array names do not resolve
    assert_eq!(PG_ARRAY_TYPES.resolve("int4"), None);
}

#[test]
fn test_quote_ident_uses_double_quotes() {
    let dialect = postgres_dialect();
    assert_eq!(dialect.quote_ident("users"), "\"users\"");
    assert_eq!(dialect.quote_ident("odd\"name"), "\"odd\"\"name\"");
}
