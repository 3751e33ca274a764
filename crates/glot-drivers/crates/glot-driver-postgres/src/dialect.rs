//! PostgreSQL dialect information
//!
//! Metadata about the PostgreSQL SQL dialect: data types with their catalog
//! aliases, array type resolution, and quoting rules.

use std::borrow::Cow;

use glot_core::{ArrayTypeMapping, DataTypeCategory, DataTypeInfo, DialectInfo};

/// PostgreSQL reports array columns with an underscore-prefixed element type
/// (`_int4`, `_text`). Maps the common element types onto display names;
/// anything not listed resolves to the uppercased element name.
pub(crate) const PG_ARRAY_TYPES: ArrayTypeMapping = ArrayTypeMapping {
    marker_prefix: "_",
    mappings: &[
        ("_int2", "SMALLINT"),
        ("_int4", "INTEGER"),
        ("_int8", "BIGINT"),
        ("_float4", "REAL"),
        ("_float8", "DOUBLE PRECISION"),
        ("_numeric", "NUMERIC"),
        ("_text", "TEXT"),
        ("_varchar", "VARCHAR"),
        ("_bpchar", "CHAR"),
        ("_bool", "BOOLEAN"),
        ("_uuid", "UUID"),
        ("_date", "DATE"),
        ("_time", "TIME"),
        ("_timestamp", "TIMESTAMP"),
        ("_timestamptz", "TIMESTAMP WITH TIME ZONE"),
        ("_json", "JSON"),
        ("_jsonb", "JSONB"),
        ("_bytea", "BYTEA"),
    ],
};

/// Build the complete PostgreSQL dialect info
pub fn postgres_dialect() -> DialectInfo {
    DialectInfo {
        id: Cow::Borrowed("postgres"),
        display_name: Cow::Borrowed("PostgreSQL"),
        data_types: postgres_data_types(),
        array_types: PG_ARRAY_TYPES,
        identifier_quote: '"',
        string_quote: '\'',
        statement_terminator: ';',
    }
}

fn postgres_data_types() -> Vec<DataTypeInfo> {
    vec![
        // Integer types. Aliases cover the pg_type names the wire protocol reports.
        DataTypeInfo::new("SMALLINT", DataTypeCategory::Integer).with_alias("INT2"),
        DataTypeInfo::new("INTEGER", DataTypeCategory::Integer)
            .with_alias("INT")
            .with_alias("INT4"),
        DataTypeInfo::new("BIGINT", DataTypeCategory::Integer).with_alias("INT8"),
        DataTypeInfo::new("SMALLSERIAL", DataTypeCategory::Integer).with_alias("SERIAL2"),
        DataTypeInfo::new("SERIAL", DataTypeCategory::Integer).with_alias("SERIAL4"),
        DataTypeInfo::new("BIGSERIAL", DataTypeCategory::Integer).with_alias("SERIAL8"),
        // Floating point
        DataTypeInfo::new("REAL", DataTypeCategory::Float).with_alias("FLOAT4"),
        DataTypeInfo::new("DOUBLE PRECISION", DataTypeCategory::Float).with_alias("FLOAT8"),
        DataTypeInfo::new("FLOAT", DataTypeCategory::Float),
        // Fixed precision
        DataTypeInfo::new("NUMERIC", DataTypeCategory::Decimal)
            .with_length(None, Some(1000))
            .with_scale()
            .with_alias("DECIMAL"),
        DataTypeInfo::new("MONEY", DataTypeCategory::Decimal),
        // String types
        DataTypeInfo::new("VARCHAR", DataTypeCategory::String)
            .with_length(Some(255), Some(10_485_760))
            .with_alias("CHARACTER VARYING"),
        DataTypeInfo::new("CHAR", DataTypeCategory::String)
            .with_length(Some(1), Some(10_485_760))
            .with_alias("CHARACTER")
            .with_alias("BPCHAR"),
        DataTypeInfo::new("TEXT", DataTypeCategory::String),
        DataTypeInfo::new("NAME", DataTypeCategory::String),
        // Binary
        DataTypeInfo::new("BYTEA", DataTypeCategory::Binary),
        // Boolean
        DataTypeInfo::new("BOOLEAN", DataTypeCategory::Boolean).with_alias("BOOL"),
        // Date/Time
        DataTypeInfo::new("DATE", DataTypeCategory::Date),
        DataTypeInfo::new("TIME", DataTypeCategory::Time),
        DataTypeInfo::new("TIME WITH TIME ZONE", DataTypeCategory::Time).with_alias("TIMETZ"),
        DataTypeInfo::new("TIMESTAMP", DataTypeCategory::DateTime),
        DataTypeInfo::new("TIMESTAMP WITH TIME ZONE", DataTypeCategory::DateTime)
            .with_alias("TIMESTAMPTZ"),
        DataTypeInfo::new("INTERVAL", DataTypeCategory::Interval),
        // JSON
        DataTypeInfo::new("JSON", DataTypeCategory::Json),
        DataTypeInfo::new("JSONB", DataTypeCategory::Json),
        // UUID
        DataTypeInfo::new("UUID", DataTypeCategory::Uuid),
        // Network
        DataTypeInfo::new("INET", DataTypeCategory::Network),
        DataTypeInfo::new("CIDR", DataTypeCategory::Network),
        DataTypeInfo::new("MACADDR", DataTypeCategory::Network),
        DataTypeInfo::new("MACADDR8", DataTypeCategory::Network),
        // Geometry
        DataTypeInfo::new("POINT", DataTypeCategory::Geometry),
        DataTypeInfo::new("LINE", DataTypeCategory::Geometry),
        DataTypeInfo::new("LSEG", DataTypeCategory::Geometry),
        DataTypeInfo::new("BOX", DataTypeCategory::Geometry),
        DataTypeInfo::new("PATH", DataTypeCategory::Geometry),
        DataTypeInfo::new("POLYGON", DataTypeCategory::Geometry),
        DataTypeInfo::new("CIRCLE", DataTypeCategory::Geometry),
        // Other PostgreSQL types
        DataTypeInfo::new("XML", DataTypeCategory::Other),
        DataTypeInfo::new("TSQUERY", DataTypeCategory::Other),
        DataTypeInfo::new("TSVECTOR", DataTypeCategory::Other),
        DataTypeInfo::new("INT4RANGE", DataTypeCategory::Other),
        DataTypeInfo::new("INT8RANGE", DataTypeCategory::Other),
        DataTypeInfo::new("NUMRANGE", DataTypeCategory::Other),
        DataTypeInfo::new("TSRANGE", DataTypeCategory::Other),
        DataTypeInfo::new("TSTZRANGE", DataTypeCategory::Other),
        DataTypeInfo::new("DATERANGE", DataTypeCategory::Other),
    ]
}
