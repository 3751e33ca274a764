//! Tests for the PostgreSQL connection module

use crate::connection::{
    PgNumericString, PgValue, escape_identifier, escape_table_name, has_returning_clause,
    leading_keyword, returns_rows,
};
use glot_core::Value;
use tokio_postgres::types::Type;

// Statement classification tests

#[test]
fn test_returns_rows_select() {
    assert!(returns_rows("SELECT 1"));
    assert!(returns_rows("  select * from users"));
}

#[test]
fn test_returns_rows_cte() {
    assert!(returns_rows(
        "WITH active AS (SELECT * FROM users WHERE active) SELECT count(*) FROM active"
    ));
}

#[test]
fn test_returns_rows_show_and_explain() {
    assert!(returns_rows("SHOW search_path"));
    assert!(returns_rows("EXPLAIN SELECT 1"));
}

#[test]
fn test_returns_rows_values_and_table() {
    assert!(returns_rows("VALUES (1), (2)"));
    assert!(returns_rows("TABLE users"));
}

#[test]
fn test_returns_rows_plain_dml() {
    assert!(!returns_rows("INSERT INTO users (name) VALUES ('a')"));
    assert!(!returns_rows("UPDATE users SET name = 'b'"));
    assert!(!returns_rows("DELETE FROM users"));
    assert!(!returns_rows("CREATE TABLE t (id int)"));
}

#[test]
fn test_returns_rows_dml_with_returning() {
    assert!(returns_rows("INSERT INTO users (name) VALUES ('a') RETURNING id"));
    assert!(returns_rows("DELETE FROM users WHERE id = 1 returning *"));
}

#[test]
fn test_returns_rows_skips_leading_comments() {
    assert!(returns_rows("-- fetch everything\nSELECT * FROM users"));
    assert!(returns_rows("/* multi\n   line */ SELECT 1"));
    assert!(!returns_rows("-- SELECT looks like a query\nDELETE FROM users"));
}

#[test]
fn test_leading_keyword() {
    assert_eq!(leading_keyword("select 1").as_deref(), Some("SELECT"));
    assert_eq!(leading_keyword("  \n\tUpdate t set a = 1").as_deref(), Some("UPDATE"));
    assert_eq!(leading_keyword("").as_deref(), None);
    assert_eq!(leading_keyword("-- only a comment").as_deref(), None);
}

// RETURNING detection tests

#[test]
fn test_returning_word_boundary() {
    assert!(!has_returning_clause("SELECT returning_id FROM t"));
    assert!(!has_returning_clause("SELECT xreturning FROM t"));
    assert!(has_returning_clause("INSERT INTO t DEFAULT VALUES RETURNING id"));
}

#[test]
fn test_returning_inside_string_literal() {
    assert!(!has_returning_clause("INSERT INTO t (note) VALUES ('RETURNING soon')"));
    assert!(!has_returning_clause("INSERT INTO t (note) VALUES ('it''s RETURNING')"));
}

#[test]
fn test_returning_inside_quoted_identifier() {
    assert!(!has_returning_clause("UPDATE t SET \"RETURNING\" = 1"));
}

#[test]
fn test_returning_inside_comments() {
    assert!(!has_returning_clause("DELETE FROM t -- RETURNING id"));
    assert!(!has_returning_clause("DELETE FROM t /* RETURNING id */"));
}

#[test]
fn test_returning_inside_dollar_quoted_body() {
    let sql = "CREATE FUNCTION f() RETURNS void AS $$ INSERT INTO t VALUES (1) RETURNING id; $$ LANGUAGE sql";
    assert!(!has_returning_clause(sql));

    let tagged = "CREATE FUNCTION f() RETURNS void AS $body$ ... RETURNING ... $body$ LANGUAGE sql";
    assert!(!has_returning_clause(tagged));
}

#[test]
fn test_returning_after_parameter_placeholder() {
    // $1 is a parameter, not a dollar-quote opener
    assert!(has_returning_clause("INSERT INTO t (a) VALUES ($1) RETURNING id"));
}

// Identifier escaping tests

#[test]
fn test_escape_identifier() {
    assert_eq!(escape_identifier("users"), "\"users\"");
    assert_eq!(escape_identifier("weird\"name"), "\"weird\"\"name\"");
}

#[test]
fn test_escape_table_name_with_schema() {
    assert_eq!(escape_table_name("public.users"), "\"public\".\"users\"");
    assert_eq!(escape_table_name("users"), "\"users\"");
}

// NUMERIC wire format tests

fn numeric_payload(weight: i16, sign: u16, dscale: i16, groups: &[u16]) -> Vec<u8> {
    let mut payload = Vec::with_capacity(8 + groups.len() * 2);
    payload.extend_from_slice(&(groups.len() as i16).to_be_bytes());
    payload.extend_from_slice(&weight.to_be_bytes());
    payload.extend_from_slice(&sign.to_be_bytes());
    payload.extend_from_slice(&dscale.to_be_bytes());
    for group in groups {
        payload.extend_from_slice(&group.to_be_bytes());
    }
    payload
}

#[test]
fn test_numeric_zero() {
    assert_eq!(PgNumericString::parse(&numeric_payload(0, 0, 0, &[])).unwrap(), "0");
}

#[test]
fn test_numeric_integer() {
    assert_eq!(PgNumericString::parse(&numeric_payload(0, 0, 0, &[42])).unwrap(), "42");
}

#[test]
fn test_numeric_decimal() {
    let payload = numeric_payload(0, 0, 2, &[123, 4500]);
    assert_eq!(PgNumericString::parse(&payload).unwrap(), "123.45");
}

#[test]
fn test_numeric_negative() {
    let payload = numeric_payload(0, 0x4000, 2, &[123, 4500]);
    assert_eq!(PgNumericString::parse(&payload).unwrap(), "-123.45");
}

#[test]
fn test_numeric_negative_pure_fraction() {
    // Integer part renders as "0" but the sign must survive
    let payload = numeric_payload(-1, 0x4000, 1, &[5000]);
    assert_eq!(PgNumericString::parse(&payload).unwrap(), "-0.5");
}

#[test]
fn test_numeric_trailing_zero_groups_omitted() {
    // 1e8 is stored as one digit group with weight 2
    let payload = numeric_payload(2, 0, 0, &[1]);
    assert_eq!(PgNumericString::parse(&payload).unwrap(), "100000000");
}

#[test]
fn test_numeric_small_fraction_gap() {
    // 1e-8 is stored with weight -2; the group between the point and the
    // stored digits is an implicit zero
    let payload = numeric_payload(-2, 0, 8, &[1]);
    assert_eq!(PgNumericString::parse(&payload).unwrap(), "0.00000001");
}

#[test]
fn test_numeric_trims_trailing_fraction_zeros() {
    // 1.10 with dscale 2 renders as 1.1
    let payload = numeric_payload(0, 0, 2, &[1, 1000]);
    assert_eq!(PgNumericString::parse(&payload).unwrap(), "1.1");
}

#[test]
fn test_numeric_multi_group() {
    let payload = numeric_payload(1, 0, 1, &[1234, 5678, 9000]);
    assert_eq!(PgNumericString::parse(&payload).unwrap(), "12345678.9");
}

#[test]
fn test_numeric_nan() {
    let payload = numeric_payload(0, 0xC000, 0, &[]);
    assert_eq!(PgNumericString::parse(&payload).unwrap(), "NaN");
}

#[test]
fn test_numeric_rejects_short_payload() {
    assert!(PgNumericString::parse(&[0, 1]).is_err());
}

#[test]
fn test_numeric_rejects_truncated_digits() {
    // Header claims two groups but only one follows
    let mut payload = numeric_payload(0, 0, 0, &[1]);
    payload[1] = 2;
    assert!(PgNumericString::parse(&payload).is_err());
}

// Parameter conversion tests

#[test]
fn test_param_null() {
    assert!(matches!(PgValue::from_value(&Value::Null), PgValue::Null));
}

#[test]
fn test_param_integer_widths() {
    assert!(matches!(PgValue::from_value(&Value::Int8(7)), PgValue::Int16(7)));
    assert!(matches!(PgValue::from_value(&Value::Int16(7)), PgValue::Int16(7)));
    assert!(matches!(PgValue::from_value(&Value::Int32(7)), PgValue::Int32(7)));
    assert!(matches!(PgValue::from_value(&Value::Int64(7)), PgValue::Int64(7)));
}

#[test]
fn test_param_int_coerced_to_target_width() {
    let narrowed = PgValue::from_value_for_type(&Value::Int64(7), &Type::INT4);
    assert!(matches!(narrowed, PgValue::Int32(7)));

    let widened = PgValue::from_value_for_type(&Value::Int16(7), &Type::INT8);
    assert!(matches!(widened, PgValue::Int64(7)));
}

#[test]
fn test_param_float_coerced_to_target_width() {
    let narrowed = PgValue::from_value_for_type(&Value::Float64(1.5), &Type::FLOAT4);
    assert!(matches!(narrowed, PgValue::Float32(v) if v == 1.5));

    let widened = PgValue::from_value_for_type(&Value::Float32(1.5), &Type::FLOAT8);
    assert!(matches!(widened, PgValue::Float64(v) if v == 1.5));
}

#[test]
fn test_param_decimal_sent_as_text() {
    let param = PgValue::from_value_for_type(&Value::Decimal("123.45".to_string()), &Type::NUMERIC);
    assert!(matches!(param, PgValue::String(ref v) if v == "123.45"));
}

#[test]
fn test_param_string_to_json_target() {
    let param = PgValue::from_value_for_type(&Value::String("{\"a\": 1}".to_string()), &Type::JSONB);
    assert!(matches!(param, PgValue::Json(_)));

    // Invalid JSON falls back to text and lets the server report the error
    let fallback = PgValue::from_value_for_type(&Value::String("not json".to_string()), &Type::JSONB);
    assert!(matches!(fallback, PgValue::String(_)));
}

#[test]
fn test_param_string_to_date_target() {
    let param = PgValue::from_value_for_type(&Value::String("2024-01-15".to_string()), &Type::DATE);
    let PgValue::Date(date) = param else {
        panic!("expected a date param");
    };
    assert_eq!(date, chrono::NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());

    let fallback = PgValue::from_value_for_type(&Value::String("tomorrow".to_string()), &Type::DATE);
    assert!(matches!(fallback, PgValue::String(_)));
}

#[test]
fn test_param_string_to_timestamp_target() {
    let param = PgValue::from_value_for_type(
        &Value::String("2024-01-15 10:30:00".to_string()),
        &Type::TIMESTAMP,
    );
    assert!(matches!(param, PgValue::DateTime(_)));

    // A bare date becomes midnight
    let from_date =
        PgValue::from_value_for_type(&Value::String("2024-01-15".to_string()), &Type::TIMESTAMP);
    assert!(matches!(from_date, PgValue::DateTime(_)));
}

#[test]
fn test_param_string_to_timestamptz_target() {
    let rfc3339 = PgValue::from_value_for_type(
        &Value::String("2024-01-15T10:30:00Z".to_string()),
        &Type::TIMESTAMPTZ,
    );
    assert!(matches!(rfc3339, PgValue::DateTimeUtc(_)));

    let naive = PgValue::from_value_for_type(
        &Value::String("2024-01-15 10:30:00".to_string()),
        &Type::TIMESTAMPTZ,
    );
    assert!(matches!(naive, PgValue::DateTimeUtc(_)));
}

#[test]
fn test_param_string_to_text_target_passthrough() {
    let param = PgValue::from_value_for_type(&Value::String("plain".to_string()), &Type::TEXT);
    assert!(matches!(param, PgValue::String(ref v) if v == "plain"));
}
