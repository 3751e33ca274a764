//! Integration tests for the PostgreSQL connection
//!
//! These tests require a running PostgreSQL server.
//! They are ignored by default and can be run with:
//! ```
//! cargo test --package glot-driver-postgres --test connection_integration -- --ignored
//! ```
//!
//! To set up a local PostgreSQL server for testing:
//! ```
//! docker run -d --name postgres-test -p 5432:5432 -e POSTGRES_PASSWORD=postgres postgres:16
//! ```

use glot_core::{Connection, ConnectionConfig, DatabaseDriver, GlotError, Value};
use glot_driver_postgres::PostgresDriver;

/// Helper to create a test connection config
fn test_config() -> ConnectionConfig {
    let mut config = ConnectionConfig::new("postgres", "PostgreSQL Test");
    config.host = std::env::var("POSTGRES_HOST").unwrap_or_else(|_| "localhost".to_string());
    config.port = std::env::var("POSTGRES_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(5432);
    config.database =
        Some(std::env::var("POSTGRES_DATABASE").unwrap_or_else(|_| "postgres".to_string()));
    config.username =
        Some(std::env::var("POSTGRES_USER").unwrap_or_else(|_| "postgres".to_string()));
    config.password =
        Some(std::env::var("POSTGRES_PASSWORD").unwrap_or_else(|_| "postgres".to_string()));
    config
}

/// Test executing a simple query against the system catalog
#[tokio::test]
#[ignore = "requires running PostgreSQL server"]
async fn test_postgres_catalog_query() {
    let driver = PostgresDriver::new();
    let conn = driver
        .connect(&test_config())
        .await
        .expect("Failed to connect to PostgreSQL");

    let result = conn
        .query(
            "SELECT schemaname, tablename FROM pg_catalog.pg_tables LIMIT 10",
            &[],
        )
        .await
        .expect("Query failed");

    assert!(!result.rows.is_empty(), "Expected rows in result");
    assert!(
        result.columns.iter().any(|c| c.name == "schemaname"),
        "Expected 'schemaname' column"
    );
    assert!(
        result.columns.iter().any(|c| c.name == "tablename"),
        "Expected 'tablename' column"
    );

    conn.close().await.expect("Failed to close connection");
    assert!(conn.is_closed());
}

/// Test creating a table, inserting with typed parameters, and reading the
/// values back with their native types
#[tokio::test]
#[ignore = "requires running PostgreSQL server"]
async fn test_postgres_create_insert_query() {
    let driver = PostgresDriver::new();
    let conn = driver
        .connect(&test_config())
        .await
        .expect("Failed to connect to PostgreSQL");

    let _ = conn.execute("DROP TABLE IF EXISTS test_glot_items", &[]).await;

    conn.execute(
        r#"
        CREATE TABLE test_glot_items (
            id BIGINT GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY,
            name TEXT NOT NULL,
            price NUMERIC(10, 2),
            tags TEXT[]
        )
        "#,
        &[],
    )
    .await
    .expect("Failed to create table");

    let inserted = conn
        .execute(
            "INSERT INTO test_glot_items (name, price, tags) VALUES ($1, $2, ARRAY['a', 'b'])",
            &[
                Value::String("widget".to_string()),
                Value::Decimal("19.99".to_string()),
            ],
        )
        .await
        .expect("Failed to insert");
    assert!(!inserted.is_query);
    assert_eq!(inserted.affected_rows, 1);

    let result = conn
        .query("SELECT id, name, price, tags FROM test_glot_items", &[])
        .await
        .expect("Failed to query data");
    assert_eq!(result.rows.len(), 1);

    let row = &result.rows[0];
    assert!(matches!(row.get(0), Some(Value::Int64(_))));
    assert_eq!(row.get(1).and_then(|v| v.as_str()), Some("widget"));
    assert!(matches!(row.get(2), Some(Value::Decimal(v)) if v == "19.99"));
    assert_eq!(
        row.get(3).and_then(|v| v.as_string_array()),
        Some(vec!["a".to_string(), "b".to_string()])
    );

    conn.execute("DROP TABLE test_glot_items", &[])
        .await
        .expect("Failed to drop table");
    conn.close().await.expect("Failed to close connection");
}

/// Test that DML with a RETURNING clause runs through the query path
#[tokio::test]
#[ignore = "requires running PostgreSQL server"]
async fn test_postgres_returning_classification() {
    let driver = PostgresDriver::new();
    let conn = driver
        .connect(&test_config())
        .await
        .expect("Failed to connect to PostgreSQL");

    let _ = conn.execute("DROP TABLE IF EXISTS test_glot_returning", &[]).await;
    conn.execute(
        "CREATE TABLE test_glot_returning (id BIGINT GENERATED BY DEFAULT AS IDENTITY, note TEXT)",
        &[],
    )
    .await
    .expect("Failed to create table");

    let statement = conn
        .execute(
            "INSERT INTO test_glot_returning (note) VALUES ($1) RETURNING id",
            &[Value::String("first".to_string())],
        )
        .await
        .expect("Insert with RETURNING failed");

    assert!(statement.is_query, "RETURNING should produce a row set");
    let returned = statement.result.expect("Expected returned rows");
    assert_eq!(returned.rows.len(), 1);
    assert!(matches!(returned.rows[0].get(0), Some(Value::Int64(_))));

    conn.execute("DROP TABLE test_glot_returning", &[])
        .await
        .expect("Failed to drop table");
    conn.close().await.expect("Failed to close connection");
}

/// Test connection state management
#[tokio::test]
#[ignore = "requires running PostgreSQL server"]
async fn test_postgres_connection_state() {
    let driver = PostgresDriver::new();
    let conn = driver
        .connect(&test_config())
        .await
        .expect("Failed to connect to PostgreSQL");

    assert!(!conn.is_closed());

    let _ = conn.query("SELECT 1", &[]).await.expect("Query failed");
    assert!(!conn.is_closed());

    conn.close().await.expect("Failed to close connection");
    assert!(conn.is_closed());

    let result = conn.execute("SELECT 1", &[]).await;
    assert!(result.is_err(), "Expected error on closed connection");
}

/// Test that statement errors carry the server's SQLSTATE code
#[tokio::test]
#[ignore = "requires running PostgreSQL server"]
async fn test_postgres_error_reports_sqlstate() {
    let driver = PostgresDriver::new();
    let conn = driver
        .connect(&test_config())
        .await
        .expect("Failed to connect to PostgreSQL");

    let error = conn
        .query("SELECT * FROM table_that_does_not_exist_glot", &[])
        .await
        .expect_err("Expected undefined table error");

    match error {
        GlotError::Statement { code, .. } => {
            assert_eq!(code.as_deref(), Some("42P01"));
        }
        other => panic!("Expected a statement error, got: {other:?}"),
    }

    conn.close().await.expect("Failed to close connection");
}

/// Test pooled mode: concurrent queries over a shared pool
#[tokio::test]
#[ignore = "requires running PostgreSQL server"]
async fn test_postgres_pooled_connection() {
    let driver = PostgresDriver::new();
    let config = test_config().with_pool_size(4);

    let conn = driver
        .connect(&config)
        .await
        .expect("Failed to connect to PostgreSQL");

    let mut handles = Vec::new();
    for i in 0..8 {
        let conn = conn.clone();
        handles.push(tokio::spawn(async move {
            conn.query("SELECT $1::int4", &[Value::Int32(i)]).await
        }));
    }
    for handle in handles {
        let result = handle.await.expect("Task panicked").expect("Query failed");
        assert_eq!(result.rows.len(), 1);
    }

    conn.close().await.expect("Failed to close connection");
    assert!(conn.is_closed());
}

/// Test cancellation handles: available on single sessions, absent on pools
#[tokio::test]
#[ignore = "requires running PostgreSQL server"]
async fn test_postgres_cancel_handle_availability() {
    let driver = PostgresDriver::new();

    let single = driver
        .connect(&test_config())
        .await
        .expect("Failed to connect to PostgreSQL");
    assert!(single.cancel_handle().is_some());
    single.close().await.expect("Failed to close connection");

    let pooled = driver
        .connect(&test_config().with_pool_size(2))
        .await
        .expect("Failed to connect to PostgreSQL");
    assert!(pooled.cancel_handle().is_none());
    pooled.close().await.expect("Failed to close connection");
}

/// Test driver metadata and connection string building
#[tokio::test]
async fn test_driver_metadata() {
    let driver = PostgresDriver::new();

    assert_eq!(driver.id(), "postgres");
    assert_eq!(driver.name(), "postgres");
    assert_eq!(driver.display_name(), "PostgreSQL");
    assert_eq!(driver.default_port(), Some(5432));

    let conn_str = driver.build_connection_string(&test_config());
    assert!(conn_str.starts_with("postgresql://"));
}

/// Test test_connection method
#[tokio::test]
#[ignore = "requires running PostgreSQL server"]
async fn test_postgres_test_connection() {
    let driver = PostgresDriver::new();
    let result = driver.test_connection(&test_config()).await;
    assert!(result.is_ok(), "test_connection should succeed: {result:?}");
}
