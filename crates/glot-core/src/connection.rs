//! Connection trait and query cancellation

use crate::{DialectInfo, QueryResult, Result, SchemaIntrospection, StatementResult, Value};
use async_trait::async_trait;
use std::sync::Arc;

/// Handle for cancelling a running query from any thread.
///
/// This trait allows database drivers to provide a way to interrupt
/// long-running queries. The handle is safe to call from any thread
/// and can be called multiple times (subsequent calls are no-ops).
pub trait QueryCancelHandle: Send + Sync {
    /// Cancel the currently running query on the associated connection.
    ///
    /// This method is safe to call from any thread and is idempotent.
    /// If no query is running, this is a no-op.
    fn cancel(&self);
}

/// A database connection
///
/// Implementations may be backed by a single session or a pool; the trait
/// hides the difference. Either way the session schema is fixed when the
/// connection is established and never changes afterwards.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Get the driver name (e.g., "postgres", "mysql")
    fn driver_name(&self) -> &str;

    /// Execute a single statement of unknown kind.
    ///
    /// The result reports whether the statement produced rows; for
    /// row-returning statements the rows are carried inline.
    async fn execute(&self, sql: &str, params: &[Value]) -> Result<StatementResult>;

    /// Execute a query that returns rows (SELECT)
    async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult>;

    /// Get dialect metadata for this connection
    ///
    /// Result shaping uses this to normalize column types without reaching
    /// back to the driver.
    fn dialect_info(&self) -> DialectInfo {
        DialectInfo::default()
    }

    /// Schema this connection's sessions were pinned to at creation
    fn default_schema(&self) -> Option<&str> {
        None
    }

    /// Close the connection
    async fn close(&self) -> Result<()>;

    /// Check if the connection is closed
    fn is_closed(&self) -> bool;

    /// Get schema introspection interface if supported
    fn as_schema_introspection(&self) -> Option<&dyn SchemaIntrospection> {
        None
    }

    /// Get a handle that can be used to cancel running queries.
    ///
    /// Returns `None` if the driver does not support query cancellation.
    /// The returned handle is safe to use from any thread.
    fn cancel_handle(&self) -> Option<Arc<dyn QueryCancelHandle>> {
        None
    }
}
