//! PostgreSQL driver for the GLOT database client
//!
//! Implements the [`glot_core::DatabaseDriver`] and [`glot_core::Connection`]
//! contracts on top of tokio-postgres, with optional deadpool-backed pooling
//! and full catalog introspection through `information_schema` and the
//! `pg_catalog` tables.

mod connection;
mod dialect;
mod driver;
mod schema;
mod tls;

#[cfg(test)]
mod connection_tests;
#[cfg(test)]
mod dialect_tests;
#[cfg(test)]
mod driver_tests;
#[cfg(test)]
mod schema_tests;

pub use connection::{PostgresCancelHandle, PostgresConnection};
pub use dialect::postgres_dialect;
pub use driver::PostgresDriver;
