//! GLOT Drivers - Database driver implementations
//!
//! This crate provides concrete implementations of the database driver
//! traits defined in `glot-core`, a registry resolving driver names to
//! driver instances, and the hub that tracks live connections by id.

#[cfg(feature = "postgres")]
pub use glot_driver_postgres as postgres;

mod hub;
mod registry;

pub use hub::ClientHub;
pub use registry::DriverRegistry;

/// Re-export commonly used types from glot-core
pub use glot_core::{
    ColumnMeta, Connection, ConnectionConfig, DatabaseDriver, DriverCapabilities, GlotError,
    QueryResult, Result, Row, SchemaIntrospection, StatementResult, Value,
};
