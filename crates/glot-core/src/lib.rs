//! GLOT Core - Core abstractions and traits for the database client
//!
//! This crate provides the fundamental traits and types that all other
//! GLOT crates depend on. It defines:
//!
//! - `DatabaseDriver` - Trait for database driver implementations
//! - `Connection` - Trait for database connections
//! - `SchemaIntrospection` - Trait for catalog introspection
//! - `DialectInfo` - SQL dialect metadata (data types, quoting, array encoding)
//! - Common types like `Value`, `Row`, `QueryResult`, etc.

mod connection;
mod dialect;
mod driver;
mod error;
mod schema;
mod types;

pub use connection::*;
pub use dialect::*;
pub use driver::*;
pub use error::*;
pub use schema::*;
pub use types::*;
