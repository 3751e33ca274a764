//! GLOT Query - Statement building, origin parsing, and raw execution
//!
//! This crate provides the dialect-neutral query path: a fluent statement
//! builder, best-effort origin resolution for result attribution, and the
//! raw executor that splits, times, and shapes multi-statement SQL.

mod builder;
pub mod executor;
mod origin;

pub use builder::{QueryBuilder, QueryDescriptor};
pub use origin::{StatementOrigin, resolve_origin};

// Re-export execution types
pub use executor::{
    CommandReport, ExecuteOptions, ExecuteOutcome, FieldDescriptor, RawExecutor, ShapedResult,
    split_statements,
};
