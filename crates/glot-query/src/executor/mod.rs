//! Raw execution and result shaping module
//!
//! This module provides the shared execution path for raw SQL: statement
//! splitting, sequential execution with per-statement timing, and optional
//! nest/details result shaping backed by catalog lookups.

mod raw;
mod splitter;

pub use raw::{
    CommandReport, ExecuteOptions, ExecuteOutcome, FieldDescriptor, RawExecutor, ShapedResult,
};
pub use splitter::split_statements;
