//! GLOT Schema Tools - Table diffs, DDL synthesis, and diff application
//!
//! This crate provides functionality for:
//! - Describing structured table diffs (columns, indexes, foreign keys)
//! - Synthesizing ordered DDL statement batches from diffs
//! - Applying batches and object rewrites against a connection

pub mod apply;
pub mod ddl;
pub mod diff;

pub use apply::*;
pub use ddl::*;
pub use diff::*;
