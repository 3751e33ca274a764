//! DDL synthesis module
//!
//! Renders SQL statement batches from table diffs and object definitions.
//! Rendering never touches a connection; execution goes through the apply
//! module.

mod generator;
mod table_spec;


pub use generator::*;
pub use table_spec::*;
