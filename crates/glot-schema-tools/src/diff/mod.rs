//! Table diff module
//!
//! Data structures describing desired changes to a single table.

mod model;


pub use model::*;
