//! Diff application module
//!
//! Executes rendered statement batches and object rewrites over a live
//! connection, reporting exactly how far execution got when a statement
//! fails.

mod saga;


pub use saga::*;
