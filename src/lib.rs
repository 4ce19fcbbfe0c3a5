#![forbid(unsafe_code)]
//! memstat: peak arena memory statistics for background method compilations.
//!
//! Facade over the workspace crates; integration tests and benches live here.

pub use memstat_core;
pub use memstat_exec;
pub use memstat_mem;
