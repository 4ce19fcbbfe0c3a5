#![forbid(unsafe_code)]
//! memstat-core: shared vocabulary for compilation memory statistics.
//!
//! Interned symbols, the `MethodIdentity` key, arena/compiler tags, thread ids,
//! the optional live-node hook, and configuration. No threads or IO live here;
//! the counter is in `memstat-mem` and the table/service in `memstat-exec`.

pub mod config;
pub mod error;
pub mod hash;
pub mod hooks;
pub mod id;
pub mod method;
pub mod prelude;
pub mod symbol;
pub mod types;

pub use error::{Error, Result};
