#![forbid(unsafe_code)]
//! memstat-mem: per-compilation arena peak counter.
//!
//! Every arena allocation and free during a tracked compilation lands in a
//! `PeakCounter` owned by the compiling thread. This is the hot path: no locks,
//! no allocation, constant time.

pub mod tracking;

pub use tracking::{PeakCounter, PeakSnapshot};
