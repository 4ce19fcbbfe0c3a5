//! Abstract hooks into the compilation engine.
//!
//! The engine itself is external. We only ask it for the diagnostic values we
//! sample when a new peak is reached.

/// Source of the live IR node count of the compilation in progress.
///
/// Consulted best-effort at peak time; when no source is present the last
/// sampled value is kept.
pub trait LiveNodeSource: Send + Sync {
    fn live_nodes(&self) -> u32;
}

impl<F> LiveNodeSource for F
where
    F: Fn() -> u32 + Send + Sync,
{
    fn live_nodes(&self) -> u32 {
        self()
    }
}
