//! Peak tracking for one compilation episode.
//!
//! `current` is never reset: a thread may be reused and arenas from earlier
//! work may still be alive. `start()` only moves the baseline.

use std::fmt;

use serde::{Deserialize, Serialize};

use memstat_core::hooks::LiveNodeSource;
use memstat_core::types::ArenaTag;

/// Values copied out of a counter when a compilation ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeakSnapshot {
    /// Peak since start, in bytes.
    pub total: usize,
    /// Node arena bytes at the peak.
    pub node_bytes: usize,
    /// Resource area bytes at the peak.
    pub resource_bytes: usize,
    /// Live IR nodes sampled at the peak.
    pub live_nodes: u32,
}

#[derive(Debug, Clone, Default)]
pub struct PeakCounter {
    current: usize,
    start: usize,
    peak: usize,

    // Running category totals.
    node: usize,
    resource: usize,

    // Sampled whenever a new peak is reached.
    node_at_peak: usize,
    resource_at_peak: usize,
    live_nodes_at_peak: u32,
}

impl PeakCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin an episode at wherever `current` stands.
    pub fn start(&mut self) {
        self.start = self.current;
        self.peak = self.current;
    }

    /// Account an arena allocation (`delta > 0`) or free (`delta < 0`).
    /// Returns true if this reached a new peak.
    pub fn account(
        &mut self,
        delta: isize,
        tag: ArenaTag,
        nodes: Option<&dyn LiveNodeSource>,
    ) -> bool {
        // Arena usage is stack bound and symmetric within an episode; more freed
        // than allocated means the hook wiring is broken.
        debug_assert!(
            delta >= 0 || self.current.checked_add_signed(delta).is_some(),
            "Negative overflow (d={} {} {} {})",
            delta,
            self.current,
            self.start,
            self.peak
        );
        self.current = self.current.saturating_add_signed(delta);

        match tag {
            ArenaTag::Node => self.node = self.node.saturating_add_signed(delta),
            ArenaTag::Resource => self.resource = self.resource.saturating_add_signed(delta),
            ArenaTag::Handle | ArenaTag::Other => {}
        }

        if self.current <= self.peak {
            return false;
        }

        debug_assert!(delta > 0, "Sanity ({} {} {})", self.current, self.start, self.peak);
        self.peak = self.current;
        self.node_at_peak = self.node;
        self.resource_at_peak = self.resource;
        if let Some(src) = nodes {
            self.live_nodes_at_peak = src.live_nodes();
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(
            peak = self.peak,
            since_start = self.peak_since_start(),
            ?tag,
            "arena peak"
        );
        true
    }

    pub fn peak_since_start(&self) -> usize {
        self.peak.saturating_sub(self.start)
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn start_value(&self) -> usize {
        self.start
    }

    pub fn peak(&self) -> usize {
        self.peak
    }

    pub fn node_at_peak(&self) -> usize {
        self.node_at_peak
    }

    pub fn resource_at_peak(&self) -> usize {
        self.resource_at_peak
    }

    pub fn live_nodes_at_peak(&self) -> u32 {
        self.live_nodes_at_peak
    }

    pub fn snapshot(&self) -> PeakSnapshot {
        PeakSnapshot {
            total: self.peak_since_start(),
            node_bytes: self.node_at_peak,
            resource_bytes: self.resource_at_peak,
            live_nodes: self.live_nodes_at_peak,
        }
    }
}

impl fmt::Display for PeakCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [na {} ra {}]",
            self.peak_since_start(),
            self.node_at_peak,
            self.resource_at_peak
        )?;
        if cfg!(debug_assertions) {
            write!(f, " ({}->{}->{})", self.start, self.peak, self.current)?;
        }
        Ok(())
    }
}
