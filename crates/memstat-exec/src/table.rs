//! `StatTable`: method identity to latest peak record.
//!
//! Not synchronized itself; the service keeps it behind its one lock.

use std::collections::HashMap;

use memstat_core::id::CompilerThreadId;
use memstat_core::method::MethodIdentity;
use memstat_core::types::CompilerKind;
use memstat_mem::PeakSnapshot;

use crate::record::StatRecord;

/// Everything a finished compilation contributes to its record.
#[derive(Debug, Clone, Copy)]
pub struct Commit {
    pub kind: CompilerKind,
    pub peak: PeakSnapshot,
    /// Seconds since the service started.
    pub time: f64,
    pub thread: CompilerThreadId,
}

#[derive(Debug, Default)]
pub struct StatTable {
    entries: HashMap<MethodIdentity, StatRecord>,
}

impl StatTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or overwrite the record for `method` and bump its recompilation count.
    pub fn upsert(&mut self, method: &MethodIdentity, commit: &Commit) -> &StatRecord {
        let record = self
            .entries
            .entry(method.clone())
            .or_insert_with(|| StatRecord::new(method.clone()));
        record.apply(commit);
        record
    }

    /// All records with `total >= min_size`, in no particular order.
    pub fn snapshot(&self, min_size: usize) -> Vec<&StatRecord> {
        let flat: Vec<&StatRecord> = self
            .entries
            .values()
            .filter(|r| r.total() >= min_size)
            .collect();
        debug_assert!(min_size > 0 || flat.len() == self.entries.len());
        flat
    }

    pub fn get(&self, method: &MethodIdentity) -> Option<&StatRecord> {
        self.entries.get(method)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Largest total first. Stable: equal totals keep their snapshot order.
pub fn sort_by_size(records: &mut [&StatRecord]) {
    records.sort_by(|a, b| b.total().cmp(&a.total()));
}
