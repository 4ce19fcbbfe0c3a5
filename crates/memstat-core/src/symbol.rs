//! Interned symbols.
//!
//! A `Symbol` is a handle to a unique piece of text. Two handles are equal only
//! if they point at the same interned entry, so equality and hashing never look
//! at the characters. The table holds weak references: a symbol lives as long
//! as somebody holds it, unless it has been made permanent.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::hash::symbol_hash;

struct SymbolData {
    text: Box<str>,
    hash: u32,
    permanent: AtomicBool,
}

#[derive(Clone)]
pub struct Symbol(Arc<SymbolData>);

impl Symbol {
    pub fn as_str(&self) -> &str {
        &self.0.text
    }

    /// Precomputed stable hash of the text.
    pub fn identity_hash(&self) -> u32 {
        self.0.hash
    }

    pub fn is_permanent(&self) -> bool {
        self.0.permanent.load(Ordering::Acquire)
    }

    /// Pin this symbol for the rest of the process. Idempotent.
    pub fn make_permanent(&self) {
        if !self.0.permanent.swap(true, Ordering::AcqRel) {
            // The extra strong count is never released.
            std::mem::forget(Arc::clone(&self.0));
        }
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(self.0.hash);
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.text)
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({:?})", &*self.0.text)
    }
}

/// Interning table. Cheap to share behind an `Arc`.
#[derive(Default)]
pub struct SymbolTable {
    entries: Mutex<HashMap<Box<str>, Weak<SymbolData>>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the live symbol for `text`, creating it if needed.
    pub fn intern(&self, text: &str) -> Symbol {
        let mut entries = self.entries.lock();
        if let Some(existing) = entries.get(text).and_then(Weak::upgrade) {
            return Symbol(existing);
        }
        let data = Arc::new(SymbolData {
            text: text.into(),
            hash: symbol_hash(text),
            permanent: AtomicBool::new(false),
        });
        entries.insert(text.into(), Arc::downgrade(&data));
        Symbol(data)
    }

    /// Number of symbols still alive.
    pub fn live_count(&self) -> usize {
        self.entries
            .lock()
            .values()
            .filter(|w| w.strong_count() > 0)
            .count()
    }

    /// Drop entries whose symbols have been reclaimed. Returns how many were removed.
    pub fn purge(&self) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, w| w.strong_count() > 0);
        before - entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_returns_same_handle() {
        let table = SymbolTable::new();
        let a = table.intern("Foo");
        let b = table.intern("Foo");
        let c = table.intern("Bar");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.as_str(), "Foo");
    }

    #[test]
    fn transient_symbols_are_reclaimed() {
        let table = SymbolTable::new();
        {
            let _tmp = table.intern("scratch");
            assert_eq!(table.live_count(), 1);
        }
        assert_eq!(table.live_count(), 0);
        assert_eq!(table.purge(), 1);
    }

    #[test]
    fn permanent_symbols_survive_their_handles() {
        let table = SymbolTable::new();
        let first = table.intern("Pinned");
        first.make_permanent();
        first.make_permanent();
        assert!(first.is_permanent());
        drop(first);
        assert_eq!(table.purge(), 0);
        let again = table.intern("Pinned");
        assert!(again.is_permanent());
    }
}
