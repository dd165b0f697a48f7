// LogPanel - app/cache.rs
//
// Last-known raw text per source. Entries appear on a source's first
// successful fetch, are overwritten by later ones, and are never removed.
// The set of keys is bounded by the handful of sources a host exposes.

use crate::core::model::Source;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// One cached fetch result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Raw text exactly as the host returned it.
    pub text: String,

    /// Cache-wide monotonic counter, assigned when the result was stored.
    pub sequence: u64,

    /// When the result was stored.
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<Source, CacheEntry>,
    next_sequence: u64,
}

/// Raw log text keyed by source.
///
/// Writers are serialised by the lock; readers see either the previous or
/// the new entry for a key, never a partial one. The lock is never held
/// across an await.
#[derive(Debug, Default)]
pub struct LogCache {
    inner: RwLock<Inner>,
}

impl LogCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a fetch result, replacing any previous entry for `source`.
    /// Returns the sequence number assigned to it.
    pub fn store(&self, source: Source, text: String) -> u64 {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.next_sequence += 1;
        let sequence = inner.next_sequence;
        inner.entries.insert(
            source,
            CacheEntry {
                text,
                sequence,
                fetched_at: Utc::now(),
            },
        );
        sequence
    }

    /// Clone of the entry for `source`, if one was ever stored.
    pub fn get(&self, source: &Source) -> Option<CacheEntry> {
        self.read(|entries| entries.get(source).cloned())
    }

    /// Raw text for `source`, if one was ever stored.
    pub fn text(&self, source: &Source) -> Option<String> {
        self.read(|entries| entries.get(source).map(|e| e.text.clone()))
    }

    /// Sequence number of the entry for `source`.
    pub fn sequence(&self, source: &Source) -> Option<u64> {
        self.read(|entries| entries.get(source).map(|e| e.sequence))
    }

    pub fn contains(&self, source: &Source) -> bool {
        self.read(|entries| entries.contains_key(source))
    }

    /// Number of sources with an entry.
    pub fn len(&self) -> usize {
        self.read(HashMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read<R>(&self, f: impl FnOnce(&HashMap<Source, CacheEntry>) -> R) -> R {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&inner.entries)
    }
}
