//! # Full-Frame Cache
//!
//! Bounded, TTL-evicting cache of pre-compressed full-grid frames, shared
//! across all connection tasks. Full payloads for a `(chunk, LOD)` key are
//! identical for every client, so encoding and compressing them once is
//! the one cross-connection optimization this server carries.
//!
//! Each entry stores the encoded frame *and* the sampled grid it encodes:
//! a session must be updated with exactly what went over the wire, or the
//! next delta would diff against a baseline the client never saw.
//!
//! Incremental responses are per-session by definition and never touch
//! this cache. Capacity 0 disables it entirely.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use ridgeline_core::Grid;

use crate::session::SessionKey;

/// One cached full response: the wire frame and the grid it carries.
pub struct CachedFull {
    /// Complete frame, length prefix included.
    pub frame: Vec<u8>,
    /// The sampled grid the frame encodes, for session bookkeeping.
    pub grid: Grid,
}

struct Entry {
    payload: Arc<CachedFull>,
    inserted: Instant,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<SessionKey, Entry>,
    /// Insertion order, oldest first; eviction is FIFO over this queue.
    order: VecDeque<SessionKey>,
}

/// Shared cache of pre-compressed full-grid frames.
pub struct PayloadCache {
    capacity: usize,
    ttl: Duration,
    inner: Mutex<Inner>,
}

impl PayloadCache {
    /// Creates a cache holding at most `capacity` frames for at most `ttl`.
    #[must_use]
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            capacity,
            ttl,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// A cache that stores nothing.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// False when capacity is 0.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.capacity > 0
    }

    /// A live entry for `key`, or `None` on miss or expiry.
    #[must_use]
    pub fn get(&self, key: &SessionKey) -> Option<Arc<CachedFull>> {
        let mut inner = self.inner.lock();
        match inner.entries.get(key) {
            Some(entry) if entry.inserted.elapsed() < self.ttl => Some(Arc::clone(&entry.payload)),
            Some(_) => {
                // Expired; drop it so the map stays bounded by live data.
                inner.entries.remove(key);
                inner.order.retain(|k| k != key);
                None
            }
            None => None,
        }
    }

    /// Inserts or refreshes an entry, evicting the oldest past capacity.
    pub fn insert(&self, key: SessionKey, payload: Arc<CachedFull>) {
        if !self.is_enabled() {
            return;
        }
        let mut inner = self.inner.lock();
        // Drop the stale entry first so a refresh does not count toward
        // capacity and evict an unrelated key.
        if inner.entries.remove(&key).is_some() {
            inner.order.retain(|k| k != &key);
        }
        while inner.entries.len() >= self.capacity {
            let Some(oldest) = inner.order.pop_front() else {
                break;
            };
            inner.entries.remove(&oldest);
        }
        inner.order.push_back(key);
        inner.entries.insert(
            key,
            Entry {
                payload,
                inserted: Instant::now(),
            },
        );
    }

    /// Number of entries currently held (expired ones included until
    /// they are touched).
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// True when the cache holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
