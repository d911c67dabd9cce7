//! # Session Store
//!
//! Per-connection memory of the last grid sent for each `(chunk, LOD)`
//! key. The store is exclusively owned by its connection task - created at
//! accept, dropped at close, never shared - so there is no locking here,
//! and per-connection FIFO request order is what keeps its entries in sync
//! with what the peer actually holds.
//!
//! The LOD byte is part of the key: the same coordinate requested at two
//! levels of detail diffs against two independent baselines.

use std::collections::HashMap;

use ridgeline_core::{ChunkCoord, Grid, LodLevel};

/// Identity of one differential stream within a connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SessionKey {
    /// Requested chunk.
    pub coord: ChunkCoord,
    /// Requested level of detail.
    pub lod: LodLevel,
}

impl SessionKey {
    /// Creates a session key.
    #[inline]
    #[must_use]
    pub const fn new(coord: ChunkCoord, lod: LodLevel) -> Self {
        Self { coord, lod }
    }
}

/// Last-sent grids for one connection.
#[derive(Default)]
pub struct SessionStore {
    entries: HashMap<SessionKey, Grid>,
}

impl SessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The grid last sent for `key`, if any.
    #[must_use]
    pub fn last_sent(&self, key: &SessionKey) -> Option<&Grid> {
        self.entries.get(key)
    }

    /// Records the grid just sent for `key`; the baseline for the next
    /// incremental request.
    pub fn remember(&mut self, key: SessionKey, grid: Grid) {
        self.entries.insert(key, grid);
    }

    /// Number of active differential streams.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing has been sent yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(x: i32, y: i32, lod_byte: u8) -> SessionKey {
        SessionKey::new(ChunkCoord::new(x, y), LodLevel::from_byte(lod_byte))
    }

    #[test]
    fn test_remember_and_lookup() {
        let mut store = SessionStore::new();
        assert!(store.last_sent(&key(0, 0, 255)).is_none());

        let g = Grid::zero(4);
        store.remember(key(0, 0, 255), g.clone());
        assert_eq!(store.last_sent(&key(0, 0, 255)), Some(&g));
    }

    #[test]
    fn test_lods_cache_independently() {
        let mut store = SessionStore::new();
        let full = Grid::from_fn(4, |x, _| x as f32);
        let half = Grid::from_fn(2, |x, _| x as f32);

        store.remember(key(3, 3, 255), full.clone());
        store.remember(key(3, 3, 127), half.clone());

        assert_eq!(store.len(), 2);
        assert_eq!(store.last_sent(&key(3, 3, 255)), Some(&full));
        assert_eq!(store.last_sent(&key(3, 3, 127)), Some(&half));
    }

    #[test]
    fn test_remember_overwrites() {
        let mut store = SessionStore::new();
        store.remember(key(1, 1, 255), Grid::zero(4));

        let mut newer = Grid::zero(4);
        newer.set(0, 0, 9.0);
        store.remember(key(1, 1, 255), newer.clone());

        assert_eq!(store.len(), 1);
        assert_eq!(store.last_sent(&key(1, 1, 255)), Some(&newer));
    }
}
