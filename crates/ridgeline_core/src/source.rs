//! # Chunk Sources
//!
//! Where chunk data comes from. The contract is deliberately infallible:
//! `fetch` returns a native-resolution grid for every coordinate, and
//! "no data here" is a zero-filled grid rather than an error. A flaky disk
//! or a missing tile must never take a client connection down.
//!
//! ## Implementations
//!
//! - [`DirSource`]: tiles stored on disk as `<cx>_<cy>.dat`, re-read on
//!   every fetch so edits show up in the next incremental response
//! - [`MemSource`]: in-memory tile map for tests and embedding
//! - [`crate::worldgen::GenSource`]: deterministic procedural terrain

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use parking_lot::RwLock;
use tracing::debug;

use crate::coord::ChunkCoord;
use crate::grid::Grid;

/// Provider of native-resolution chunk grids.
///
/// Implementations are shared across connection tasks behind an `Arc`, so
/// `fetch` takes `&self` and must be safe to call concurrently.
pub trait ChunkSource: Send + Sync {
    /// Returns the native grid for `coord`, or a zero-filled grid of
    /// [`chunk_dim`](Self::chunk_dim) cells per axis when the coordinate
    /// has no data. Never fails.
    fn fetch(&self, coord: ChunkCoord) -> Grid;

    /// Native dimension of the grids this source produces.
    fn chunk_dim(&self) -> usize;
}

/// Directory-backed source: one bincode-encoded [`Grid`] per tile file.
///
/// Tiles live at `<dir>/<cx>_<cy>.dat`. Unreadable, undecodable or
/// wrongly-sized tiles degrade to the zero grid.
pub struct DirSource {
    dir: PathBuf,
    dim: usize,
}

impl DirSource {
    /// Creates a source rooted at `dir` producing `dim`-cell grids.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, dim: usize) -> Self {
        Self {
            dir: dir.into(),
            dim,
        }
    }

    /// File path for one tile.
    #[must_use]
    pub fn tile_path(&self, coord: ChunkCoord) -> PathBuf {
        self.dir.join(format!("{}_{}.dat", coord.x, coord.y))
    }

    /// Writes a tile to disk, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns any underlying filesystem or encoding error.
    pub fn store(&self, coord: ChunkCoord, grid: &Grid) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let bytes = bincode::serialize(grid)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(self.tile_path(coord), bytes)
    }
}

impl ChunkSource for DirSource {
    fn fetch(&self, coord: ChunkCoord) -> Grid {
        let path = self.tile_path(coord);
        let Ok(bytes) = fs::read(&path) else {
            return Grid::zero(self.dim);
        };
        match bincode::deserialize::<Grid>(&bytes) {
            Ok(grid) if grid.dim() == self.dim => grid,
            Ok(grid) => {
                debug!(
                    coord = %coord,
                    got = grid.dim(),
                    want = self.dim,
                    "tile has wrong dimension, serving zero grid"
                );
                Grid::zero(self.dim)
            }
            Err(err) => {
                debug!(coord = %coord, %err, "tile failed to decode, serving zero grid");
                Grid::zero(self.dim)
            }
        }
    }

    fn chunk_dim(&self) -> usize {
        self.dim
    }
}

/// In-memory source with interior mutability, so tests can change what a
/// coordinate returns between two requests on a live connection.
pub struct MemSource {
    tiles: RwLock<HashMap<ChunkCoord, Grid>>,
    dim: usize,
}

impl MemSource {
    /// Creates an empty source producing `dim`-cell grids.
    #[must_use]
    pub fn new(dim: usize) -> Self {
        Self {
            tiles: RwLock::new(HashMap::new()),
            dim,
        }
    }

    /// Inserts or replaces a tile. Grids of the wrong dimension are
    /// ignored, matching the zero-grid degradation of [`DirSource`].
    pub fn insert(&self, coord: ChunkCoord, grid: Grid) {
        if grid.dim() == self.dim {
            self.tiles.write().insert(coord, grid);
        }
    }

    /// Removes a tile; subsequent fetches return the zero grid.
    pub fn remove(&self, coord: ChunkCoord) {
        self.tiles.write().remove(&coord);
    }
}

impl ChunkSource for MemSource {
    fn fetch(&self, coord: ChunkCoord) -> Grid {
        self.tiles
            .read()
            .get(&coord)
            .cloned()
            .unwrap_or_else(|| Grid::zero(self.dim))
    }

    fn chunk_dim(&self) -> usize {
        self.dim
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mem_source_defaults_to_zero() {
        let src = MemSource::new(8);
        let g = src.fetch(ChunkCoord::new(3, -2));
        assert_eq!(g.dim(), 8);
        assert!(g.cells().iter().all(|&c| c == 0.0));
    }

    #[test]
    fn test_mem_source_roundtrip_and_remove() {
        let src = MemSource::new(4);
        let g = Grid::from_fn(4, |x, y| (x + y) as f32);
        src.insert(ChunkCoord::new(1, 1), g.clone());
        assert_eq!(src.fetch(ChunkCoord::new(1, 1)), g);

        src.remove(ChunkCoord::new(1, 1));
        assert_eq!(src.fetch(ChunkCoord::new(1, 1)), Grid::zero(4));
    }

    #[test]
    fn test_mem_source_rejects_wrong_dim() {
        let src = MemSource::new(4);
        src.insert(ChunkCoord::new(0, 0), Grid::zero(8));
        assert_eq!(src.fetch(ChunkCoord::new(0, 0)), Grid::zero(4));
    }

    #[test]
    fn test_dir_source_missing_tile_is_zero() {
        let tmp = tempfile::tempdir().unwrap();
        let src = DirSource::new(tmp.path(), 16);
        assert_eq!(src.fetch(ChunkCoord::new(5, 5)), Grid::zero(16));
    }

    #[test]
    fn test_dir_source_roundtrip() {
        let tmp = tempfile::tempdir().unwrap();
        let src = DirSource::new(tmp.path(), 8);
        let g = Grid::from_fn(8, |x, y| (x * 8 + y) as f32);
        src.store(ChunkCoord::new(-1, 2), &g).unwrap();
        assert_eq!(src.fetch(ChunkCoord::new(-1, 2)), g);
    }

    #[test]
    fn test_dir_source_corrupt_tile_is_zero() {
        let tmp = tempfile::tempdir().unwrap();
        let src = DirSource::new(tmp.path(), 8);
        fs::create_dir_all(tmp.path()).unwrap();
        fs::write(src.tile_path(ChunkCoord::new(0, 0)), b"not a grid").unwrap();
        assert_eq!(src.fetch(ChunkCoord::new(0, 0)), Grid::zero(8));
    }
}
