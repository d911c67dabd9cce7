//! # Worldgen Filters
//!
//! Deterministic terrain shaping applied grid-in, grid-out. Each filter is
//! a standalone pass behind one capability, [`TerrainFilter::apply`], so a
//! pipeline is just an ordered list of boxed filters.
//!
//! ## Passes
//!
//! - [`Tectonics`]: plate uplift, the large-scale relief
//! - [`Volcano`]: probabilistic crater placement
//! - [`Erosion`]: 3x3 smoothing kernel passes
//! - [`SeaLevel`]: age-driven flooding
//!
//! All randomness is drawn from seeded ChaCha streams; the same seed and
//! chunk coordinate always produce the same terrain.

mod erosion;
mod sea_level;
mod tectonics;
mod volcano;

pub use erosion::Erosion;
pub use sea_level::{sea_level_for_year, SeaLevel};
pub use tectonics::Tectonics;
pub use volcano::Volcano;

use crate::coord::ChunkCoord;
use crate::grid::Grid;
use crate::source::ChunkSource;

/// One grid-in, grid-out terrain shaping pass.
pub trait TerrainFilter: Send + Sync {
    /// Produces a new grid from `grid`. Must be deterministic for a given
    /// filter configuration.
    fn apply(&self, grid: &Grid) -> Grid;
}

/// Procedural chunk source: runs a filter pipeline over a flat grid,
/// reseeded per chunk coordinate.
///
/// Useful for demos and load tests where no tile directory exists; every
/// coordinate in the world has terrain, and revisiting one reproduces it.
pub struct GenSource {
    dim: usize,
    seed: u64,
}

impl GenSource {
    /// Creates a procedural source with the given world seed.
    #[must_use]
    pub const fn new(dim: usize, seed: u64) -> Self {
        Self { dim, seed }
    }

    /// Mixes the world seed with a chunk coordinate (splitmix64 finalizer),
    /// so neighboring chunks draw from unrelated random streams.
    #[must_use]
    fn tile_seed(&self, coord: ChunkCoord) -> u64 {
        let packed = (u64::from(coord.x as u32) << 32) | u64::from(coord.y as u32);
        let mut z = self.seed ^ packed;
        z = z.wrapping_add(0x9e37_79b9_7f4a_7c15);
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }
}

impl ChunkSource for GenSource {
    fn fetch(&self, coord: ChunkCoord) -> Grid {
        let seed = self.tile_seed(coord);
        let passes: [Box<dyn TerrainFilter>; 4] = [
            Box::new(Tectonics::new(seed, 6, 40.0)),
            Box::new(Volcano::new(seed.rotate_left(17), 0.3)),
            Box::new(Erosion::new(2)),
            Box::new(SeaLevel::new(500)),
        ];
        let mut grid = Grid::zero(self.dim);
        for pass in &passes {
            grid = pass.apply(&grid);
        }
        grid
    }

    fn chunk_dim(&self) -> usize {
        self.dim
    }
}
