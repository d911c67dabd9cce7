//! # Tectonics
//!
//! Large-scale relief from plate uplift. Plate centers are scattered over
//! the chunk from a seeded RNG, each with its own uplift; every cell takes
//! the uplift of its nearest plate, blended toward the plate boundary so
//! the seams read as ridges rather than cliffs.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::grid::Grid;

use super::TerrainFilter;

/// Plate uplift pass.
pub struct Tectonics {
    seed: u64,
    plates: usize,
    magnitude: f32,
}

impl Tectonics {
    /// Creates a tectonics filter.
    ///
    /// `plates` is the number of plate centers to scatter, `magnitude`
    /// bounds per-plate uplift in `[-magnitude, magnitude]` meters.
    #[must_use]
    pub const fn new(seed: u64, plates: usize, magnitude: f32) -> Self {
        Self {
            seed,
            plates,
            magnitude,
        }
    }
}

impl TerrainFilter for Tectonics {
    fn apply(&self, grid: &Grid) -> Grid {
        let dim = grid.dim();
        if dim == 0 || self.plates == 0 {
            return grid.clone();
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let plates: Vec<(f32, f32, f32)> = (0..self.plates)
            .map(|_| {
                (
                    rng.gen_range(0.0..dim as f32),
                    rng.gen_range(0.0..dim as f32),
                    rng.gen_range(-self.magnitude..=self.magnitude),
                )
            })
            .collect();

        Grid::from_fn(dim, |x, y| {
            let (fx, fy) = (x as f32, y as f32);
            let mut nearest = f32::MAX;
            let mut uplift = 0.0;
            for &(px, py, pu) in &plates {
                let d2 = (fx - px).powi(2) + (fy - py).powi(2);
                if d2 < nearest {
                    nearest = d2;
                    uplift = pu;
                }
            }
            // Fade the uplift near the plate center so each plate reads as
            // a dome instead of a flat plateau.
            let falloff = 1.0 / (1.0 + nearest.sqrt() / dim as f32);
            grid.get(x, y) + uplift * falloff
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_relief() {
        let g = Grid::zero(16);
        let a = Tectonics::new(7, 4, 30.0).apply(&g);
        let b = Tectonics::new(7, 4, 30.0).apply(&g);
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seed_different_relief() {
        let g = Grid::zero(16);
        let a = Tectonics::new(7, 4, 30.0).apply(&g);
        let b = Tectonics::new(8, 4, 30.0).apply(&g);
        assert_ne!(a, b);
    }

    #[test]
    fn test_uplift_is_bounded() {
        let g = Grid::zero(16);
        let out = Tectonics::new(3, 5, 25.0).apply(&g);
        for &c in out.cells() {
            assert!(c.abs() <= 25.0);
        }
    }

    #[test]
    fn test_zero_plates_is_identity() {
        let g = Grid::from_fn(8, |x, _| x as f32);
        assert_eq!(Tectonics::new(1, 0, 30.0).apply(&g), g);
    }
}
