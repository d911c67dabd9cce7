//! # Volcanism
//!
//! Probabilistic crater placement. The eruption `rate` in `[0, 1]` scales
//! how many craters a chunk receives; each crater is a parabolic bowl with
//! a raised rim, carved from a seeded RNG so the same chunk always erupts
//! the same way.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::grid::Grid;

use super::TerrainFilter;

/// Upper bound on craters per chunk at `rate = 1.0`.
const MAX_CRATERS: usize = 8;

/// Crater carving pass.
pub struct Volcano {
    seed: u64,
    rate: f32,
}

impl Volcano {
    /// Creates a volcanism filter with eruption `rate` clamped to `[0, 1]`.
    #[must_use]
    pub fn new(seed: u64, rate: f32) -> Self {
        Self {
            seed,
            rate: rate.clamp(0.0, 1.0),
        }
    }

    fn carve(grid: &mut Grid, cx: f32, cy: f32, radius: f32, depth: f32) {
        let dim = grid.dim();
        let rim = depth * 0.25;
        for y in 0..dim {
            for x in 0..dim {
                let d = ((x as f32 - cx).powi(2) + (y as f32 - cy).powi(2)).sqrt();
                if d < radius {
                    // Parabolic bowl inside the radius, rim lip at the edge.
                    let t = d / radius;
                    let delta = rim.mul_add(t, -(depth * (1.0 - t * t)));
                    let cell = grid.get(x, y);
                    grid.set(x, y, cell + delta);
                }
            }
        }
    }
}

impl TerrainFilter for Volcano {
    fn apply(&self, grid: &Grid) -> Grid {
        let dim = grid.dim();
        let craters = (self.rate * MAX_CRATERS as f32).round() as usize;
        if dim == 0 || craters == 0 {
            return grid.clone();
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut out = grid.clone();
        for _ in 0..craters {
            let cx = rng.gen_range(0.0..dim as f32);
            let cy = rng.gen_range(0.0..dim as f32);
            let radius = rng.gen_range(2.0..(dim as f32 / 4.0).max(2.5));
            let depth = rng.gen_range(5.0..20.0);
            Self::carve(&mut out, cx, cy, radius, depth);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_rate_is_identity() {
        let g = Grid::from_fn(16, |x, y| (x + y) as f32);
        assert_eq!(Volcano::new(9, 0.0).apply(&g), g);
    }

    #[test]
    fn test_same_seed_same_craters() {
        let g = Grid::zero(24);
        let a = Volcano::new(11, 0.8).apply(&g);
        let b = Volcano::new(11, 0.8).apply(&g);
        assert_eq!(a, b);
    }

    #[test]
    fn test_craters_depress_terrain() {
        let g = Grid::zero(32);
        let out = Volcano::new(5, 1.0).apply(&g);
        let min = out.cells().iter().copied().fold(f32::MAX, f32::min);
        assert!(min < 0.0, "expected at least one bowl below datum");
    }

    #[test]
    fn test_rate_is_clamped() {
        let g = Grid::zero(16);
        // Would be 80 craters unclamped; must behave like rate 1.0.
        let a = Volcano::new(3, 10.0).apply(&g);
        let b = Volcano::new(3, 1.0).apply(&g);
        assert_eq!(a, b);
    }
}
