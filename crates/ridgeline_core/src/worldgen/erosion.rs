//! # Erosion
//!
//! Smoothing-based erosion: repeated passes of a 3x3 binomial kernel with
//! clamped edges. Each pass moves material from peaks into hollows, which
//! reads as weathering at chunk scale.

use crate::grid::Grid;

use super::TerrainFilter;

/// 3x3 binomial smoothing kernel, weights summing to 16.
const KERNEL: [[f32; 3]; 3] = [[1.0, 2.0, 1.0], [2.0, 4.0, 2.0], [1.0, 2.0, 1.0]];

/// Smoothing erosion pass.
pub struct Erosion {
    passes: usize,
}

impl Erosion {
    /// Creates an erosion filter running `passes` smoothing iterations.
    #[must_use]
    pub const fn new(passes: usize) -> Self {
        Self { passes }
    }

    fn smooth_once(grid: &Grid) -> Grid {
        let dim = grid.dim();
        Grid::from_fn(dim, |x, y| {
            let mut acc = 0.0;
            for (ky, row) in KERNEL.iter().enumerate() {
                for (kx, weight) in row.iter().enumerate() {
                    // Clamp at the edges instead of wrapping; a chunk knows
                    // nothing about its neighbors.
                    let sx = (x + kx).saturating_sub(1).min(dim - 1);
                    let sy = (y + ky).saturating_sub(1).min(dim - 1);
                    acc += weight * grid.get(sx, sy);
                }
            }
            acc / 16.0
        })
    }
}

impl TerrainFilter for Erosion {
    fn apply(&self, grid: &Grid) -> Grid {
        let mut out = grid.clone();
        for _ in 0..self.passes {
            out = Self::smooth_once(&out);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spread(grid: &Grid) -> f32 {
        let max = grid.cells().iter().copied().fold(f32::MIN, f32::max);
        let min = grid.cells().iter().copied().fold(f32::MAX, f32::min);
        max - min
    }

    #[test]
    fn test_flat_terrain_is_unchanged() {
        let g = Grid::from_fn(8, |_, _| 5.0);
        let out = Erosion::new(3).apply(&g);
        for &c in out.cells() {
            assert!((c - 5.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_smoothing_reduces_spread() {
        let mut g = Grid::zero(9);
        g.set(4, 4, 100.0);
        let out = Erosion::new(1).apply(&g);
        assert!(spread(&out) < spread(&g));
        // The spike bled into its neighborhood.
        assert!(out.get(4, 4) < 100.0);
        assert!(out.get(3, 4) > 0.0);
    }

    #[test]
    fn test_zero_passes_is_identity() {
        let g = Grid::from_fn(6, |x, y| (x * y) as f32);
        assert_eq!(Erosion::new(0).apply(&g), g);
    }
}
