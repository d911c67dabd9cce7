//! # Elevation Grids
//!
//! A chunk's payload is a square matrix of `f32` elevations, stored flat in
//! row-major order. The native dimension is [`DEFAULT_CHUNK_SIZE`];
//! downsampled grids produced by the LOD sampler are smaller squares.
//!
//! Grids are plain value types: cloned freely, compared cell-for-cell, and
//! serialized as `{ dim, cells }` on the wire and on disk.

use serde::{Deserialize, Serialize};

/// Native chunk dimension in cells per axis (128x128 elevations).
pub const DEFAULT_CHUNK_SIZE: usize = 128;

/// Square matrix of elevations, row-major.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Grid {
    dim: usize,
    cells: Vec<f32>,
}

// Deserialization validates the dim/cell-count invariant, since grids
// arrive from disk tiles and from the network.
impl<'de> Deserialize<'de> for Grid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            dim: usize,
            cells: Vec<f32>,
        }
        let raw = Raw::deserialize(deserializer)?;
        Self::from_cells(raw.dim, raw.cells)
            .ok_or_else(|| serde::de::Error::custom("grid cell count does not match dimension"))
    }
}

impl Grid {
    /// Creates a zero-filled grid of the given dimension.
    #[must_use]
    pub fn zero(dim: usize) -> Self {
        Self {
            dim,
            cells: vec![0.0; dim * dim],
        }
    }

    /// Creates a grid from row-major cells.
    ///
    /// Returns `None` when `cells` is not exactly `dim * dim` long.
    #[must_use]
    pub fn from_cells(dim: usize, cells: Vec<f32>) -> Option<Self> {
        if cells.len() == dim * dim {
            Some(Self { dim, cells })
        } else {
            None
        }
    }

    /// Creates a grid by evaluating `f(x, y)` for every cell.
    #[must_use]
    pub fn from_fn(dim: usize, mut f: impl FnMut(usize, usize) -> f32) -> Self {
        let mut cells = Vec::with_capacity(dim * dim);
        for y in 0..dim {
            for x in 0..dim {
                cells.push(f(x, y));
            }
        }
        Self { dim, cells }
    }

    /// Side length in cells.
    #[inline]
    #[must_use]
    pub const fn dim(&self) -> usize {
        self.dim
    }

    /// Elevation at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics when `x` or `y` is out of range.
    #[inline]
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        assert!(x < self.dim && y < self.dim, "cell out of range");
        self.cells[y * self.dim + x]
    }

    /// Sets the elevation at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics when `x` or `y` is out of range.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        assert!(x < self.dim && y < self.dim, "cell out of range");
        self.cells[y * self.dim + x] = value;
    }

    /// One row of elevations.
    ///
    /// # Panics
    ///
    /// Panics when `y` is out of range.
    #[inline]
    #[must_use]
    pub fn row(&self, y: usize) -> &[f32] {
        assert!(y < self.dim, "row out of range");
        &self.cells[y * self.dim..(y + 1) * self.dim]
    }

    /// Iterates over rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        self.cells.chunks_exact(self.dim.max(1))
    }

    /// All cells, row-major.
    #[inline]
    #[must_use]
    pub fn cells(&self) -> &[f32] {
        &self.cells
    }

    /// Mutable view of all cells, row-major.
    #[inline]
    pub fn cells_mut(&mut self) -> &mut [f32] {
        &mut self.cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_grid() {
        let g = Grid::zero(4);
        assert_eq!(g.dim(), 4);
        assert!(g.cells().iter().all(|&c| c == 0.0));
    }

    #[test]
    fn test_from_cells_length_check() {
        assert!(Grid::from_cells(2, vec![1.0, 2.0, 3.0, 4.0]).is_some());
        assert!(Grid::from_cells(2, vec![1.0, 2.0, 3.0]).is_none());
    }

    #[test]
    fn test_get_set_row_major() {
        let mut g = Grid::zero(3);
        g.set(2, 1, 7.5);
        assert_eq!(g.get(2, 1), 7.5);
        assert_eq!(g.row(1), &[0.0, 0.0, 7.5]);
        assert_eq!(g.rows().count(), 3);
    }

    #[test]
    fn test_deserialize_rejects_mismatched_cell_count() {
        // Same shape as Grid on the wire, but the invariant is broken.
        let forged = bincode::serialize(&(3usize, vec![1.0f32, 2.0])).unwrap();
        assert!(bincode::deserialize::<Grid>(&forged).is_err());
    }

    #[test]
    fn test_serde_roundtrip() {
        let g = Grid::from_fn(5, |x, y| (x * 10 + y) as f32);
        let bytes = bincode::serialize(&g).unwrap();
        let back: Grid = bincode::deserialize(&bytes).unwrap();
        assert_eq!(back, g);
    }
}
