//! # Sea Level
//!
//! Age-driven flooding. The default scenario curve is linear and saturates:
//! year 0 is 0m, year 1000 is 100m, later years stay at 100m. Cells below
//! the level for the configured year are flooded up to it, which is how
//! submerged terrain reads on the client (a flat water table).

use crate::grid::Grid;

use super::TerrainFilter;

/// Sea level in meters for a simulation year, default scenario curve.
///
/// Linear at 0.1 m/year, clamped to `[0, 1000]` years, saturating at 100m.
#[must_use]
pub fn sea_level_for_year(year: u32) -> f32 {
    (year.min(1000) as f32) * 0.1
}

/// Flooding pass for one simulation year.
pub struct SeaLevel {
    level: f32,
}

impl SeaLevel {
    /// Creates a flooding filter for the given simulation year, using the
    /// default scenario curve.
    #[must_use]
    pub fn new(year: u32) -> Self {
        Self {
            level: sea_level_for_year(year),
        }
    }

    /// Creates a flooding filter at an explicit level (custom scenario).
    #[must_use]
    pub const fn at_level(level: f32) -> Self {
        Self { level }
    }

    /// The water level this filter floods to.
    #[must_use]
    pub const fn level(&self) -> f32 {
        self.level
    }
}

impl TerrainFilter for SeaLevel {
    fn apply(&self, grid: &Grid) -> Grid {
        let dim = grid.dim();
        Grid::from_fn(dim, |x, y| grid.get(x, y).max(self.level))
    }
}
