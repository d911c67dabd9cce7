//! # Level of Detail
//!
//! Clients request chunks at a fractional level of detail in `[0, 1]`,
//! carried on the wire as a single byte `b` with `lod = b / 255`. Byte 255
//! is full resolution; anything below it derives a nearest-neighbor
//! sampling stride of `max(1, floor(1 / lod))`.
//!
//! Byte 0 would make the stride undefined and is rejected at request
//! decode time; it never reaches the sampler.
//!
//! Sampling is deterministic and lossy: every `stride`-th row and column,
//! starting at index 0, no interpolation.

use crate::grid::Grid;
use serde::{Deserialize, Serialize};

/// Level of detail, keyed by its wire byte.
///
/// The byte is the canonical identity: two requests with the same byte hit
/// the same session entry, so `Eq`/`Hash` are derived on it rather than on
/// the floating-point fraction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LodLevel(u8);

impl LodLevel {
    /// Full resolution (byte 255, fraction exactly 1.0).
    pub const FULL: Self = Self(255);

    /// Creates a level from its wire byte.
    #[inline]
    #[must_use]
    pub const fn from_byte(byte: u8) -> Self {
        Self(byte)
    }

    /// The wire byte.
    #[inline]
    #[must_use]
    pub const fn byte(self) -> u8 {
        self.0
    }

    /// Fractional resolution in `[0, 1]`.
    #[inline]
    #[must_use]
    pub fn fraction(self) -> f32 {
        f32::from(self.0) / 255.0
    }

    /// Nearest-neighbor sampling stride derived from the fraction.
    ///
    /// `1` at full resolution, `max(1, floor(1 / lod))` below it. With
    /// `lod = byte / 255` that floor is exactly `255 / byte`, so integer
    /// division avoids float rounding right at the stride boundaries.
    /// Byte 0 saturates to `usize::MAX`; callers reject it before sampling.
    #[inline]
    #[must_use]
    pub fn stride(self) -> usize {
        match self.0 {
            255 => 1,
            0 => usize::MAX,
            byte => (255 / byte as usize).max(1),
        }
    }
}

impl std::fmt::Display for LodLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/255", self.0)
    }
}

/// Downsamples a grid by the level's stride.
///
/// The output dimension per axis is `ceil(dim / stride)`; strides at or
/// beyond the grid dimension collapse to a single cell. Full resolution is
/// an identity copy.
#[must_use]
pub fn sample(grid: &Grid, lod: LodLevel) -> Grid {
    let stride = lod.stride();
    if stride <= 1 {
        return grid.clone();
    }
    let dim = grid.dim();
    let stride = stride.min(dim.max(1));
    let out_dim = dim.div_ceil(stride);
    Grid::from_fn(out_dim, |x, y| grid.get(x * stride, y * stride))
}
