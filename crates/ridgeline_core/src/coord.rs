//! # Chunk Coordinates
//!
//! Terrain is organized into fixed-size square chunks addressed by a pair
//! of signed integers. There is no range restriction beyond what `i32`
//! represents; clients far from the origin are as valid as chunk `(0, 0)`.

use serde::{Deserialize, Serialize};

/// Address of one terrain chunk in the world grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkCoord {
    /// X coordinate (in chunks, not cells).
    pub x: i32,
    /// Y coordinate (in chunks, not cells).
    pub y: i32,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
