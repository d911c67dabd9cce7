//! # Ridgeline Core
//!
//! Terrain data model for the Ridgeline streaming server.
//!
//! ## Core Components
//!
//! - `Grid`: square matrix of `f32` elevations
//! - `ChunkCoord`: integer address of one terrain tile
//! - `LodLevel`: fractional level of detail driving the sampling stride
//! - `ChunkSource`: where chunks come from (directory, memory, procedural)
//! - `worldgen`: deterministic terrain filters (erosion, sea level, ...)
//!
//! ## Design Principles
//!
//! 1. **Value types**: grids and coordinates are plain data, freely cloned.
//! 2. **Infallible sources**: a missing chunk is a zero-filled grid, never
//!    an error that could take a connection down.
//! 3. **Deterministic**: the same seed and coordinate always produce the
//!    same chunk.

#![deny(unsafe_code)]

pub mod coord;
pub mod grid;
pub mod lod;
pub mod source;
pub mod worldgen;

pub use coord::ChunkCoord;
pub use grid::{Grid, DEFAULT_CHUNK_SIZE};
pub use lod::{sample, LodLevel};
pub use source::{ChunkSource, DirSource, MemSource};
pub use worldgen::{GenSource, TerrainFilter};
