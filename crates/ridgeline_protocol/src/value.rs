//! # Dynamic Value Model
//!
//! A small self-describing value tree, the shape the diff engine operates
//! on. Grids cross into this model as sequences of row sequences of
//! floats; map payloads and scalars are supported so the diff rules are
//! uniform for every payload shape the protocol may carry.
//!
//! [`Value::Nil`] doubles as the deletion sentinel inside map deltas; it
//! is reserved and never appears as a legitimate grid cell.

use std::collections::BTreeMap;

use ridgeline_core::Grid;
use serde::{Deserialize, Serialize};

/// A dynamically-shaped payload value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Absent value; reserved as the deletion sentinel in map deltas.
    Nil,
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating-point number.
    Float(f64),
    /// UTF-8 string.
    Str(String),
    /// Ordered sequence.
    Seq(Vec<Value>),
    /// Keyed mapping with deterministic key order.
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// True for the [`Value::Nil`] sentinel.
    #[inline]
    #[must_use]
    pub const fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// A grid as a sequence of row sequences, the payload shape the diff
    /// engine sees. `f32` cells widen losslessly to `f64`.
    #[must_use]
    pub fn from_grid(grid: &Grid) -> Self {
        Self::Seq(
            grid.rows()
                .map(|row| Self::Seq(row.iter().map(|&c| Self::Float(f64::from(c))).collect()))
                .collect(),
        )
    }
}

impl From<&Grid> for Value {
    fn from(grid: &Grid) -> Self {
        Self::from_grid(grid)
    }
}
