//! # Diff Engine
//!
//! Minimal deltas between two payload snapshots, and the inverse that
//! rebuilds the new snapshot from the old one plus a delta. The server
//! computes; the client applies. Both directions live here so the two
//! ends cannot drift apart.
//!
//! ## Shapes
//!
//! - Map vs map: changed/added entries, removed keys marked [`Value::Nil`]
//! - Seq vs seq: `{index, value}` records for changed and appended indices
//! - Anything else: the literal new value, or no-change when equal
//!
//! ## Shrinking sequences
//!
//! A sequence delta never signals removal of trailing elements; applying
//! one never shrinks the base. Ridgeline grids cannot hit this case (the
//! LOD is part of the session key, so a key's dimensions are fixed), but
//! callers diffing other payloads must not assume a reconstructed
//! sequence shrinks.

use std::collections::BTreeMap;

use ridgeline_core::Grid;
use serde::{Deserialize, Serialize};

use crate::value::Value;

/// One changed or appended sequence position.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeqEdit {
    /// Position in the new sequence.
    pub index: u64,
    /// New value at that position.
    pub value: Value,
}

/// Changes between two payload snapshots.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Delta {
    /// The designated no-change value for scalar comparisons.
    NoChange,
    /// Map-shaped patch; [`Value::Nil`] entries delete their key.
    Map(BTreeMap<String, Value>),
    /// Sequence-shaped patch, ordered by index.
    Seq(Vec<SeqEdit>),
    /// Shapes differ or are scalar: the literal new value.
    Replace(Value),
}

impl Delta {
    /// Computes the minimal delta turning `old` into `new`.
    #[must_use]
    pub fn compute(old: &Value, new: &Value) -> Self {
        match (old, new) {
            (Value::Map(old_map), Value::Map(new_map)) => {
                let mut patch = BTreeMap::new();
                for (key, value) in new_map {
                    if old_map.get(key) != Some(value) {
                        patch.insert(key.clone(), value.clone());
                    }
                }
                for key in old_map.keys() {
                    if !new_map.contains_key(key) {
                        patch.insert(key.clone(), Value::Nil);
                    }
                }
                // An empty patch map IS the no-change signal for maps; it
                // is sent as-is, not upgraded to a full resend.
                Self::Map(patch)
            }
            (Value::Seq(old_seq), Value::Seq(new_seq)) => {
                let min_len = old_seq.len().min(new_seq.len());
                let mut edits = Vec::new();
                for (i, value) in new_seq.iter().enumerate().take(min_len) {
                    if old_seq[i] != *value {
                        edits.push(SeqEdit {
                            index: i as u64,
                            value: value.clone(),
                        });
                    }
                }
                for (i, value) in new_seq.iter().enumerate().skip(min_len) {
                    edits.push(SeqEdit {
                        index: i as u64,
                        value: value.clone(),
                    });
                }
                Self::Seq(edits)
            }
            _ if old != new => Self::Replace(new.clone()),
            _ => Self::NoChange,
        }
    }

    /// Computes the delta between two grids (row-granular: one edit per
    /// changed row, carrying the full new row).
    #[must_use]
    pub fn between_grids(old: &Grid, new: &Grid) -> Self {
        Self::compute(&Value::from_grid(old), &Value::from_grid(new))
    }

    /// True when applying this delta leaves the base unchanged.
    #[must_use]
    pub fn is_no_change(&self) -> bool {
        match self {
            Self::NoChange => true,
            Self::Map(patch) => patch.is_empty(),
            Self::Seq(edits) => edits.is_empty(),
            Self::Replace(_) => false,
        }
    }

    /// Rebuilds the new snapshot from `old`.
    ///
    /// Map patches delete on [`Value::Nil`] and set otherwise; sequence
    /// edits overwrite in-range positions and ignore out-of-range ones
    /// (values are not otherwise validated); shape mismatches leave `old`
    /// as-is.
    #[must_use]
    pub fn apply(&self, old: &Value) -> Value {
        match (self, old) {
            (Self::NoChange, _) => old.clone(),
            (Self::Replace(value), _) => value.clone(),
            (Self::Map(patch), Value::Map(old_map)) => {
                let mut out = old_map.clone();
                for (key, value) in patch {
                    if value.is_nil() {
                        out.remove(key);
                    } else {
                        out.insert(key.clone(), value.clone());
                    }
                }
                Value::Map(out)
            }
            (Self::Seq(edits), Value::Seq(old_seq)) => {
                let mut out = old_seq.clone();
                for edit in edits {
                    if let Ok(i) = usize::try_from(edit.index) {
                        if i < out.len() {
                            out[i] = edit.value.clone();
                        }
                    }
                }
                Value::Seq(out)
            }
            _ => old.clone(),
        }
    }
}
