//! # Ridgeline Protocol
//!
//! The wire contract between the chunk server and its clients.
//!
//! ## Message flow
//!
//! ```text
//! CLIENT                                    SERVER
//!   |                                         |
//!   |--- RequestHeader (10 bytes) ----------->|
//!   |                                         |  fetch + sample + diff
//!   |<-- Frame [len u32 BE][zlib(bincode)] ---|
//!   |                                         |
//! ```
//!
//! One frame per request, strictly in request order per connection.
//!
//! ## Payloads
//!
//! A frame body decodes to a [`ChunkPayload`]: either a full grid or a
//! [`Delta`] against the last payload the server sent for the same
//! `(coordinate, LOD)` key on the same connection. An empty delta means
//! "nothing changed".
//!
//! ## Deletion sentinel
//!
//! Map-shaped deltas mark removed keys with [`Value::Nil`]. Grid payloads
//! carry only floats, so the sentinel is out of band by construction.

#![deny(unsafe_code)]

pub mod diff;
pub mod frame;
pub mod request;
pub mod value;

mod error;

pub use diff::{Delta, SeqEdit};
pub use error::ProtocolError;
pub use frame::{decode_frame, encode_frame, frame_boundary, FrameReader};
pub use request::{ChunkRequest, REQUEST_HEADER_SIZE};
pub use value::Value;

use ridgeline_core::Grid;
use serde::{Deserialize, Serialize};

/// One response frame's body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ChunkPayload {
    /// Full (possibly downsampled) grid.
    Full(Grid),
    /// Changes against the previous payload for the same session key.
    Delta(Delta),
}
