//! # Request Header
//!
//! Fixed 10-byte client request, big-endian integers:
//!
//! ```text
//! ┌────────┬──────────────┬──────────────┬──────────┐
//! │ full   │ cx (i32 BE)  │ cy (i32 BE)  │ lod byte │
//! │ 1 byte │ 4 bytes      │ 4 bytes      │ 1 byte   │
//! └────────┴──────────────┴──────────────┴──────────┘
//! ```
//!
//! `full != 0` forces a full payload; `0` allows an incremental delta when
//! the server remembers a previous payload for the key. LOD byte 0 is
//! rejected here (its stride is undefined), so the sampler downstream only
//! ever sees usable levels.

use ridgeline_core::{ChunkCoord, LodLevel};

use crate::error::ProtocolError;

/// Fixed request header size; the wire contract, not meant to vary.
pub const REQUEST_HEADER_SIZE: usize = 10;

/// One decoded chunk request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkRequest {
    /// Force a full payload even when a session entry exists.
    pub full: bool,
    /// Requested chunk.
    pub coord: ChunkCoord,
    /// Requested level of detail.
    pub lod: LodLevel,
}

impl ChunkRequest {
    /// Decodes the fixed 10-byte header.
    ///
    /// # Errors
    ///
    /// [`ProtocolError::InvalidLod`] when the LOD byte is 0.
    pub fn decode(header: &[u8; REQUEST_HEADER_SIZE]) -> Result<Self, ProtocolError> {
        let lod_byte = header[9];
        if lod_byte == 0 {
            return Err(ProtocolError::InvalidLod { lod_byte });
        }
        let cx = i32::from_be_bytes([header[1], header[2], header[3], header[4]]);
        let cy = i32::from_be_bytes([header[5], header[6], header[7], header[8]]);
        Ok(Self {
            full: header[0] != 0,
            coord: ChunkCoord::new(cx, cy),
            lod: LodLevel::from_byte(lod_byte),
        })
    }

    /// Encodes the fixed 10-byte header (the client side of the codec).
    #[must_use]
    pub fn encode(&self) -> [u8; REQUEST_HEADER_SIZE] {
        let mut out = [0u8; REQUEST_HEADER_SIZE];
        out[0] = u8::from(self.full);
        out[1..5].copy_from_slice(&self.coord.x.to_be_bytes());
        out[5..9].copy_from_slice(&self.coord.y.to_be_bytes());
        out[9] = self.lod.byte();
        out
    }
}
