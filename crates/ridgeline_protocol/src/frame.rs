//! # Frame Codec
//!
//! One wire message is a frame: a 4-byte big-endian length prefix followed
//! by exactly that many bytes of zlib-compressed bincode.
//!
//! ```text
//! ┌──────────────┬──────────────────────────────┐
//! │ len (u32 BE) │ zlib(bincode(payload))       │
//! └──────────────┴──────────────────────────────┘
//! ```
//!
//! The compression level trades CPU for bandwidth (1 fastest, 9 tightest,
//! 6 the default); both ends decode identically regardless of level.
//!
//! [`frame_boundary`] is the receive-side half: given an accumulating
//! buffer it reports where the first complete frame ends, or that more
//! bytes are needed. [`FrameReader`] wraps it into a stream splitter.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ProtocolError;

/// Length prefix size in bytes.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Serializes, compresses and length-prefixes a payload.
///
/// # Errors
///
/// Serialization or compression failure, or a compressed body too large
/// for the u32 prefix.
pub fn encode_frame<T: Serialize>(payload: &T, level: u32) -> Result<Vec<u8>, ProtocolError> {
    let packed = bincode::serialize(payload)?;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(level));
    encoder.write_all(&packed).map_err(ProtocolError::Deflate)?;
    let compressed = encoder.finish().map_err(ProtocolError::Deflate)?;

    let len = u32::try_from(compressed.len()).map_err(|_| ProtocolError::Oversize {
        len: compressed.len(),
    })?;

    let mut frame = Vec::with_capacity(LENGTH_PREFIX_SIZE + compressed.len());
    frame.extend_from_slice(&len.to_be_bytes());
    frame.extend_from_slice(&compressed);
    Ok(frame)
}

/// Offset immediately past the first complete frame in `buffer`, or `None`
/// when the buffer does not yet hold one (shorter than the prefix, or the
/// declared body is not fully present).
#[must_use]
pub fn frame_boundary(buffer: &[u8]) -> Option<usize> {
    if buffer.len() < LENGTH_PREFIX_SIZE {
        return None;
    }
    let declared = u32::from_be_bytes([buffer[0], buffer[1], buffer[2], buffer[3]]) as usize;
    let total = LENGTH_PREFIX_SIZE + declared;
    (buffer.len() >= total).then_some(total)
}

/// Decodes one complete frame back into its payload.
///
/// `frame` must be exactly one frame, prefix included.
///
/// # Errors
///
/// [`ProtocolError::TruncatedFrame`] or [`ProtocolError::LengthMismatch`]
/// when the prefix disagrees with the body, and the corrupt-frame variants
/// when inflation or deserialization fails.
pub fn decode_frame<T: DeserializeOwned>(frame: &[u8]) -> Result<T, ProtocolError> {
    if frame.len() < LENGTH_PREFIX_SIZE {
        return Err(ProtocolError::TruncatedFrame { got: frame.len() });
    }
    let declared = u32::from_be_bytes([frame[0], frame[1], frame[2], frame[3]]) as usize;
    let body = &frame[LENGTH_PREFIX_SIZE..];
    if body.len() != declared {
        return Err(ProtocolError::LengthMismatch {
            declared,
            actual: body.len(),
        });
    }

    let mut packed = Vec::new();
    ZlibDecoder::new(body)
        .read_to_end(&mut packed)
        .map_err(ProtocolError::Inflate)?;
    Ok(bincode::deserialize(&packed)?)
}

/// Accumulating stream splitter: push raw bytes in, pull complete frames
/// out. This is what a client runs over its TCP receive buffer.
#[derive(Default)]
pub struct FrameReader {
    buffer: Vec<u8>,
}

impl FrameReader {
    /// Creates an empty reader.
    #[must_use]
    pub const fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Appends raw bytes from the stream.
    pub fn push(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Pops the next complete frame (prefix included), or `None` when the
    /// buffer does not hold one yet.
    pub fn next_frame(&mut self) -> Option<Vec<u8>> {
        let end = frame_boundary(&self.buffer)?;
        Some(self.buffer.drain(..end).collect())
    }

    /// Bytes currently buffered.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::Delta;
    use crate::value::Value;
    use crate::ChunkPayload;
    use ridgeline_core::Grid;

    #[test]
    fn test_roundtrip_full_grid() {
        let payload = ChunkPayload::Full(Grid::from_fn(16, |x, y| (x * y) as f32));
        let frame = encode_frame(&payload, 6).unwrap();
        let back: ChunkPayload = decode_frame(&frame).unwrap();
        assert_eq!(back, payload);
    }

    #[test]
    fn test_roundtrip_survives_every_level() {
        let payload = ChunkPayload::Delta(Delta::Replace(Value::Str("ridge".into())));
        for level in 1..=9 {
            let frame = encode_frame(&payload, level).unwrap();
            let back: ChunkPayload = decode_frame(&frame).unwrap();
            assert_eq!(back, payload);
        }
    }

    #[test]
    fn test_compression_earns_its_keep_on_flat_terrain() {
        let payload = ChunkPayload::Full(Grid::zero(128));
        let frame = encode_frame(&payload, 6).unwrap();
        // 128*128 f32 cells is 64KiB raw; flat terrain deflates hard.
        assert!(frame.len() < 1024, "flat grid frame was {} bytes", frame.len());
    }

    #[test]
    fn test_boundary_incomplete_under_prefix_size() {
        assert_eq!(frame_boundary(&[]), None);
        assert_eq!(frame_boundary(&[0]), None);
        assert_eq!(frame_boundary(&[0, 0, 0]), None);
    }

    #[test]
    fn test_boundary_incomplete_while_body_missing() {
        // Declares 5 body bytes, has 2.
        let buf = [0, 0, 0, 5, 1, 2];
        assert_eq!(frame_boundary(&buf), None);
    }

    #[test]
    fn test_boundary_exact_offset_with_trailing_bytes() {
        let mut buf = encode_frame(&Value::Int(42), 6).unwrap();
        let frame_len = buf.len();
        buf.extend_from_slice(&[9, 9, 9]); // start of the next frame
        assert_eq!(frame_boundary(&buf), Some(frame_len));
    }

    #[test]
    fn test_decode_rejects_length_mismatch() {
        let mut frame = encode_frame(&Value::Int(1), 6).unwrap();
        frame.push(0); // extra trailing byte
        assert!(matches!(
            decode_frame::<Value>(&frame),
            Err(ProtocolError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_decode_rejects_garbage_body() {
        let body = [0xde, 0xad, 0xbe, 0xef];
        let mut frame = Vec::new();
        frame.extend_from_slice(&(body.len() as u32).to_be_bytes());
        frame.extend_from_slice(&body);
        assert!(decode_frame::<Value>(&frame).is_err());
    }

    #[test]
    fn test_decode_rejects_truncated_prefix() {
        assert!(matches!(
            decode_frame::<Value>(&[0, 0]),
            Err(ProtocolError::TruncatedFrame { got: 2 })
        ));
    }

    #[test]
    fn test_frame_reader_reassembles_fragments() {
        let a = encode_frame(&Value::Int(1), 6).unwrap();
        let b = encode_frame(&Value::Int(2), 6).unwrap();
        let mut stream = Vec::new();
        stream.extend_from_slice(&a);
        stream.extend_from_slice(&b);

        let mut reader = FrameReader::new();
        // Feed one byte at a time - worst-case TCP fragmentation.
        for &byte in &stream {
            reader.push(&[byte]);
        }

        let first = reader.next_frame().unwrap();
        assert_eq!(decode_frame::<Value>(&first).unwrap(), Value::Int(1));
        let second = reader.next_frame().unwrap();
        assert_eq!(decode_frame::<Value>(&second).unwrap(), Value::Int(2));
        assert_eq!(reader.next_frame(), None);
        assert_eq!(reader.buffered(), 0);
    }
}
