//! # Protocol Errors
//!
//! Everything that can go wrong while decoding requests or frames. These
//! are connection-scoped: the handler closes the offending connection and
//! nothing crosses to other clients.

use thiserror::Error;

/// Errors produced by the request and frame codecs.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// The LOD byte derives no usable sampling stride (byte 0).
    #[error("invalid request: lod byte {lod_byte} derives no usable stride")]
    InvalidLod {
        /// The offending wire byte.
        lod_byte: u8,
    },

    /// A frame's declared length disagrees with its actual body.
    #[error("corrupt frame: length prefix declares {declared} bytes, body has {actual}")]
    LengthMismatch {
        /// Length the 4-byte prefix declares.
        declared: usize,
        /// Bytes actually present after the prefix.
        actual: usize,
    },

    /// A frame shorter than its own length prefix.
    #[error("corrupt frame: {got} bytes cannot hold a length prefix")]
    TruncatedFrame {
        /// Bytes actually available.
        got: usize,
    },

    /// The compressed body failed to inflate.
    #[error("corrupt frame: inflate failed: {0}")]
    Inflate(#[source] std::io::Error),

    /// The payload failed to compress (encode side).
    #[error("deflate failed: {0}")]
    Deflate(#[source] std::io::Error),

    /// The payload would not fit a 4-byte length prefix.
    #[error("frame body of {len} bytes exceeds the u32 length prefix")]
    Oversize {
        /// Compressed body length.
        len: usize,
    },

    /// Payload (de)serialization failed.
    #[error("corrupt frame: payload codec: {0}")]
    Codec(#[from] bincode::Error),
}
