//! Wire protocol error types.

use thiserror::Error;

/// Wire protocol errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireError {
    /// Field access past the end of the buffer
    #[error("field of {width} bytes at offset {offset} exceeds buffer of {len} bytes")]
    OutOfBounds {
        /// Offset of the first byte of the field
        offset: usize,
        /// Width of the field in bytes
        width: usize,
        /// Length of the buffer
        len: usize,
    },

    /// Leading tag is not the flat palette tag
    #[error("not a palette message")]
    NotAPaletteMessage,

    /// Tag matched but the buffer cannot hold the palette body
    #[error("buffer too short: need {need} bytes, got {got}")]
    BufferTooShort {
        /// Required length
        need: usize,
        /// Actual length
        got: usize,
    },

    /// Leading magic is not the envelope magic
    #[error("junk data")]
    JunkData,

    /// Envelope magic matched but the type code is not handled
    #[error("unknown packet type {0}")]
    UnknownPacketType(u8),

    /// Envelope magic matched but the packet has the wrong size
    #[error("malformed packet of {len} bytes")]
    MalformedPacket {
        /// Actual length
        len: usize,
    },

    /// Color palette declares fewer than the minimum number of colors
    #[error("palette has too few colors: {0}")]
    PaletteTooFewColors(u8),

    /// Color palette declares more than the maximum number of colors
    #[error("palette has too many colors: {0}")]
    PaletteTooManyColors(u8),
}

impl WireError {
    /// True when the buffer was never meant for us (tag mismatch).
    ///
    /// Foreign buffers are dropped without further reporting; every other
    /// variant describes a recognized but unusable message.
    pub fn is_foreign(&self) -> bool {
        matches!(self, WireError::JunkData | WireError::NotAPaletteMessage)
    }
}
