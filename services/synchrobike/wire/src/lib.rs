//! Byte codec, palette wire format and tagged packet envelope for synchrobike.
//!
//! This crate defines every byte that travels between synchrobike nodes. It
//! knows nothing about transports or LEDs: it turns palettes into raw byte
//! buffers and validates raw byte buffers back into palettes.
//!
//! ## Wire Formats
//!
//! ```text
//! Envelope (37 bytes)
//! +--------------+---------+---------------------------------------+
//! | magic "rgam" | type u8 | payload (32 bytes)                    |
//! +--------------+---------+---------------------------------------+
//!
//! ColorPalette payload (32 bytes)
//! +----------+-------------------------------+----------+
//! | count u8 | 7 x (location, R, G, B)       | 3 unused |
//! +----------+-------------------------------+----------+
//!
//! Flat palette (56 bytes)
//! +--------------------+-----------------------------------------+
//! | "palette\0"        | 16 x (R, G, B)                          |
//! +--------------------+-----------------------------------------+
//! ```
//!
//! All multi-byte fields are big-endian.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod error;
pub mod gradient;
pub mod math8;
pub mod message;
pub mod packet;
pub mod palette;

// Re-export main types
pub use codec::{get_u16, get_u32, get_u8, put_u16, put_u32, put_u8};
pub use error::WireError;
pub use gradient::{GradientPalette, GradientStop, MAX_GRADIENT_STOPS, MIN_GRADIENT_STOPS};
pub use message::{decode_message, encode_gradient, Message, WireFormat};
pub use packet::{decode_packet, encode_packet, PacketType, Payload, PACKET_MAGIC, PACKET_SIZE, PAYLOAD_SIZE};
pub use palette::{Blend, Palette16, PALETTE_ENTRIES, PALETTE_MESSAGE_SIZE, PALETTE_TAG};

/// Color type used throughout the wire format
pub use smart_leds::RGB8;
