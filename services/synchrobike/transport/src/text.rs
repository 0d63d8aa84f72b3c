//! Text-safe transcoding of raw message buffers.
//!
//! Mesh payloads travel as text, so every raw buffer is base64 encoded on the
//! way out and decoded on the way in.

use crate::TransportError;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;

/// Encode a raw buffer as text
pub fn encode_text(raw: &[u8]) -> String {
    BASE64_STANDARD.encode(raw)
}

/// Decode text back into a raw buffer
pub fn decode_text(text: &str) -> Result<Vec<u8>, TransportError> {
    Ok(BASE64_STANDARD.decode(text.trim())?)
}
