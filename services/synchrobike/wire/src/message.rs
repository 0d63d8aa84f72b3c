//! Dispatch of received buffers across the known message formats.
//!
//! The envelope magic and the flat palette tag never overlap, so both
//! formats can share one mesh channel. A buffer is offered to the envelope
//! decoder first; only junk (magic mismatch) falls through to the flat
//! palette decoder.

use crate::gradient::GradientPalette;
use crate::packet::{decode_packet, encode_packet, Payload};
use crate::palette::Palette16;
use crate::WireError;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Format used when originating palette broadcasts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireFormat {
    /// Tagged envelope carrying gradient stops (37 bytes)
    #[default]
    Envelope,
    /// Flat tagged 16-entry palette (56 bytes)
    Flat,
}

impl std::str::FromStr for WireFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "envelope" => Ok(WireFormat::Envelope),
            "flat" => Ok(WireFormat::Flat),
            other => Err(format!("unknown wire format: {}", other)),
        }
    }
}

/// A recognized palette message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    /// Envelope color palette payload
    Gradient(GradientPalette),
    /// Flat 16-entry palette
    Palette(Palette16),
}

impl Message {
    /// The 16-entry palette this message resolves to
    pub fn palette(&self) -> Palette16 {
        match self {
            Message::Gradient(gradient) => gradient.to_palette16(),
            Message::Palette(palette) => *palette,
        }
    }
}

/// Encode a gradient palette in the given format
pub fn encode_gradient(gradient: &GradientPalette, format: WireFormat) -> Bytes {
    match format {
        WireFormat::Envelope => encode_packet(&Payload::ColorPalette(*gradient)),
        WireFormat::Flat => gradient.to_palette16().encode(),
    }
}

/// Decode a buffer as any known message format
pub fn decode_message(buf: &[u8]) -> Result<Message, WireError> {
    match decode_packet(buf) {
        Ok((_, Payload::ColorPalette(gradient))) => Ok(Message::Gradient(gradient)),
        Err(WireError::JunkData) => {
            trace!("{} byte buffer is not an envelope, trying flat palette", buf.len());
            Palette16::decode(buf).map(Message::Palette)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gradient::GradientStop;
    use smart_leds::RGB8;

    fn gradient() -> GradientPalette {
        GradientPalette::new(&[
            GradientStop::new(0, 255, 0, 0),
            GradientStop::new(255, 0, 0, 255),
        ])
        .unwrap()
    }

    #[test]
    fn test_dispatch_envelope() {
        let bytes = encode_gradient(&gradient(), WireFormat::Envelope);
        assert_eq!(decode_message(&bytes).unwrap(), Message::Gradient(gradient()));
    }

    #[test]
    fn test_dispatch_flat() {
        let bytes = encode_gradient(&gradient(), WireFormat::Flat);
        let message = decode_message(&bytes).unwrap();
        assert_eq!(message, Message::Palette(gradient().to_palette16()));
    }

    #[test]
    fn test_both_formats_resolve_to_same_palette() {
        let envelope = decode_message(&encode_gradient(&gradient(), WireFormat::Envelope)).unwrap();
        let flat = decode_message(&encode_gradient(&gradient(), WireFormat::Flat)).unwrap();
        assert_eq!(envelope.palette(), flat.palette());
        assert_eq!(flat.palette().entries()[0], RGB8::new(255, 0, 0));
    }

    #[test]
    fn test_foreign_buffer() {
        let err = decode_message(b"hello from another app").unwrap_err();
        assert_eq!(err, WireError::NotAPaletteMessage);
        assert!(err.is_foreign());
    }

    #[test]
    fn test_recognized_errors_pass_through() {
        let mut bytes = encode_gradient(&gradient(), WireFormat::Envelope).to_vec();
        bytes[4] = 42;
        assert_eq!(decode_message(&bytes), Err(WireError::UnknownPacketType(42)));

        let flat = encode_gradient(&gradient(), WireFormat::Flat);
        assert_eq!(
            decode_message(&flat[..30]),
            Err(WireError::BufferTooShort { need: 56, got: 30 })
        );
    }

    #[test]
    fn test_wire_format_parse() {
        assert_eq!("envelope".parse::<WireFormat>().unwrap(), WireFormat::Envelope);
        assert_eq!("FLAT".parse::<WireFormat>().unwrap(), WireFormat::Flat);
        assert!("json".parse::<WireFormat>().is_err());
    }
}
