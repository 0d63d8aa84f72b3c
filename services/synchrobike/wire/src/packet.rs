//! Tagged packet envelope.
//!
//! ```text
//! 0..4   magic  "rgam" (0x7267616D)
//! 4      type   PacketType
//! 5..37  data   type-specific payload (32 bytes)
//! ```
//!
//! Color palette payload layout:
//!
//! ```text
//! 0      color_count (2..=7)
//! 1..29  7 x (location, R, G, B)
//! 29..32 unused
//! ```
//!
//! Decoding validates in a fixed order: magic, size, type code, then the
//! type-specific payload. Each stage fails with its own [`WireError`] variant
//! so callers can drop junk silently while still reporting recognized but
//! broken packets.

use crate::codec::{get_u32, get_u8};
use crate::gradient::{GradientPalette, GradientStop, MAX_GRADIENT_STOPS, MIN_GRADIENT_STOPS};
use crate::WireError;
use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

/// Envelope magic ("rgam")
pub const PACKET_MAGIC: u32 = 0x7267_616D;

/// Total envelope size in bytes
pub const PACKET_SIZE: usize = 37;

/// Payload region size in bytes
pub const PAYLOAD_SIZE: usize = 32;

const TYPE_OFFSET: usize = 4;
const PAYLOAD_OFFSET: usize = 5;
const STOP_SIZE: usize = 4;

/// Packet types carried in the envelope.
///
/// Values are part of the wire format: append only, never reorder.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PacketType {
    /// Reserved, carries no payload
    Unknown = 0,
    /// Payload is a color palette
    ColorPalette = 1,
}

impl TryFrom<u8> for PacketType {
    type Error = WireError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PacketType::Unknown),
            1 => Ok(PacketType::ColorPalette),
            _ => Err(WireError::UnknownPacketType(value)),
        }
    }
}

/// Decoded envelope payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    /// Gradient color palette
    ColorPalette(GradientPalette),
}

impl Payload {
    /// Packet type code for this payload
    pub fn packet_type(&self) -> PacketType {
        match self {
            Payload::ColorPalette(_) => PacketType::ColorPalette,
        }
    }

    fn encode_data(&self, buf: &mut BytesMut) {
        match self {
            Payload::ColorPalette(gradient) => {
                buf.put_u8(gradient.len() as u8);
                for stop in gradient.stops() {
                    buf.put_u32(stop.pack());
                }
                let unused_stops = MAX_GRADIENT_STOPS - gradient.len();
                buf.put_bytes(0, unused_stops * STOP_SIZE);
                buf.put_bytes(0, PAYLOAD_SIZE - 1 - MAX_GRADIENT_STOPS * STOP_SIZE);
            }
        }
    }
}

/// Encode a payload into a complete 37-byte envelope
pub fn encode_packet(payload: &Payload) -> Bytes {
    let mut buf = BytesMut::with_capacity(PACKET_SIZE);
    buf.put_u32(PACKET_MAGIC);
    buf.put_u8(payload.packet_type() as u8);
    payload.encode_data(&mut buf);
    debug_assert_eq!(buf.len(), PACKET_SIZE);
    buf.freeze()
}

/// Decode an envelope into its type and payload
pub fn decode_packet(buf: &[u8]) -> Result<(PacketType, Payload), WireError> {
    let magic = get_u32(buf, 0).map_err(|_| WireError::JunkData)?;
    if magic != PACKET_MAGIC {
        return Err(WireError::JunkData);
    }

    if buf.len() != PACKET_SIZE {
        return Err(WireError::MalformedPacket { len: buf.len() });
    }

    let packet_type = PacketType::try_from(get_u8(buf, TYPE_OFFSET)?)?;
    let data = &buf[PAYLOAD_OFFSET..];

    let payload = match packet_type {
        PacketType::ColorPalette => Payload::ColorPalette(decode_color_palette(data)?),
        PacketType::Unknown => return Err(WireError::UnknownPacketType(packet_type as u8)),
    };

    Ok((packet_type, payload))
}

fn decode_color_palette(data: &[u8]) -> Result<GradientPalette, WireError> {
    let count = get_u8(data, 0)?;
    if (count as usize) < MIN_GRADIENT_STOPS {
        return Err(WireError::PaletteTooFewColors(count));
    }
    if (count as usize) > MAX_GRADIENT_STOPS {
        return Err(WireError::PaletteTooManyColors(count));
    }

    let mut stops = [GradientStop::default(); MAX_GRADIENT_STOPS];
    for (i, stop) in stops.iter_mut().take(count as usize).enumerate() {
        *stop = GradientStop::unpack(get_u32(data, 1 + i * STOP_SIZE)?);
    }

    GradientPalette::new(&stops[..count as usize])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{put_u32, put_u8};
    use smart_leds::RGB8;

    fn three_stop() -> GradientPalette {
        GradientPalette::new(&[
            GradientStop::new(0, 255, 0, 0),
            GradientStop::new(128, 0, 255, 0),
            GradientStop::new(255, 0, 0, 1),
        ])
        .unwrap()
    }

    fn raw_packet(packet_type: u8, count: u8) -> [u8; PACKET_SIZE] {
        let mut buf = [0u8; PACKET_SIZE];
        put_u32(&mut buf, 0, PACKET_MAGIC).unwrap();
        put_u8(&mut buf, TYPE_OFFSET, packet_type as u32).unwrap();
        put_u8(&mut buf, PAYLOAD_OFFSET, count as u32).unwrap();
        buf
    }

    #[test]
    fn test_packet_type_conversion() {
        assert_eq!(PacketType::try_from(0).unwrap(), PacketType::Unknown);
        assert_eq!(PacketType::try_from(1).unwrap(), PacketType::ColorPalette);
        assert_eq!(
            PacketType::try_from(0xFF),
            Err(WireError::UnknownPacketType(0xFF))
        );
    }

    #[test]
    fn test_encode_layout() {
        let bytes = encode_packet(&Payload::ColorPalette(three_stop()));
        assert_eq!(bytes.len(), PACKET_SIZE);
        assert_eq!(&bytes[..4], b"rgam");
        assert_eq!(bytes[4], PacketType::ColorPalette as u8);
        assert_eq!(bytes[5], 3);
        assert_eq!(&bytes[6..10], &[0, 255, 0, 0]);
        assert_eq!(&bytes[14..18], &[255, 0, 0, 1]);
        // Unused stop slots and padding are zero
        assert!(bytes[18..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_three_color_palette() {
        let bytes = encode_packet(&Payload::ColorPalette(three_stop()));
        let (packet_type, payload) = decode_packet(&bytes).unwrap();
        assert_eq!(packet_type, PacketType::ColorPalette);

        let Payload::ColorPalette(gradient) = payload;
        assert_eq!(gradient.len(), 3);
        assert_eq!(gradient.stops()[0], GradientStop::new(0, 255, 0, 0));
        assert_eq!(gradient.stops()[1].color, RGB8::new(0, 255, 0));
        assert_eq!(gradient.stops()[2], GradientStop::new(255, 0, 0, 1));
    }

    #[test]
    fn test_encode_is_deterministic() {
        let payload = Payload::ColorPalette(three_stop());
        assert_eq!(encode_packet(&payload), encode_packet(&payload));
    }

    #[test]
    fn test_junk_data() {
        assert_eq!(decode_packet(&[]), Err(WireError::JunkData));
        assert_eq!(decode_packet(b"rga"), Err(WireError::JunkData));
        assert_eq!(decode_packet(b"palette\0"), Err(WireError::JunkData));

        let mut bytes = raw_packet(1, 3);
        bytes[3] = b'M';
        assert_eq!(decode_packet(&bytes), Err(WireError::JunkData));
    }

    #[test]
    fn test_malformed_size() {
        let bytes = encode_packet(&Payload::ColorPalette(three_stop()));
        assert_eq!(
            decode_packet(&bytes[..20]),
            Err(WireError::MalformedPacket { len: 20 })
        );

        let mut long = bytes.to_vec();
        long.push(0);
        assert_eq!(
            decode_packet(&long),
            Err(WireError::MalformedPacket { len: 38 })
        );
    }

    #[test]
    fn test_unknown_packet_type() {
        assert_eq!(
            decode_packet(&raw_packet(255, 3)),
            Err(WireError::UnknownPacketType(255))
        );
        assert_eq!(
            decode_packet(&raw_packet(0, 3)),
            Err(WireError::UnknownPacketType(0))
        );
    }

    #[test]
    fn test_color_count_bounds() {
        assert_eq!(
            decode_packet(&raw_packet(1, 1)),
            Err(WireError::PaletteTooFewColors(1))
        );
        assert_eq!(
            decode_packet(&raw_packet(1, 0)),
            Err(WireError::PaletteTooFewColors(0))
        );
        assert_eq!(
            decode_packet(&raw_packet(1, 8)),
            Err(WireError::PaletteTooManyColors(8))
        );
        assert!(decode_packet(&raw_packet(1, 2)).is_ok());
        assert!(decode_packet(&raw_packet(1, 7)).is_ok());
    }

    #[test]
    fn test_validation_order() {
        // Type is checked before the count
        assert_eq!(
            decode_packet(&raw_packet(9, 1)),
            Err(WireError::UnknownPacketType(9))
        );
    }

    #[test]
    fn test_full_palette() {
        let stops: Vec<GradientStop> = (0..7)
            .map(|i| GradientStop::new(i * 40, i, 2 * i, 3 * i))
            .collect();
        let gradient = GradientPalette::new(&stops).unwrap();

        let bytes = encode_packet(&Payload::ColorPalette(gradient));
        let (_, Payload::ColorPalette(decoded)) = decode_packet(&bytes).unwrap();
        assert_eq!(decoded.stops(), &stops[..]);
    }
}
