//! 16-entry color palettes and their flat wire format.
//!
//! ```text
//! +------------------------+-------------------------------+
//! | b"palette\0" (8 bytes) | 16 x (R, G, B) (48 bytes)     |
//! +------------------------+-------------------------------+
//! ```
//!
//! The entry count is fixed, so the format carries no length prefix. The tag
//! is compared over its full width including the terminator, which keeps
//! payloads that merely start with `palette` from being accepted.

use crate::codec::get_u8;
use crate::math8::{blend_rgb, scale_rgb};
use crate::WireError;
use bytes::{BufMut, Bytes, BytesMut};
use smart_leds::RGB8;

/// Tag identifying a flat palette message
pub const PALETTE_TAG: &[u8; 8] = b"palette\0";

/// Number of entries in a palette
pub const PALETTE_ENTRIES: usize = 16;

/// Size of the palette body in bytes
pub const PALETTE_BODY_SIZE: usize = PALETTE_ENTRIES * 3;

/// Total size of a flat palette message
pub const PALETTE_MESSAGE_SIZE: usize = PALETTE_TAG.len() + PALETTE_BODY_SIZE;

/// Interpolation mode for palette lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blend {
    /// Snap to the nearest lower entry
    None,
    /// Blend linearly toward the next entry
    Linear,
}

/// Gradient lookup table of 16 colors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette16 {
    entries: [RGB8; PALETTE_ENTRIES],
}

impl Palette16 {
    /// Create a palette from its entries
    pub const fn new(entries: [RGB8; PALETTE_ENTRIES]) -> Self {
        Self { entries }
    }

    /// Palette with every entry set to one color
    pub const fn solid(color: RGB8) -> Self {
        Self {
            entries: [color; PALETTE_ENTRIES],
        }
    }

    /// Palette entries in order
    pub fn entries(&self) -> &[RGB8; PALETTE_ENTRIES] {
        &self.entries
    }

    /// Look up a color by 8-bit index.
    ///
    /// The high nibble selects the entry; with [`Blend::Linear`] the low
    /// nibble blends toward the following entry, wrapping after the last one.
    pub fn color_at(&self, index: u8, brightness: u8, blend: Blend) -> RGB8 {
        let hi = (index >> 4) as usize;
        let lo = index & 0x0F;

        let mut color = self.entries[hi];
        if blend == Blend::Linear && lo != 0 {
            let next = self.entries[(hi + 1) % PALETTE_ENTRIES];
            color = blend_rgb(color, next, lo << 4);
        }

        if brightness == 255 {
            color
        } else {
            scale_rgb(color, brightness)
        }
    }

    /// Encode to the flat wire format
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(PALETTE_MESSAGE_SIZE);
        buf.put_slice(PALETTE_TAG);
        for entry in &self.entries {
            buf.put_u8(entry.r);
            buf.put_u8(entry.g);
            buf.put_u8(entry.b);
        }
        buf.freeze()
    }

    /// Decode from the flat wire format.
    ///
    /// Trailing bytes after the palette body are ignored.
    pub fn decode(buf: &[u8]) -> Result<Self, WireError> {
        let compared = buf.len().min(PALETTE_TAG.len());
        if buf[..compared] != PALETTE_TAG[..compared] {
            return Err(WireError::NotAPaletteMessage);
        }

        if buf.len() < PALETTE_MESSAGE_SIZE {
            return Err(WireError::BufferTooShort {
                need: PALETTE_MESSAGE_SIZE,
                got: buf.len(),
            });
        }

        let mut entries = [RGB8::default(); PALETTE_ENTRIES];
        for (i, entry) in entries.iter_mut().enumerate() {
            let offset = PALETTE_TAG.len() + i * 3;
            *entry = RGB8::new(
                get_u8(buf, offset)?,
                get_u8(buf, offset + 1)?,
                get_u8(buf, offset + 2)?,
            );
        }

        Ok(Self { entries })
    }
}

impl Default for Palette16 {
    fn default() -> Self {
        Self::solid(RGB8::default())
    }
}
