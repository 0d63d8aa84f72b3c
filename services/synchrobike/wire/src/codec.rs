//! Big-endian field accessors over byte buffers.
//!
//! Every accessor takes an explicit offset and checks it against the buffer
//! length, so a short buffer surfaces as [`WireError::OutOfBounds`] instead of
//! a panic. `put_*` functions write the low-order bits of `value` and silently
//! drop anything that does not fit the field width.

use crate::WireError;

fn field(len: usize, offset: usize, width: usize) -> Result<std::ops::Range<usize>, WireError> {
    match offset.checked_add(width) {
        Some(end) if end <= len => Ok(offset..end),
        _ => Err(WireError::OutOfBounds { offset, width, len }),
    }
}

/// Read an 8-bit value
pub fn get_u8(buf: &[u8], offset: usize) -> Result<u8, WireError> {
    let range = field(buf.len(), offset, 1)?;
    Ok(buf[range.start])
}

/// Read a big-endian 16-bit value
pub fn get_u16(buf: &[u8], offset: usize) -> Result<u16, WireError> {
    let range = field(buf.len(), offset, 2)?;
    Ok(u16::from_be_bytes([buf[range.start], buf[range.start + 1]]))
}

/// Read a big-endian 32-bit value
pub fn get_u32(buf: &[u8], offset: usize) -> Result<u32, WireError> {
    let range = field(buf.len(), offset, 4)?;
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&buf[range]);
    Ok(u32::from_be_bytes(raw))
}

/// Write the low 8 bits of `value`
pub fn put_u8(buf: &mut [u8], offset: usize, value: u32) -> Result<(), WireError> {
    let range = field(buf.len(), offset, 1)?;
    buf[range.start] = (value & 0xFF) as u8;
    Ok(())
}

/// Write the low 16 bits of `value`, big-endian
pub fn put_u16(buf: &mut [u8], offset: usize, value: u32) -> Result<(), WireError> {
    let range = field(buf.len(), offset, 2)?;
    buf[range].copy_from_slice(&((value & 0xFFFF) as u16).to_be_bytes());
    Ok(())
}

/// Write `value`, big-endian
pub fn put_u32(buf: &mut [u8], offset: usize, value: u32) -> Result<(), WireError> {
    let range = field(buf.len(), offset, 4)?;
    buf[range].copy_from_slice(&value.to_be_bytes());
    Ok(())
}
