//! 8-bit fixed point helpers for color math.

use smart_leds::RGB8;

/// Scale an 8-bit value by a factor (0-255 = 0.0-1.0)
#[inline]
pub fn scale8(value: u8, scale: u8) -> u8 {
    ((value as u16 * scale as u16) >> 8) as u8
}

/// Blend two 8-bit values
///
/// `amount_of_b` of 0 yields `a`, 255 yields (almost) `b`.
#[inline]
pub fn blend8(a: u8, b: u8, amount_of_b: u8) -> u8 {
    let a = i16::from(a);
    let b = i16::from(b);
    let amount = i16::from(amount_of_b);

    (a + (((b - a) * amount) >> 8)) as u8
}

/// Saturating add
#[inline]
pub fn qadd8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}

/// Scale every channel of a color
pub fn scale_rgb(color: RGB8, scale: u8) -> RGB8 {
    RGB8::new(
        scale8(color.r, scale),
        scale8(color.g, scale),
        scale8(color.b, scale),
    )
}

/// Blend two colors channel by channel
pub fn blend_rgb(a: RGB8, b: RGB8, amount_of_b: u8) -> RGB8 {
    RGB8::new(
        blend8(a.r, b.r, amount_of_b),
        blend8(a.g, b.g, amount_of_b),
        blend8(a.b, b.b, amount_of_b),
    )
}

/// Saturating add of two colors
pub fn add_rgb(a: RGB8, b: RGB8) -> RGB8 {
    RGB8::new(qadd8(a.r, b.r), qadd8(a.g, b.g), qadd8(a.b, b.b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale8() {
        assert_eq!(scale8(255, 255), 254);
        assert_eq!(scale8(200, 128), 100);
        assert_eq!(scale8(1, 254), 0);
        assert_eq!(scale8(77, 0), 0);
    }

    #[test]
    fn test_blend8_endpoints() {
        assert_eq!(blend8(10, 250, 0), 10);
        assert_eq!(blend8(0, 255, 128), 127);
        assert_eq!(blend8(255, 0, 128), 127);
    }

    #[test]
    fn test_add_rgb_saturates() {
        let sum = add_rgb(RGB8::new(200, 10, 0), RGB8::new(100, 10, 5));
        assert_eq!(sum, RGB8::new(255, 20, 5));
    }
}
