//! Compact gradient palettes carried inside the packet envelope.

use crate::palette::{Palette16, PALETTE_ENTRIES};
use crate::WireError;
use smart_leds::RGB8;

/// Minimum number of gradient stops
pub const MIN_GRADIENT_STOPS: usize = 2;

/// Maximum number of gradient stops
pub const MAX_GRADIENT_STOPS: usize = 7;

/// One gradient stop: a location on the 0..=255 axis and its color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GradientStop {
    /// Position along the gradient (0 = start, 255 = end)
    pub location: u8,
    /// Color at this position
    pub color: RGB8,
}

impl GradientStop {
    /// Create a new gradient stop
    pub const fn new(location: u8, r: u8, g: u8, b: u8) -> Self {
        Self {
            location,
            color: RGB8 { r, g, b },
        }
    }

    /// Pack as `location, R, G, B` into a big-endian word
    pub fn pack(self) -> u32 {
        ((self.location as u32) << 24)
            | ((self.color.r as u32) << 16)
            | ((self.color.g as u32) << 8)
            | (self.color.b as u32)
    }

    /// Unpack from a big-endian `location, R, G, B` word
    pub fn unpack(value: u32) -> Self {
        Self::new(
            (value >> 24) as u8,
            (value >> 16) as u8,
            (value >> 8) as u8,
            value as u8,
        )
    }
}

/// Palette defined by 2 to 7 gradient stops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradientPalette {
    stops: [GradientStop; MAX_GRADIENT_STOPS],
    len: u8,
}

impl GradientPalette {
    /// Create a gradient palette, validating the stop count
    pub fn new(stops: &[GradientStop]) -> Result<Self, WireError> {
        if stops.len() < MIN_GRADIENT_STOPS {
            return Err(WireError::PaletteTooFewColors(stops.len() as u8));
        }
        if stops.len() > MAX_GRADIENT_STOPS {
            return Err(WireError::PaletteTooManyColors(
                stops.len().min(u8::MAX as usize) as u8,
            ));
        }

        let mut slots = [GradientStop::default(); MAX_GRADIENT_STOPS];
        slots[..stops.len()].copy_from_slice(stops);

        Ok(Self {
            stops: slots,
            len: stops.len() as u8,
        })
    }

    /// Gradient stops in order
    pub fn stops(&self) -> &[GradientStop] {
        &self.stops[..self.len as usize]
    }

    /// Number of gradient stops
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Always false; a gradient has at least two stops
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Sample the gradient at a location.
    ///
    /// Locations before the first stop or after the last stop take the
    /// color of that stop. Stops are expected in ascending location order;
    /// the first segment that contains `location` wins.
    pub fn sample(&self, location: u8) -> RGB8 {
        let stops = self.stops();
        let first = stops[0];
        let last = stops[stops.len() - 1];

        if location <= first.location {
            return first.color;
        }
        if location >= last.location {
            return last.color;
        }

        for pair in stops.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            if from.location <= location && location <= to.location {
                if location == to.location || from.location == to.location {
                    return to.color;
                }
                let num = (location - from.location) as i32;
                let den = (to.location - from.location) as i32;
                return RGB8::new(
                    lerp8(from.color.r, to.color.r, num, den),
                    lerp8(from.color.g, to.color.g, num, den),
                    lerp8(from.color.b, to.color.b, num, den),
                );
            }
        }

        last.color
    }

    /// Expand into a 16-entry palette.
    ///
    /// Entry `i` samples the gradient at location `i * 17`, so the first and
    /// last entries land exactly on 0 and 255.
    pub fn to_palette16(&self) -> Palette16 {
        let mut entries = [RGB8::default(); PALETTE_ENTRIES];
        for (i, entry) in entries.iter_mut().enumerate() {
            *entry = self.sample((i * 17) as u8);
        }
        Palette16::new(entries)
    }
}

fn lerp8(a: u8, b: u8, num: i32, den: i32) -> u8 {
    let a = a as i32;
    let b = b as i32;
    (a + (b - a) * num / den) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_count_validation() {
        let stop = GradientStop::new(0, 1, 2, 3);
        assert_eq!(
            GradientPalette::new(&[stop]),
            Err(WireError::PaletteTooFewColors(1))
        );
        assert_eq!(
            GradientPalette::new(&[stop; 8]),
            Err(WireError::PaletteTooManyColors(8))
        );
        assert_eq!(GradientPalette::new(&[stop; 2]).unwrap().len(), 2);
        assert_eq!(GradientPalette::new(&[stop; 7]).unwrap().len(), 7);
    }

    #[test]
    fn test_pack_unpack() {
        let stop = GradientStop::new(255, 0, 0, 1);
        assert_eq!(stop.pack(), 0xFF00_0001);
        assert_eq!(GradientStop::unpack(0xFF00_0001), stop);
    }

    #[test]
    fn test_sample_hits_stops() {
        let gradient = GradientPalette::new(&[
            GradientStop::new(0, 255, 0, 0),
            GradientStop::new(128, 0, 255, 0),
            GradientStop::new(255, 0, 0, 255),
        ])
        .unwrap();

        assert_eq!(gradient.sample(0), RGB8::new(255, 0, 0));
        assert_eq!(gradient.sample(128), RGB8::new(0, 255, 0));
        assert_eq!(gradient.sample(255), RGB8::new(0, 0, 255));
        assert_eq!(gradient.sample(64), RGB8::new(128, 127, 0));
    }

    #[test]
    fn test_sample_clamps_outside_stops() {
        let gradient = GradientPalette::new(&[
            GradientStop::new(64, 10, 20, 30),
            GradientStop::new(192, 40, 50, 60),
        ])
        .unwrap();

        assert_eq!(gradient.sample(0), RGB8::new(10, 20, 30));
        assert_eq!(gradient.sample(255), RGB8::new(40, 50, 60));
    }

    #[test]
    fn test_to_palette16() {
        let gradient = GradientPalette::new(&[
            GradientStop::new(0, 255, 0, 0),
            GradientStop::new(255, 0, 0, 255),
        ])
        .unwrap();

        let palette = gradient.to_palette16();
        assert_eq!(palette.entries()[0], RGB8::new(255, 0, 0));
        assert_eq!(palette.entries()[8], RGB8::new(119, 0, 136));
        assert_eq!(palette.entries()[15], RGB8::new(0, 0, 255));
    }
}
