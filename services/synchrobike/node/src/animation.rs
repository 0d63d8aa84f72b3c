//! Confetti animation and LED output.
//!
//! Each frame every pixel fades a little toward black; on the sparkle
//! interval one random pixel gains a random color from the active palette.

use crate::timer::Every;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::io;
use std::time::{Duration, Instant};
use synchro_wire::math8::{add_rgb, scale_rgb};
use synchro_wire::{Blend, Palette16, RGB8};

/// Default fade amount per frame (out of 255)
pub const DEFAULT_FADE: u8 = 1;

/// Addressable LED strip
pub trait LedStrip {
    /// Current pixel buffer
    fn pixels(&self) -> &[RGB8];

    /// Mutable pixel buffer
    fn pixels_mut(&mut self) -> &mut [RGB8];

    /// Push the pixel buffer to the LEDs
    fn show(&mut self) -> io::Result<()>;
}

/// In-memory strip that counts `show` calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    pixels: Vec<RGB8>,
    shown: u64,
}

impl FrameBuffer {
    /// Create a dark strip of `len` pixels
    pub fn new(len: usize) -> Self {
        Self {
            pixels: vec![RGB8::default(); len],
            shown: 0,
        }
    }

    /// Number of times the buffer has been shown
    pub fn shown(&self) -> u64 {
        self.shown
    }

    /// True when every pixel is black
    pub fn is_dark(&self) -> bool {
        self.pixels.iter().all(|p| *p == RGB8::default())
    }
}

impl LedStrip for FrameBuffer {
    fn pixels(&self) -> &[RGB8] {
        &self.pixels
    }

    fn pixels_mut(&mut self) -> &mut [RGB8] {
        &mut self.pixels
    }

    fn show(&mut self) -> io::Result<()> {
        self.shown += 1;
        Ok(())
    }
}

/// Fading confetti effect
#[derive(Debug, Clone)]
pub struct Confetti {
    rng: SmallRng,
    sparkle: Every,
    fade: u8,
}

impl Confetti {
    /// Create the effect; `seed` makes the sparkle sequence reproducible
    pub fn new(sparkle_interval: Duration, fade: u8, seed: u64, now: Instant) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            sparkle: Every::new(sparkle_interval, now),
            fade,
        }
    }

    /// Render one frame into `pixels`.
    ///
    /// Returns the index of the pixel that sparkled, if any.
    pub fn render(&mut self, palette: &Palette16, pixels: &mut [RGB8], now: Instant) -> Option<usize> {
        let keep = 255 - self.fade;
        for pixel in pixels.iter_mut() {
            *pixel = scale_rgb(*pixel, keep);
        }

        if pixels.is_empty() || !self.sparkle.ready(now) {
            return None;
        }

        let index = self.rng.gen_range(0..pixels.len());
        let color = palette.color_at(self.rng.gen::<u8>(), 255, Blend::None);
        pixels[index] = add_rgb(pixels[index], color);
        Some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red() -> Palette16 {
        Palette16::solid(RGB8::new(255, 0, 0))
    }

    #[test]
    fn test_sparkle_on_interval() {
        let start = Instant::now();
        let mut confetti = Confetti::new(Duration::from_millis(200), DEFAULT_FADE, 1, start);
        let mut strip = FrameBuffer::new(16);

        assert_eq!(confetti.render(&red(), strip.pixels_mut(), start), None);
        assert!(strip.is_dark());

        let index = confetti
            .render(&red(), strip.pixels_mut(), start + Duration::from_millis(200))
            .unwrap();
        assert!(index < 16);
        assert_eq!(strip.pixels()[index], RGB8::new(255, 0, 0));
    }

    #[test]
    fn test_pixels_fade() {
        let start = Instant::now();
        let mut confetti = Confetti::new(Duration::from_secs(60), 16, 1, start);
        let mut strip = FrameBuffer::new(4);
        strip.pixels_mut()[2] = RGB8::new(200, 100, 50);

        confetti.render(&red(), strip.pixels_mut(), start);
        let faded = strip.pixels()[2];
        assert!(faded.r < 200 && faded.g < 100 && faded.b < 50);

        for _ in 0..200 {
            confetti.render(&red(), strip.pixels_mut(), start);
        }
        assert!(strip.is_dark());
    }

    #[test]
    fn test_colors_come_from_palette() {
        let start = Instant::now();
        let mut confetti = Confetti::new(Duration::ZERO, DEFAULT_FADE, 7, start);
        let mut strip = FrameBuffer::new(8);
        let blue = Palette16::solid(RGB8::new(0, 0, 255));

        for _ in 0..50 {
            confetti.render(&blue, strip.pixels_mut(), start);
        }
        assert!(strip.pixels().iter().all(|p| p.r == 0 && p.g == 0));
        assert!(!strip.is_dark());
    }

    #[test]
    fn test_same_seed_same_frames() {
        let start = Instant::now();
        let mut a = Confetti::new(Duration::ZERO, DEFAULT_FADE, 99, start);
        let mut b = Confetti::new(Duration::ZERO, DEFAULT_FADE, 99, start);
        let mut strip_a = FrameBuffer::new(16);
        let mut strip_b = FrameBuffer::new(16);

        for _ in 0..10 {
            a.render(&red(), strip_a.pixels_mut(), start);
            b.render(&red(), strip_b.pixels_mut(), start);
        }
        assert_eq!(strip_a, strip_b);
    }

    #[test]
    fn test_empty_strip() {
        let start = Instant::now();
        let mut confetti = Confetti::new(Duration::ZERO, DEFAULT_FADE, 1, start);
        assert_eq!(confetti.render(&red(), &mut [], start), None);
    }
}
