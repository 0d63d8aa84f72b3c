//! Connectivity indicator pixel.

use synchro_wire::RGB8;

/// Color shown while at least one peer is reachable
pub const CONNECTED: RGB8 = RGB8 { r: 0, g: 255, b: 0 };

/// Color shown while no peer is reachable
pub const ISOLATED: RGB8 = RGB8 { r: 255, g: 0, b: 0 };

/// Paints one pixel green or red depending on the mesh peer count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusIndicator {
    pixel: usize,
}

impl StatusIndicator {
    /// Indicator on the given pixel index
    pub fn new(pixel: usize) -> Self {
        Self { pixel }
    }

    /// Pixel index
    pub fn pixel(&self) -> usize {
        self.pixel
    }

    /// Color for a peer count
    pub fn color_for(peers: usize) -> RGB8 {
        if peers > 0 {
            CONNECTED
        } else {
            ISOLATED
        }
    }

    /// Paint the indicator pixel; returns false if it is outside `pixels`
    pub fn refresh(&self, peers: usize, pixels: &mut [RGB8]) -> bool {
        match pixels.get_mut(self.pixel) {
            Some(pixel) => {
                *pixel = Self::color_for(peers);
                true
            }
            None => false,
        }
    }
}
