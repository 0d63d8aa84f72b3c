//! LED strip rendered to a terminal as a row of truecolor blocks.

use smart_leds::{brightness, SmartLedsWrite, RGB8};
use std::io::{self, Write};
use synchro_node::LedStrip;

/// Writes colors as ANSI truecolor blocks on one continuously redrawn line
pub struct TerminalOutput<W: Write> {
    out: W,
}

impl<W: Write> TerminalOutput<W> {
    /// Wrap a writer
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Underlying writer
    pub fn get_ref(&self) -> &W {
        &self.out
    }
}

impl<W: Write> SmartLedsWrite for TerminalOutput<W> {
    type Error = io::Error;
    type Color = RGB8;

    fn write<T, I>(&mut self, iterator: T) -> Result<(), Self::Error>
    where
        T: IntoIterator<Item = I>,
        I: Into<Self::Color>,
    {
        let mut line = String::from("\r");
        for color in iterator {
            let c: RGB8 = color.into();
            line.push_str(&format!("\x1b[38;2;{};{};{}m██", c.r, c.g, c.b));
        }
        line.push_str("\x1b[0m");

        self.out.write_all(line.as_bytes())?;
        self.out.flush()
    }
}

/// Pixel buffer shown through a [`TerminalOutput`] at a global brightness
pub struct TerminalStrip<W: Write> {
    pixels: Vec<RGB8>,
    brightness: u8,
    output: TerminalOutput<W>,
}

impl<W: Write> TerminalStrip<W> {
    /// Create a dark strip of `len` pixels
    pub fn new(len: usize, brightness: u8, out: W) -> Self {
        Self {
            pixels: vec![RGB8::default(); len],
            brightness,
            output: TerminalOutput::new(out),
        }
    }

    /// Terminal output
    pub fn output(&self) -> &TerminalOutput<W> {
        &self.output
    }
}

impl<W: Write> LedStrip for TerminalStrip<W> {
    fn pixels(&self) -> &[RGB8] {
        &self.pixels
    }

    fn pixels_mut(&mut self) -> &mut [RGB8] {
        &mut self.pixels
    }

    fn show(&mut self) -> io::Result<()> {
        self.output
            .write(brightness(self.pixels.iter().copied(), self.brightness))
    }
}
