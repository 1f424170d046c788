//! Status indicator (RGB LED)

/// 24-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Single-pixel status indicator
pub trait Indicator {
    type Error: core::fmt::Debug;

    /// Latch a color; nothing is shown until [`Indicator::render`]
    fn set_color(&mut self, color: Rgb) -> Result<(), Self::Error>;

    /// Push the latched color out to the LED
    fn render(&mut self) -> Result<(), Self::Error>;
}
