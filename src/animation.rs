//! Per-frame placement and timing for animated images.

/// One frame of an animated image: its size, placement on the canvas and
/// display delay.
///
/// The delay is `delay_numerator / delay_denominator` seconds, as in APNG
/// `fcTL` chunks. A zero denominator means hundredths of a second.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct AnimatedImageDescription {
    pub width: u32,
    pub height: u32,
    pub x_offset: u32,
    pub y_offset: u32,
    pub delay_numerator: u16,
    pub delay_denominator: u16,
    pub sequence_number: u32,
}

impl AnimatedImageDescription {
    /// Frame covering `width × height` at the canvas origin with no delay.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Place the frame at `(x, y)` on the canvas.
    pub fn with_offset(mut self, x: u32, y: u32) -> Self {
        self.x_offset = x;
        self.y_offset = y;
        self
    }

    /// Set the delay to `numerator / denominator` seconds.
    pub fn with_delay(mut self, numerator: u16, denominator: u16) -> Self {
        self.delay_numerator = numerator;
        self.delay_denominator = denominator;
        self
    }

    /// Set the sequence number.
    pub fn with_sequence_number(mut self, sequence_number: u32) -> Self {
        self.sequence_number = sequence_number;
        self
    }

    /// Delay in whole milliseconds.
    #[inline]
    pub fn delay_ms(&self) -> u32 {
        delay_ms(self.delay_numerator, self.delay_denominator)
    }

    /// Whether the frame lies inside a `width × height` canvas.
    pub fn fits_in(&self, width: u32, height: u32) -> bool {
        let right = self.x_offset as u64 + self.width as u64;
        let bottom = self.y_offset as u64 + self.height as u64;
        self.width > 0 && self.height > 0 && right <= width as u64 && bottom <= height as u64
    }
}

/// `numerator / denominator` seconds in milliseconds; denominator 0 is 100.
#[inline]
pub(crate) fn delay_ms(numerator: u16, denominator: u16) -> u32 {
    let denominator = if denominator == 0 { 100 } else { denominator };
    numerator as u32 * 1000 / denominator as u32
}
