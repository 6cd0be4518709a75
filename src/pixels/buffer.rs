//! Read-only access to decoded image pixels.
//!
//! The estimator never decodes images itself. Anything that can report its
//! dimensions and hand back the first three 8-bit channels of a pixel can be
//! classified.

use image::{ImageBuffer, Rgb, Rgba};

use crate::error::{EstimationError, EstimationResult};

pub trait PixelBuffer {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Red, green and blue channels at `(x, y)`.
    ///
    /// Callers check bounds first; implementations may panic out of range.
    fn rgb_at(&self, x: u32, y: u32) -> [u8; 3];

    fn contains(&self, x: u32, y: u32) -> bool {
        x < self.width() && y < self.height()
    }
}

/// Interleaved 8-bit pixel data laid out row-major, `channels` bytes per pixel.
///
/// Matches canvas `ImageData` (RGBA) and most raw decoder outputs.
#[derive(Debug, Clone, Copy)]
pub struct RawPixelBuffer<'a> {
    width: u32,
    height: u32,
    channels: usize,
    data: &'a [u8],
}

impl<'a> RawPixelBuffer<'a> {
    pub fn new(width: u32, height: u32, channels: usize, data: &'a [u8]) -> EstimationResult<Self> {
        if width == 0 || height == 0 {
            return Err(EstimationError::invalid(format!(
                "pixel buffer must be non-empty, got {width}x{height}"
            )));
        }
        if channels < 3 {
            return Err(EstimationError::invalid(format!(
                "pixel buffer needs at least 3 channels per pixel, got {channels}"
            )));
        }

        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(channels))
            .ok_or_else(|| EstimationError::invalid("pixel buffer dimensions overflow"))?;
        if data.len() != expected {
            return Err(EstimationError::invalid(format!(
                "pixel buffer holds {} bytes, {width}x{height}x{channels} needs {expected}",
                data.len()
            )));
        }

        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    pub fn channels(&self) -> usize {
        self.channels
    }
}

impl PixelBuffer for RawPixelBuffer<'_> {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn rgb_at(&self, x: u32, y: u32) -> [u8; 3] {
        let index = (y as usize * self.width as usize + x as usize) * self.channels;
        [self.data[index], self.data[index + 1], self.data[index + 2]]
    }
}

impl PixelBuffer for ImageBuffer<Rgba<u8>, Vec<u8>> {
    fn width(&self) -> u32 {
        ImageBuffer::width(self)
    }

    fn height(&self) -> u32 {
        ImageBuffer::height(self)
    }

    fn rgb_at(&self, x: u32, y: u32) -> [u8; 3] {
        let [r, g, b, _] = self.get_pixel(x, y).0;
        [r, g, b]
    }
}

impl PixelBuffer for ImageBuffer<Rgb<u8>, Vec<u8>> {
    fn width(&self) -> u32 {
        ImageBuffer::width(self)
    }

    fn height(&self) -> u32 {
        ImageBuffer::height(self)
    }

    fn rgb_at(&self, x: u32, y: u32) -> [u8; 3] {
        self.get_pixel(x, y).0
    }
}
