use crate::error::{EstimationError, EstimationResult};
use crate::models::Point;
use crate::pixels::PixelBuffer;

const STAIN_CHANNEL_VALUE: u8 = u8::MAX;

/// A pixel belongs to the stain only when red, green and blue are all at full
/// intensity. Masks must be thresholded before they get here; near-white and
/// anti-aliased edge pixels count as background.
pub fn is_stain_pixel(rgb: [u8; 3]) -> bool {
    rgb.iter().all(|&channel| channel == STAIN_CHANNEL_VALUE)
}

/// Label every point as inside or outside the stain.
///
/// Returns a new vector in the same order. Fails without a partial result if
/// any point lies outside the buffer.
pub fn classify<B: PixelBuffer + ?Sized>(points: &[Point], buffer: &B) -> EstimationResult<Vec<Point>> {
    let (width, height) = (buffer.width(), buffer.height());

    points
        .iter()
        .map(|point| {
            if !buffer.contains(point.x, point.y) {
                return Err(EstimationError::IndexOutOfRange {
                    x: point.x,
                    y: point.y,
                    width,
                    height,
                });
            }
            let in_stain = is_stain_pixel(buffer.rgb_at(point.x, point.y));
            Ok(point.with_classification(in_stain))
        })
        .collect()
}
