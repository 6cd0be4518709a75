//! Draws sampled points over the source image so a user can check the
//! classification by eye.

use std::path::Path;

use anyhow::{Context, Result};
use image::{Pixel, Rgba, RgbaImage};
use imageproc::drawing::draw_filled_circle_mut;

use crate::models::Point;

const POINT_RADIUS: i32 = 2;
/// 0.8 opacity.
const POINT_ALPHA: u8 = 204;
const IN_STAIN_COLOR: Rgba<u8> = Rgba([0, 255, 0, POINT_ALPHA]);
const OUTSIDE_COLOR: Rgba<u8> = Rgba([255, 0, 0, POINT_ALPHA]);

/// Copy of `image` with a filled disc at every point: green inside the stain,
/// red outside.
pub fn render_overlay(image: &RgbaImage, points: &[Point]) -> RgbaImage {
    // Discs go on their own layer first. The filled circle routine can touch a
    // pixel more than once, so blending straight onto the image would darken
    // some rows.
    let mut layer = RgbaImage::new(image.width(), image.height());
    for point in points {
        let color = if point.in_stain { IN_STAIN_COLOR } else { OUTSIDE_COLOR };
        let center = (point.x as i32, point.y as i32);
        draw_filled_circle_mut(&mut layer, center, POINT_RADIUS, color);
    }

    let mut canvas = image.clone();
    for (x, y, top) in layer.enumerate_pixels() {
        if top[3] > 0 {
            canvas.get_pixel_mut(x, y).blend(top);
        }
    }
    canvas
}

pub fn save_overlay(image: &RgbaImage, points: &[Point], path: &Path) -> Result<()> {
    render_overlay(image, points)
        .save(path)
        .with_context(|| format!("failed to write overlay to {}", path.display()))
}
