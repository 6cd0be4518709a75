//! Turns an image file into a fully materialised pixel buffer.
//!
//! Decoding completes before anything is handed to the estimator, so the
//! classifier never sees a partially loaded image.

use std::path::Path;

use anyhow::{bail, Context, Result};
use image::RgbaImage;

use crate::log_debug;

const ENABLE_LOGS: bool = true;

/// Largest image file accepted, in bytes.
pub const MAX_IMAGE_BYTES: u64 = 1_000_000;

/// A decoded mask plus the name it is recorded under.
pub struct LoadedImage {
    pub file_name: String,
    pub pixels: RgbaImage,
}

impl LoadedImage {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

pub fn load_image(path: &Path) -> Result<LoadedImage> {
    let size = std::fs::metadata(path)
        .with_context(|| format!("could not read image {}", path.display()))?
        .len();
    if size > MAX_IMAGE_BYTES {
        bail!(
            "image {} is {size} bytes, larger than the {MAX_IMAGE_BYTES} byte limit",
            path.display()
        );
    }

    let decoded = image::open(path)
        .with_context(|| format!("could not read image {}", path.display()))?;

    // to_rgba8 maps 16-bit and float maxima onto 255, so pure white stays white.
    let pixels = decoded.to_rgba8();
    if pixels.width() == 0 || pixels.height() == 0 {
        bail!("image {} has no pixels", path.display());
    }

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    log_debug!(
        "Decoded {} ({}x{})",
        file_name,
        pixels.width(),
        pixels.height()
    );

    Ok(LoadedImage { file_name, pixels })
}
