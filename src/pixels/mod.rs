pub mod buffer;
pub mod classifier;

pub use buffer::{PixelBuffer, RawPixelBuffer};
pub use classifier::{classify, is_stain_pixel};
