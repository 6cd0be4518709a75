pub mod density;
pub mod sampler;

pub use density::SamplingDensity;
pub use sampler::{generate, generate_with};
