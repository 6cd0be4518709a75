pub mod estimator;
pub mod pipeline;

pub use estimator::estimate;
pub use pipeline::{calculate, calculate_with, Calculation};
