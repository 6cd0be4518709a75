pub mod calculation;
pub mod point;

pub use calculation::CalculationResult;
pub use point::Point;
