use serde::{Deserialize, Serialize};

use crate::error::{EstimationError, EstimationResult};

/// Number of random points drawn per calculation.
///
/// The only tunable of the estimator. Bounded to keep a calculation fast while
/// still giving a usable estimate on small masks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct SamplingDensity(u32);

impl SamplingDensity {
    pub const MIN: u32 = 100;
    pub const MAX: u32 = 10_000;
    pub const DEFAULT: u32 = 1_000;

    pub fn new(points: u32) -> EstimationResult<Self> {
        if !(Self::MIN..=Self::MAX).contains(&points) {
            return Err(EstimationError::invalid(format!(
                "sampling density must be between {} and {} points, got {points}",
                Self::MIN,
                Self::MAX
            )));
        }
        Ok(Self(points))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn as_count(self) -> usize {
        self.0 as usize
    }
}

impl Default for SamplingDensity {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl TryFrom<u32> for SamplingDensity {
    type Error = EstimationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SamplingDensity> for u32 {
    fn from(density: SamplingDensity) -> Self {
        density.0
    }
}

impl std::fmt::Display for SamplingDensity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
