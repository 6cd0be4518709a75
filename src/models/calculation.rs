//! Calculation result model.
//!
//! One record per completed "calculate" action. Records are never mutated after
//! the estimator creates them; the history only prepends new ones.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub image_file_name: String,
    pub total_points: u64,
    pub points_in_stain: u64,
    pub image_width: u32,
    pub image_height: u32,
    /// `image_width * image_height * points_in_stain / total_points`, unrounded.
    pub estimated_area: f64,
    /// `100 * points_in_stain / total_points`, unrounded.
    pub area_percentage: f64,
}

impl CalculationResult {
    pub fn total_area(&self) -> u64 {
        u64::from(self.image_width) * u64::from(self.image_height)
    }

    /// Checks the record invariants. Used when reviving stored history, where
    /// records may have been edited or written by an older build.
    pub fn validate(&self) -> Result<(), String> {
        if self.total_points == 0 {
            return Err(format!("result {} has zero total points", self.id));
        }
        if self.points_in_stain > self.total_points {
            return Err(format!(
                "result {} counts {} stain points out of {}",
                self.id, self.points_in_stain, self.total_points
            ));
        }
        if self.image_width == 0 || self.image_height == 0 {
            return Err(format!(
                "result {} has empty dimensions {}x{}",
                self.id, self.image_width, self.image_height
            ));
        }
        if !self.estimated_area.is_finite() || self.estimated_area < 0.0 {
            return Err(format!(
                "result {} has invalid estimated area {}",
                self.id, self.estimated_area
            ));
        }
        if !(0.0..=100.0).contains(&self.area_percentage) {
            return Err(format!(
                "result {} has percentage {} outside [0, 100]",
                self.id, self.area_percentage
            ));
        }
        Ok(())
    }
}
