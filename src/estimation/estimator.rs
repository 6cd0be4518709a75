use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{EstimationError, EstimationResult};
use crate::models::{CalculationResult, Point};

/// Reduce classified points to a result record.
///
/// Pure apart from the fresh id and timestamp; recording the result in the
/// history is the caller's job.
pub fn estimate(points: &[Point], width: u32, height: u32, label: &str) -> EstimationResult<CalculationResult> {
    estimate_at(points, width, height, label, Utc::now())
}

pub(crate) fn estimate_at(
    points: &[Point],
    width: u32,
    height: u32,
    label: &str,
    timestamp: DateTime<Utc>,
) -> EstimationResult<CalculationResult> {
    if points.is_empty() {
        return Err(EstimationError::invalid("cannot estimate an area from zero points"));
    }
    if width == 0 || height == 0 {
        return Err(EstimationError::invalid(format!(
            "image dimensions must be positive, got {width}x{height}"
        )));
    }

    let total_points = points.len() as u64;
    let points_in_stain = points.iter().filter(|p| p.in_stain).count() as u64;

    let total_area = f64::from(width) * f64::from(height);
    let fraction = points_in_stain as f64 / total_points as f64;

    Ok(CalculationResult {
        id: Uuid::new_v4().to_string(),
        timestamp,
        image_file_name: label.to_string(),
        total_points,
        points_in_stain,
        image_width: width,
        image_height: height,
        estimated_area: total_area * fraction,
        area_percentage: fraction * 100.0,
    })
}
