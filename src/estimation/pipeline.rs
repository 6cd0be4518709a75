//! One calculation, start to finish.
//!
//! Sampling, classification and estimation run back to back on values owned by
//! this call. There is no shared "current point set", so a re-sample can never
//! leave a stale set behind for a later estimate.

use log::debug;
use rand::Rng;

use crate::error::EstimationResult;
use crate::estimation::estimate;
use crate::models::{CalculationResult, Point};
use crate::pixels::{classify, PixelBuffer};
use crate::sampling::{generate_with, SamplingDensity};

/// Output of a single calculation: the record plus the classified points the
/// record was computed from.
#[derive(Debug, Clone)]
pub struct Calculation {
    pub result: CalculationResult,
    pub points: Vec<Point>,
}

pub fn calculate<B: PixelBuffer + ?Sized>(
    buffer: &B,
    density: SamplingDensity,
    label: &str,
) -> EstimationResult<Calculation> {
    calculate_with(&mut rand::thread_rng(), buffer, density, label)
}

pub fn calculate_with<R: Rng + ?Sized, B: PixelBuffer + ?Sized>(
    rng: &mut R,
    buffer: &B,
    density: SamplingDensity,
    label: &str,
) -> EstimationResult<Calculation> {
    let (width, height) = (buffer.width(), buffer.height());

    let sampled = generate_with(rng, width, height, density.as_count())?;
    let points = classify(&sampled, buffer)?;
    let result = estimate(&points, width, height, label)?;

    debug!(
        "{label}: {}/{} points in stain over {width}x{height}",
        result.points_in_stain, result.total_points
    );

    Ok(Calculation { result, points })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EstimationError;
    use crate::pixels::RawPixelBuffer;
    use image::{Rgba, RgbaImage};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rstest::rstest;

    fn density(points: u32) -> SamplingDensity {
        SamplingDensity::new(points).unwrap()
    }

    #[rstest]
    #[case(100)]
    #[case(10_000)]
    fn density_bounds_produce_fully_classified_sets(#[case] points: u32) {
        let image = RgbaImage::from_pixel(50, 40, Rgba([255, 255, 255, 255]));
        let calculation = calculate(&image, density(points), "white.png").unwrap();

        assert_eq!(calculation.points.len(), points as usize);
        assert!(calculation.points.iter().all(|p| p.in_stain));
        assert_eq!(calculation.result.total_points, u64::from(points));
        assert_eq!(calculation.result.area_percentage, 100.0);
        assert_eq!(calculation.result.estimated_area, 2000.0);
    }

    #[test]
    fn black_image_has_no_stain() {
        let image = RgbaImage::from_pixel(30, 30, Rgba([0, 0, 0, 255]));
        let calculation = calculate(&image, SamplingDensity::default(), "black.png").unwrap();
        assert_eq!(calculation.result.points_in_stain, 0);
        assert_eq!(calculation.result.estimated_area, 0.0);
    }

    #[test]
    fn half_stain_estimate_is_close_to_half() {
        let image = RgbaImage::from_fn(200, 100, |x, _| {
            if x < 100 {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([0, 0, 0, 255])
            }
        });
        let mut rng = StdRng::seed_from_u64(2024);
        let calculation = calculate_with(&mut rng, &image, density(10_000), "half.png").unwrap();

        let percentage = calculation.result.area_percentage;
        assert!((45.0..=55.0).contains(&percentage), "got {percentage}");
        assert_eq!(
            calculation.result.points_in_stain,
            calculation.points.iter().filter(|p| p.in_stain).count() as u64
        );
    }

    #[test]
    fn seeded_runs_agree_on_counts() {
        let data: Vec<u8> = (0..64u32)
            .flat_map(|i| if i % 3 == 0 { [255, 255, 255, 255] } else { [0, 0, 0, 255] })
            .collect();
        let buffer = RawPixelBuffer::new(8, 8, 4, &data).unwrap();

        let a = calculate_with(&mut StdRng::seed_from_u64(9), &buffer, density(500), "raw").unwrap();
        let b = calculate_with(&mut StdRng::seed_from_u64(9), &buffer, density(500), "raw").unwrap();
        assert_eq!(a.points, b.points);
        assert_eq!(a.result.points_in_stain, b.result.points_in_stain);
        assert_ne!(a.result.id, b.result.id);
    }

    #[test]
    fn lying_buffer_surfaces_index_error() {
        struct Lying;
        impl PixelBuffer for Lying {
            fn width(&self) -> u32 {
                10
            }
            fn height(&self) -> u32 {
                10
            }
            fn rgb_at(&self, _x: u32, _y: u32) -> [u8; 3] {
                [0, 0, 0]
            }
            fn contains(&self, x: u32, _y: u32) -> bool {
                x < 5
            }
        }

        let mut rng = StdRng::seed_from_u64(1);
        let err = calculate_with(&mut rng, &Lying, density(1_000), "lying").unwrap_err();
        assert!(matches!(err, EstimationError::IndexOutOfRange { .. }));
    }
}
