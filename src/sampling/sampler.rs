use rand::Rng;

use crate::error::{EstimationError, EstimationResult};
use crate::models::Point;

/// Draw `count` points uniformly over `[0, width) x [0, height)` using the
/// thread-local RNG.
pub fn generate(width: u32, height: u32, count: usize) -> EstimationResult<Vec<Point>> {
    generate_with(&mut rand::thread_rng(), width, height, count)
}

/// Same as [`generate`] with a caller-supplied RNG.
///
/// Coordinates are independent and drawn with replacement, so the same grid
/// cell can be sampled more than once.
pub fn generate_with<R: Rng + ?Sized>(
    rng: &mut R,
    width: u32,
    height: u32,
    count: usize,
) -> EstimationResult<Vec<Point>> {
    if width == 0 || height == 0 {
        return Err(EstimationError::invalid(format!(
            "sampling area must be non-empty, got {width}x{height}"
        )));
    }
    if count == 0 {
        return Err(EstimationError::invalid("point count must be positive"));
    }

    let points = (0..count)
        .map(|_| Point::unclassified(rng.gen_range(0..width), rng.gen_range(0..height)))
        .collect();

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rstest::rstest;

    #[test]
    fn produces_requested_count_within_bounds() {
        let points = generate(100, 100, 500).unwrap();
        assert_eq!(points.len(), 500);
        for point in &points {
            assert!(point.x < 100);
            assert!(point.y < 100);
            assert!(!point.in_stain);
        }
    }

    #[rstest]
    #[case(0, 10, 100)]
    #[case(10, 0, 100)]
    #[case(10, 10, 0)]
    fn rejects_empty_inputs(#[case] width: u32, #[case] height: u32, #[case] count: usize) {
        assert!(matches!(
            generate(width, height, count),
            Err(EstimationError::InvalidArgument(_))
        ));
    }

    #[test]
    fn same_seed_gives_same_points() {
        let a = generate_with(&mut StdRng::seed_from_u64(7), 640, 480, 200).unwrap();
        let b = generate_with(&mut StdRng::seed_from_u64(7), 640, 480, 200).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn single_pixel_image_always_hits_origin() {
        let points = generate(1, 1, 50).unwrap();
        assert!(points.iter().all(|p| p.x == 0 && p.y == 0));
    }

    #[test]
    fn covers_every_column_of_a_narrow_strip() {
        let mut rng = StdRng::seed_from_u64(42);
        let points = generate_with(&mut rng, 4, 1, 1_000).unwrap();
        for column in 0..4 {
            assert!(points.iter().any(|p| p.x == column), "column {column} never sampled");
        }
    }

    proptest! {
        #[test]
        fn every_point_is_in_bounds(
            width in 1u32..2_000,
            height in 1u32..2_000,
            count in 1usize..500,
            seed in any::<u64>(),
        ) {
            let points = generate_with(&mut StdRng::seed_from_u64(seed), width, height, count).unwrap();
            prop_assert_eq!(points.len(), count);
            for point in points {
                prop_assert!(point.x < width);
                prop_assert!(point.y < height);
            }
        }
    }
}
