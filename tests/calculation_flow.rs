use std::fs;

use image::{Rgba, RgbaImage};
use rand::rngs::StdRng;
use rand::SeedableRng;
use stain_area_lib::{
    CalculateOptions, HistoryRecovery, RawPixelBuffer, SamplingDensity, StainApp,
};
use tempfile::tempdir;

/// 100x50 mask with a white 50x50 square on the left.
fn half_mask() -> RgbaImage {
    RgbaImage::from_fn(100, 50, |x, _| {
        if x < 50 {
            Rgba([255, 255, 255, 255])
        } else {
            Rgba([0, 0, 0, 255])
        }
    })
}

#[test]
fn results_are_recorded_newest_first_and_survive_restart() {
    let dir = tempdir().unwrap();
    let mask = half_mask();

    let (first, second) = {
        let app = StainApp::open(dir.path()).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let first = app
            .calculate_with(&mut rng, &mask, "first.png", CalculateOptions::default())
            .unwrap();
        let second = app
            .calculate_with(&mut rng, &mask, "second.png", CalculateOptions::default())
            .unwrap();
        (first.result, second.result)
    };

    let app = StainApp::open(dir.path()).unwrap();
    let history = app.history().current();
    assert_eq!(history.as_slice(), &[second, first]);
    assert!(app.history().recovery().is_none());

    for result in history.iter() {
        assert_eq!(result.total_points, u64::from(SamplingDensity::DEFAULT));
        assert!((40.0..=60.0).contains(&result.area_percentage));
        assert_eq!(
            result.estimated_area,
            5000.0 * (result.points_in_stain as f64 / result.total_points as f64)
        );
    }
}

#[test]
fn corrupt_history_file_starts_empty_and_is_repaired_on_append() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("history.json"), "<<< definitely not json >>>").unwrap();

    let app = StainApp::open(dir.path()).unwrap();
    assert!(app.history().is_empty());
    assert!(matches!(
        app.history().recovery(),
        Some(HistoryRecovery::Discarded { .. })
    ));

    app.calculate(&half_mask(), "after-crash.png", CalculateOptions::default())
        .unwrap();

    let reopened = StainApp::open(dir.path()).unwrap();
    assert_eq!(reopened.history().len(), 1);
    assert!(reopened.history().recovery().is_none());
}

#[test]
fn legacy_history_is_upgraded_to_versioned_payload() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("history.json");
    fs::write(
        &path,
        r#"[{"id":"lx1","timestamp":"2024-02-10T08:00:00.000Z","imageFileName":"old.png",
            "totalPoints":100,"pointsInStain":10,"imageWidth":10,"imageHeight":10,
            "estimatedArea":10,"areaPercentage":10}]"#,
    )
    .unwrap();

    let app = StainApp::open(dir.path()).unwrap();
    assert_eq!(app.history().len(), 1);

    let data = [255u8, 255, 255, 255, 0, 0, 0, 255];
    let buffer = RawPixelBuffer::new(2, 1, 4, &data).unwrap();
    app.calculate(&buffer, "new.png", CalculateOptions::default())
        .unwrap();

    let stored: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(stored["schemaVersion"], 1);
    assert_eq!(stored["results"][0]["imageFileName"], "new.png");
    assert_eq!(stored["results"][1]["imageFileName"], "old.png");
}

#[test]
fn subscribers_see_each_recorded_calculation() {
    let dir = tempdir().unwrap();
    let app = StainApp::open(dir.path()).unwrap();
    let updates = app.history().subscribe();
    assert!(updates.recv().unwrap().is_empty());

    let calculation = app
        .calculate(&half_mask(), "live.png", CalculateOptions::default())
        .unwrap();

    let snapshot = updates.recv().unwrap();
    assert_eq!(snapshot.first(), Some(&calculation.result));
}

#[test]
fn concurrent_sessions_on_one_data_dir_lose_nothing() {
    let dir = tempdir().unwrap();
    let mask = half_mask();
    let sessions = [
        StainApp::open(dir.path()).unwrap(),
        StainApp::open(dir.path()).unwrap(),
    ];

    std::thread::scope(|scope| {
        for (n, app) in sessions.iter().enumerate() {
            let mask = &mask;
            scope.spawn(move || {
                for i in 0..10 {
                    app.calculate(mask, &format!("s{n}-{i}.png"), CalculateOptions::default())
                        .unwrap();
                }
            });
        }
    });

    let reopened = StainApp::open(dir.path()).unwrap();
    assert_eq!(reopened.history().len(), 20);
    assert!(reopened.history().recovery().is_none());
}
