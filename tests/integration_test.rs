//! End-to-end tests of the detection and tracking pipeline


use image::{DynamicImage, RgbImage};
use pupil_tracking::{
    config::DetectionConfig,
    detection::{create_generator, propose, create_ensemble, DetectionMethod},
    region::RegionExtractor,
    utils::image_conversion::crop_gray,
    Config, Eye, EyeMode, PupilEngine, RawFrame, TrackingState,
};
use test_helpers::*;

#[test]
fn test_synthetic_disk_recovery_both_eyes() {
    let mut engine = PupilEngine::new(Config::default()).unwrap();
    let estimates = engine.detect(&two_eye_frame(), &default_landmarks(), EyeMode::Both);

    assert_eq!(estimates.len(), 2);
    for (eye, expected) in [(Eye::Left, LEFT_EYE), (Eye::Right, RIGHT_EYE)] {
        let estimate = &estimates[&eye];
        assert!(
            relative_error(estimate.raw_diameter, PUPIL_DIAMETER) <= 0.15,
            "{eye}: raw diameter {} via {}",
            estimate.raw_diameter,
            estimate.source_method
        );
        assert!((estimate.center.0 - expected.0).abs() < 1.5, "{eye}: x {}", estimate.center.0);
        assert!((estimate.center.1 - expected.1).abs() < 1.5, "{eye}: y {}", estimate.center.1);
        assert!(estimate.confidence > 0.3);
        assert_eq!(estimate.stability, 0.5);
        assert_eq!(estimate.state, TrackingState::Tracking);
        let region = estimate.region;
        assert!(f64::from(region.x) <= expected.0 && expected.0 < f64::from(region.x + region.width));
        assert!(f64::from(region.y) <= expected.1 && expected.1 < f64::from(region.y + region.height));
    }
}

#[test]
fn test_pupil_inside_iris_recovers_pupil_diameter() {
    let landmarks = face_landmarks_with_iris(FRAME_WIDTH, FRAME_HEIGHT, LEFT_EYE, RIGHT_EYE, SCENE_IRIS_RADIUS);

    for diameter in [8.0, 10.0, 20.0] {
        let mut engine = PupilEngine::new(Config::default()).unwrap();
        let frame = pupil_in_iris_frame(FRAME_WIDTH, FRAME_HEIGHT, LEFT_EYE, diameter);
        let estimates = engine.detect(&frame, &landmarks, EyeMode::Left);
        let estimate = estimates
            .get(&Eye::Left)
            .unwrap_or_else(|| panic!("pupil {diameter}: nothing detected"));

        assert!(
            relative_error(estimate.raw_diameter, diameter) <= 0.15,
            "pupil {diameter}: raw diameter {} via {}",
            estimate.raw_diameter,
            estimate.source_method
        );
        assert!((estimate.center.0 - LEFT_EYE.0).abs() < 1.5, "pupil {diameter}: x {}", estimate.center.0);
        assert!((estimate.center.1 - LEFT_EYE.1).abs() < 1.5, "pupil {diameter}: y {}", estimate.center.1);
    }
}

#[test]
fn test_default_region_side_tracks_iris_radius() {
    let config = Config::default();
    let extractor = RegionExtractor::new(config.region.clone(), config.landmarks.clone());
    let landmarks = face_landmarks_with_iris(FRAME_WIDTH, FRAME_HEIGHT, LEFT_EYE, RIGHT_EYE, SCENE_IRIS_RADIUS);
    let region = extractor.extract(&landmarks, Eye::Left, FRAME_WIDTH, FRAME_HEIGHT).unwrap();

    // 2.5 x 16 px plus 5 px padding on each side, within a pixel of rounding
    assert!(region.width.abs_diff(50) <= 1 && region.height.abs_diff(50) <= 1, "{region:?}");
    assert!(region.x.abs_diff(115) <= 1 && region.y.abs_diff(35) <= 1, "{region:?}");
}

#[test]
fn test_every_generator_recovers_disk() {
    let frame = two_eye_frame();
    let config = Config::default();
    let extractor = RegionExtractor::new(config.region.clone(), config.landmarks.clone());
    let region = extractor
        .extract(&default_landmarks(), Eye::Right, FRAME_WIDTH, FRAME_HEIGHT)
        .unwrap();
    let roi = crop_gray(&frame, &region);

    for method in DetectionMethod::ALL {
        let generator = create_generator(method, &config.detection);
        let candidate = generator
            .generate(&roi)
            .unwrap_or_else(|| panic!("{method} found nothing"));
        let (x, y) = region.to_frame(candidate.center_x, candidate.center_y);

        assert!(
            relative_error(candidate.diameter, PUPIL_DIAMETER) <= 0.15,
            "{method}: diameter {}",
            candidate.diameter
        );
        assert!((x - RIGHT_EYE.0).abs() < 1.5 && (y - RIGHT_EYE.1).abs() < 1.5, "{method}: center ({x}, {y})");
        assert!((0.0..=1.0).contains(&candidate.confidence));
        assert!((0.0..=1.0).contains(&candidate.circularity));
    }
}

#[test]
fn test_generators_are_deterministic() {
    let frame = two_eye_frame();
    let config = Config::default();
    let extractor = RegionExtractor::new(config.region.clone(), config.landmarks.clone());
    let region = extractor
        .extract(&default_landmarks(), Eye::Left, FRAME_WIDTH, FRAME_HEIGHT)
        .unwrap();
    let roi = crop_gray(&frame, &region);

    let ensemble = create_ensemble(&config.detection);
    let first = propose(&ensemble, &roi);
    let second = propose(&ensemble, &roi);
    assert_eq!(first.len(), DetectionMethod::ALL.len());
    assert_eq!(first, second);
}

#[test]
fn test_color_and_raw_frames_match_grayscale() {
    let gray = two_eye_frame();
    let landmarks = default_landmarks();

    let mut gray_engine = PupilEngine::new(Config::default()).unwrap();
    let expected = gray_engine.detect(&gray, &landmarks, EyeMode::Both);

    let rgb = RgbImage::from_fn(gray.width(), gray.height(), |x, y| {
        let v = gray.get_pixel(x, y).0[0];
        image::Rgb([v, v, v])
    });
    let mut rgb_engine = PupilEngine::new(Config::default()).unwrap();
    assert_eq!(rgb_engine.detect(&rgb, &landmarks, EyeMode::Both), expected);

    let dynamic = DynamicImage::ImageRgb8(rgb.clone());
    let mut dynamic_engine = PupilEngine::new(Config::default()).unwrap();
    assert_eq!(dynamic_engine.detect(&dynamic, &landmarks, EyeMode::Both), expected);

    let raw = RawFrame::new(gray.width(), gray.height(), 3, rgb.as_raw());
    let mut raw_engine = PupilEngine::new(Config::default()).unwrap();
    assert_eq!(raw_engine.detect(&raw, &landmarks, EyeMode::Both), expected);
}

#[test]
fn test_smoothing_follows_moving_pupil() {
    let mut engine = PupilEngine::new(Config::default()).unwrap();
    let mut last_x = 0.0;

    for step in 0..10 {
        let shift = f64::from(step);
        let left = (LEFT_EYE.0 + shift, LEFT_EYE.1);
        let frame = disk_frame(FRAME_WIDTH, FRAME_HEIGHT, &[left, RIGHT_EYE], PUPIL_DIAMETER);
        let landmarks = face_landmarks(FRAME_WIDTH, FRAME_HEIGHT, left, RIGHT_EYE);

        let estimates = engine.detect(&frame, &landmarks, EyeMode::Left);
        let estimate = estimates[&Eye::Left];
        if step > 0 {
            // The filtered center lags behind but keeps moving toward the pupil
            assert!(estimate.center.0 > last_x);
            assert!(estimate.center.0 <= left.0 + 1.0);
            assert!(estimate.stability > 0.5);
        }
        last_x = estimate.center.0;
    }
}

#[test]
fn test_constant_velocity_model_via_config() {
    let mut config = Config::default();
    config.filter.model = "constant_velocity".to_string();
    let mut engine = PupilEngine::new(config).unwrap();

    let estimates = engine.detect(&two_eye_frame(), &default_landmarks(), EyeMode::Right);
    assert!(relative_error(estimates[&Eye::Right].smoothed_diameter, PUPIL_DIAMETER) <= 0.15);
}

#[test]
fn test_single_generator_configuration() {
    let mut config = Config::default();
    config.detection = DetectionConfig {
        generators: vec![DetectionMethod::DarkestRegion],
        ..DetectionConfig::default()
    };
    let mut engine = PupilEngine::new(config).unwrap();
    let estimates = engine.detect(&two_eye_frame(), &default_landmarks(), EyeMode::Both);

    assert_eq!(estimates.len(), 2);
    assert!(estimates.values().all(|e| e.source_method == DetectionMethod::DarkestRegion));
}
