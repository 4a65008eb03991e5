//! Error handling tests for construction-time failures

use pupil_tracking::{
    config::{Config, DetectionConfig},
    detection::create_generator_by_name,
    filters::create_filter,
    utils::safe_cast::{f64_to_u32_clamp, round_to_pixel},
    Error, EyeMode, PupilEngine,
};
use std::io::Write;

#[test]
fn test_filter_creation_errors() {
    match create_filter("invalid_filter") {
        Err(Error::FilterError(msg)) => assert!(msg.contains("invalid_filter")),
        _ => panic!("Expected FilterError"),
    }
}

#[test]
fn test_generator_creation_errors() {
    let config = DetectionConfig::default();
    match create_generator_by_name("starburst", &config) {
        Err(Error::DetectionError(msg)) => assert!(msg.contains("starburst")),
        _ => panic!("Expected DetectionError"),
    }
    assert!(create_generator_by_name("otsu", &config).is_ok());
}

#[test]
fn test_eye_mode_parse_error() {
    match "middle".parse::<EyeMode>() {
        Err(Error::InvalidInput(msg)) => assert!(msg.contains("middle")),
        _ => panic!("Expected InvalidInput"),
    }
}

#[test]
fn test_engine_rejects_invalid_config() {
    let mut config = Config::default();
    config.tracking.lost_after_frames = 0;
    assert!(matches!(PupilEngine::new(config), Err(Error::ConfigError(_))));

    let mut config = Config::default();
    config.detection.max_diameter = config.detection.min_diameter;
    assert!(matches!(PupilEngine::new(config), Err(Error::ConfigError(_))));

    let mut config = Config::default();
    config.filter.position_r = -1.0;
    assert!(matches!(PupilEngine::new(config), Err(Error::ConfigError(_))));
}

#[test]
fn test_config_file_errors() {
    match Config::from_file("/nonexistent/pupil.yaml") {
        Err(Error::Io(err)) => assert_eq!(err.kind(), std::io::ErrorKind::NotFound),
        _ => panic!("Expected Io error"),
    }
    assert!(matches!(
        Config::default().to_file("/nonexistent/dir/pupil.yaml"),
        Err(Error::Io(_))
    ));

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "detection:\n  generators: [adaptive_threshold, hough_transform]").unwrap();
    match Config::from_file(file.path()) {
        Err(Error::ConfigError(msg)) => assert!(msg.contains("parse")),
        _ => panic!("Expected ConfigError"),
    }

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "region: [1, 2").unwrap();
    assert!(Config::from_file(file.path()).is_err());
}

#[test]
fn test_pixel_casts_never_fail() {
    assert_eq!(f64_to_u32_clamp(f64::INFINITY, 3, 9), 3);
    assert_eq!(f64_to_u32_clamp(1e12, 3, 9), 9);
    assert_eq!(round_to_pixel(f64::NAN, 10), Some(0));
    assert_eq!(round_to_pixel(5.0, 0), None);
}
