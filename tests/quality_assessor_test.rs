use common_test_utils::*;

use chart_vision::config::QualityConfig;
use chart_vision::vision::QualityAssessor;

#[test]
fn test_uniform_gray_has_no_contrast() {
    let bitmap = canvas(400, 300, [128, 128, 128, 255]);
    let report = QualityAssessor::default().assess(&bitmap);

    assert!(report.has_adequate_resolution);
    assert_eq!(report.contrast, 0.0);
    assert!(!report.has_good_contrast);
    assert!(report.has_low_noise);
    assert!(!report.is_acceptable);
}

#[test]
fn test_split_image_is_acceptable() {
    let mut bitmap = canvas(400, 300, [0, 0, 0, 255]);
    bitmap.fill_rect(0, 150, 400, 150, [255, 255, 255, 255]);
    let report = QualityAssessor::default().assess(&bitmap);

    assert!((report.contrast - 255.0).abs() < 1e-6);
    assert!(report.has_good_contrast);
    assert!(report.noise_level < 1.0);
    assert!(report.is_acceptable);
    assert!(report.to_string().contains("통과"));
}

#[test]
fn test_checkerboard_is_noisy() {
    let mut bitmap = canvas(400, 300, [0, 0, 0, 255]);
    for y in 0..300 {
        for x in 0..400 {
            if (x + y) % 2 == 0 {
                bitmap.set_pixel(x, y, [255, 255, 255, 255]);
            }
        }
    }
    let report = QualityAssessor::default().assess(&bitmap);

    assert!(report.has_good_contrast);
    assert!(report.noise_level > 200.0);
    assert!(!report.has_low_noise);
    assert!(!report.is_acceptable);
}

#[test]
fn test_low_resolution_reported() {
    let (chart, _) = synthetic_chart(3);
    let small = chart.crop(&chart_vision::model::Region::new(0, 0, 200, 150));
    let report = QualityAssessor::default().assess(&small);

    assert!(!report.has_adequate_resolution);
    assert!(!report.is_acceptable);
    assert!(report.factor_summaries()[0].contains("200x150"));
}

#[test]
fn test_custom_resolution_threshold() {
    let bitmap = canvas(200, 150, [0, 0, 0, 255]);
    let assessor = QualityAssessor::new(QualityConfig {
        min_width: 100,
        min_height: 100,
        ..QualityConfig::default()
    });
    assert!(assessor.assess(&bitmap).has_adequate_resolution);
}

#[test]
fn test_tiny_bitmap_has_zero_noise() {
    let bitmap = canvas(2, 2, [90, 90, 90, 255]);
    let report = QualityAssessor::default().assess(&bitmap);
    assert_eq!(report.noise_level, 0.0);
}
