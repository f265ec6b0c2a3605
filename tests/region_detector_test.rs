use common_test_utils::*;

use chart_vision::model::{Region, RegionSource};
use chart_vision::vision::{ChartPixelKind, RegionDetector};

#[test]
fn test_uniform_image_falls_back_to_center() {
    let bitmap = canvas(1000, 1000, [60, 60, 60, 255]);
    let detection = RegionDetector::default().detect(&bitmap);

    assert_eq!(detection.source, RegionSource::Assumed);
    assert!(!detection.is_detected());
    assert_eq!(detection.region, Region::new(75, 75, 850, 850));
}

#[test]
fn test_fallback_ratio_on_non_square_image() {
    let bitmap = canvas(400, 300, DARK_BACKGROUND);
    let detection = RegionDetector::default().detect(&bitmap);

    assert_eq!(detection.source, RegionSource::Assumed);
    assert_eq!(detection.region.width, 340);
    assert_eq!(detection.region.height, 255);
    assert_eq!(detection.region.x, 30);
}

#[test]
fn test_candles_define_region_with_margin() {
    let (bitmap, _) = synthetic_chart(6);
    let detection = RegionDetector::default().detect(&bitmap);

    assert!(detection.is_detected());
    // 캔들 경계 (60,60)-(319,239)에 2% 여백
    assert_eq!(detection.region, Region::new(52, 54, 276, 192));
}

#[test]
fn test_small_cluster_is_rejected() {
    let mut bitmap = canvas(400, 300, DARK_BACKGROUND);
    bitmap.fill_rect(100, 100, 10, 80, BULL_GREEN);
    let detection = RegionDetector::default().detect(&bitmap);

    assert_eq!(detection.source, RegionSource::Assumed);
}

#[test]
fn test_grid_lines_count_as_chart() {
    let mut bitmap = canvas(400, 300, DARK_BACKGROUND);
    for y in [40, 140, 240] {
        bitmap.fill_rect(20, y, 360, 1, GRID_GRAY);
    }
    let detection = RegionDetector::default().detect(&bitmap);

    assert!(detection.is_detected());
    assert_eq!(detection.region.x, 12);
    assert_eq!(detection.region.y, 34);
}

#[test]
fn test_classify_chart_pixel() {
    let detector = RegionDetector::default();
    let background = 10.0;

    assert_eq!(
        detector.classify_chart_pixel(BULL_GREEN, background),
        Some(ChartPixelKind::Candle)
    );
    assert_eq!(
        detector.classify_chart_pixel(GRID_GRAY, background),
        Some(ChartPixelKind::Grid)
    );
    assert_eq!(
        detector.classify_chart_pixel([200, 200, 200, 255], background),
        Some(ChartPixelKind::Line)
    );
    assert_eq!(detector.classify_chart_pixel(DARK_BACKGROUND, background), None);
    // 채도가 높은 비캔들 색상은 제외
    assert_eq!(detector.classify_chart_pixel([40, 40, 200, 255], background), None);
}
