use common_test_utils::*;

use chart_vision::config::GeometryConfig;
use chart_vision::model::{CandleColor, PixelClass};
use chart_vision::vision::{CandleGeometryAnalyzer, ColorClassifier, RejectReason, Segment};

/// 어두운 500x400 배경 위의 녹색 2개, 적색 1개 사각형
fn three_rectangle_chart() -> (chart_vision::bitmap::Bitmap, Vec<Segment>) {
    let mut bitmap = canvas(500, 400, DARK_BACKGROUND);
    bitmap.fill_rect(100, 100, 40, 120, BULL_GREEN);
    bitmap.fill_rect(200, 80, 40, 150, BULL_GREEN);
    bitmap.fill_rect(300, 150, 40, 100, BEAR_RED);

    // 세그먼트 면적 제한보다 큰 사각형이므로 경계 상자를 직접 지정
    let segments = vec![
        Segment::from_box(300, 150, 339, 249, PixelClass::Bearish),
        Segment::from_box(100, 100, 139, 219, PixelClass::Bullish),
        Segment::from_box(200, 80, 239, 229, PixelClass::Bullish),
    ];
    (bitmap, segments)
}

#[test]
fn test_solid_rectangles_accepted_as_candles() {
    let (bitmap, segments) = three_rectangle_chart();
    let map = ColorClassifier::default().classify(&bitmap);
    let candles = CandleGeometryAnalyzer::default().analyze(&map, &segments);

    assert_eq!(candles.len(), 3);
    // x 위치 순으로 정렬됨
    assert_eq!(candles[0].x1, 100);
    assert_eq!(candles[1].x1, 200);
    assert_eq!(candles[2].x1, 300);

    assert_eq!(candles[0].color, CandleColor::Bullish);
    assert_eq!(candles[1].color, CandleColor::Bullish);
    assert_eq!(candles[2].color, CandleColor::Bearish);
    for candle in &candles {
        assert!(candle.confidence >= 20);
        assert_eq!(candle.confidence, 100);
    }
    assert_eq!(candles[1].height(), 150);
    assert_eq!(candles[2].width(), 40);
}

#[test]
fn test_squat_segment_rejected() {
    let map = class_map_with_boxes(100, 100, &[((10, 10, 49, 29), PixelClass::Bullish)]);
    let segment = Segment::from_box(10, 10, 49, 29, PixelClass::Bullish);

    let result = CandleGeometryAnalyzer::default().evaluate(&map, &segment);
    assert_eq!(result, Err(RejectReason::TooSquat));
}

#[test]
fn test_sparse_segment_rejected() {
    let map = class_map_with_boxes(100, 100, &[((10, 10, 11, 11), PixelClass::Bullish)]);
    let segment = Segment::from_box(10, 10, 29, 39, PixelClass::Bullish);

    let result = CandleGeometryAnalyzer::default().evaluate(&map, &segment);
    assert_eq!(result, Err(RejectReason::TooFewColoredPixels));
}

#[test]
fn test_low_density_segment_rejected() {
    // 20x40 상자 안에 색상 픽셀 30개 → 신뢰도 4
    let map = class_map_with_boxes(100, 100, &[((10, 10, 12, 19), PixelClass::Bearish)]);
    let segment = Segment::from_box(10, 10, 29, 49, PixelClass::Bearish);

    let result = CandleGeometryAnalyzer::default().evaluate(&map, &segment);
    assert_eq!(result, Err(RejectReason::LowConfidence));
}

#[test]
fn test_dark_pixels_fold_into_bearish() {
    // 10x20 상자: 어두운 픽셀 150개, 상승 픽셀 50개
    let map = class_map_with_boxes(
        50,
        50,
        &[
            ((5, 5, 14, 19), PixelClass::Dark),
            ((5, 20, 14, 24), PixelClass::Bullish),
        ],
    );
    let segment = Segment::from_box(5, 5, 14, 24, PixelClass::Dark);

    let candidate = CandleGeometryAnalyzer::default()
        .evaluate(&map, &segment)
        .expect("후보여야 함");
    assert_eq!(candidate.color, CandleColor::Bearish);
    assert_eq!(candidate.confidence, 75);
}

#[test]
fn test_color_tie_resolves_to_bullish() {
    let map = class_map_with_boxes(
        50,
        50,
        &[
            ((5, 5, 14, 14), PixelClass::Bullish),
            ((5, 15, 14, 24), PixelClass::Bearish),
        ],
    );
    let segment = Segment::from_box(5, 5, 14, 24, PixelClass::Bullish);

    let candidate = CandleGeometryAnalyzer::default()
        .evaluate(&map, &segment)
        .expect("후보여야 함");
    assert_eq!(candidate.color, CandleColor::Bullish);
    assert_eq!(candidate.confidence, 50);
}

#[test]
fn test_overlapping_candidates_keep_highest_confidence() {
    let map = class_map_with_boxes(
        200,
        120,
        &[
            ((100, 10, 109, 90), PixelClass::Bullish),
            ((150, 10, 159, 90), PixelClass::Bearish),
        ],
    );
    let segments = vec![
        // 테두리처럼 바깥을 감싼 후보 (신뢰도 68)
        Segment::from_box(98, 8, 111, 92, PixelClass::Light),
        Segment::from_box(100, 10, 109, 90, PixelClass::Bullish),
        Segment::from_box(150, 10, 159, 90, PixelClass::Bearish),
    ];

    let candles = CandleGeometryAnalyzer::default().analyze(&map, &segments);
    assert_eq!(candles.len(), 2);
    assert_eq!((candles[0].x1, candles[0].confidence), (100, 100));
    assert_eq!(candles[1].color, CandleColor::Bearish);
}

#[test]
fn test_custom_aspect_ratio() {
    let map = class_map_with_boxes(100, 100, &[((10, 10, 49, 29), PixelClass::Bullish)]);
    let segment = Segment::from_box(10, 10, 49, 29, PixelClass::Bullish);
    let analyzer = CandleGeometryAnalyzer::new(GeometryConfig {
        min_aspect_ratio: 0.4,
        ..GeometryConfig::default()
    });

    let candidate = analyzer.evaluate(&map, &segment).expect("후보여야 함");
    assert_eq!(candidate.confidence, 100);
}
