use common_test_utils::*;

use chart_vision::config::SegmentationConfig;
use chart_vision::model::PixelClass;
use chart_vision::vision::{CandleSegmenter, ColorClassifier, EdgeEnhancer};

#[test]
fn test_classification_is_deterministic() {
    let (bitmap, _) = synthetic_chart(6);
    let classifier = ColorClassifier::default();

    let first = classifier.classify(&bitmap);
    let second = classifier.classify(&bitmap);
    assert_eq!(first, second);
    assert_eq!(first.labels().len(), 400 * 300);
}

#[test]
fn test_each_pixel_visited_at_most_once() {
    let (bitmap, _) = synthetic_chart(6);
    let enhanced = EdgeEnhancer::default().enhance(&bitmap);
    let map = ColorClassifier::default().classify(&enhanced);
    let segmentation = CandleSegmenter::default().segment(&map);

    assert!(segmentation.visited_pixels <= map.labels().len());
    assert_eq!(segmentation.visited_pixels, map.classified_count());

    let area_sum: usize = segmentation.segments.iter().map(|s| s.area).sum();
    assert!(area_sum <= map.classified_count());
}

#[test]
fn test_segments_in_raster_order() {
    let map = class_map_with_boxes(
        100,
        100,
        &[
            ((60, 10, 64, 30), PixelClass::Bearish),
            ((10, 40, 14, 60), PixelClass::Bullish),
            ((30, 10, 34, 30), PixelClass::Bullish),
        ],
    );
    let segments = CandleSegmenter::default().segment(&map).segments;

    let starts: Vec<(usize, usize)> = segments.iter().map(|s| (s.x1, s.y1)).collect();
    assert_eq!(starts, vec![(30, 10), (60, 10), (10, 40)]);
    assert_eq!(segments[0].area, 105);
    assert_eq!(segments[1].class, PixelClass::Bearish);
}

#[test]
fn test_size_limits() {
    let map = class_map_with_boxes(
        100,
        100,
        &[
            // 면적 4: 너무 작음
            ((1, 1, 2, 2), PixelClass::Bullish),
            // 한 행짜리 선
            ((10, 10, 40, 10), PixelClass::Bearish),
            // 50x50: 너무 큼
            ((50, 50, 99, 99), PixelClass::Dark),
            ((20, 30, 24, 45), PixelClass::Bullish),
        ],
    );
    let segmentation = CandleSegmenter::default().segment(&map);

    assert_eq!(segmentation.segments.len(), 1);
    assert_eq!(segmentation.rejected_components, 3);

    let relaxed = CandleSegmenter::new(SegmentationConfig {
        min_area: 1,
        max_area: 5000,
    })
    .segment(&map);
    assert_eq!(relaxed.segments.len(), 3);
}
