use crate::config::SegmentationConfig;
use crate::model::{PixelClass, Point};
use crate::vision::color::ClassMap;
use log::debug;
use std::collections::VecDeque;

/// 같은 분류의 픽셀이 연결된 캔들 후보
///
/// 경계 상자 좌표는 양 끝을 포함합니다.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub x1: usize,
    pub y1: usize,
    pub x2: usize,
    pub y2: usize,
    /// 픽셀 수
    pub area: usize,
    /// 픽셀 무게중심
    pub centroid: Point,
    pub class: PixelClass,
}

impl Segment {
    /// 경계 상자 너비 (픽셀)
    pub fn width(&self) -> usize {
        self.x2 - self.x1 + 1
    }

    /// 경계 상자 높이 (픽셀)
    pub fn height(&self) -> usize {
        self.y2 - self.y1 + 1
    }

    /// 경계 상자로만 정의된 세그먼트 (무게중심은 상자 중심)
    ///
    /// # Panics
    /// * `x2 < x1` 또는 `y2 < y1`이면 패닉 발생
    pub fn from_box(x1: usize, y1: usize, x2: usize, y2: usize, class: PixelClass) -> Segment {
        assert!(
            x2 >= x1 && y2 >= y1,
            "잘못된 경계 상자: ({}, {})-({}, {})",
            x1,
            y1,
            x2,
            y2
        );
        Segment {
            x1,
            y1,
            x2,
            y2,
            area: (x2 - x1 + 1) * (y2 - y1 + 1),
            centroid: Point::new((x1 + x2) as f64 / 2.0, (y1 + y2) as f64 / 2.0),
            class,
        }
    }
}

/// 분할 결과와 작업량 통계
#[derive(Debug, Clone)]
pub struct Segmentation {
    pub segments: Vec<Segment>,
    /// 방문한 픽셀 수 (각 픽셀은 최대 한 번)
    pub visited_pixels: usize,
    /// 크기 조건으로 버려진 연결 요소 수
    pub rejected_components: usize,
}

/// 8-연결 BFS 기반 캔들 분할기
#[derive(Debug, Clone, Default)]
pub struct CandleSegmenter {
    config: SegmentationConfig,
}

const NEIGHBORS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

impl CandleSegmenter {
    pub fn new(config: SegmentationConfig) -> CandleSegmenter {
        CandleSegmenter { config }
    }

    /// 분류 맵을 연결 요소로 분할
    ///
    /// 시작 픽셀은 위에서 아래, 왼쪽에서 오른쪽 순서로 선택되므로 결과 순서가 결정적입니다.
    /// 방문 집합은 호출마다 새로 만들어지고 반환 시 버려집니다.
    pub fn segment(&self, map: &ClassMap) -> Segmentation {
        let (width, height) = (map.width(), map.height());
        let mut visited = vec![false; width * height];
        let mut queue = VecDeque::new();
        let mut segments = Vec::new();
        let mut visited_pixels = 0usize;
        let mut rejected_components = 0usize;

        for start_y in 0..height {
            for start_x in 0..width {
                let start = start_y * width + start_x;
                let class = map.get(start_x, start_y);
                if visited[start] || class == PixelClass::None {
                    continue;
                }

                visited[start] = true;
                visited_pixels += 1;
                queue.push_back((start_x, start_y));

                let (mut x1, mut y1, mut x2, mut y2) = (start_x, start_y, start_x, start_y);
                let (mut area, mut sum_x, mut sum_y) = (0usize, 0usize, 0usize);

                while let Some((x, y)) = queue.pop_front() {
                    area += 1;
                    sum_x += x;
                    sum_y += y;
                    x1 = x1.min(x);
                    y1 = y1.min(y);
                    x2 = x2.max(x);
                    y2 = y2.max(y);

                    for (dx, dy) in NEIGHBORS {
                        let nx = x as isize + dx;
                        let ny = y as isize + dy;
                        if nx < 0 || ny < 0 || nx >= width as isize || ny >= height as isize {
                            continue;
                        }
                        let (nx, ny) = (nx as usize, ny as usize);
                        let idx = ny * width + nx;
                        if !visited[idx] && map.get(nx, ny) == class {
                            visited[idx] = true;
                            visited_pixels += 1;
                            queue.push_back((nx, ny));
                        }
                    }
                }

                let sized = area >= self.config.min_area && area <= self.config.max_area;
                // 한 행 또는 한 열뿐인 요소는 노이즈
                if sized && x2 > x1 && y2 > y1 {
                    segments.push(Segment {
                        x1,
                        y1,
                        x2,
                        y2,
                        area,
                        centroid: Point::new(
                            sum_x as f64 / area as f64,
                            sum_y as f64 / area as f64,
                        ),
                        class,
                    });
                } else {
                    rejected_components += 1;
                }
            }
        }

        debug!(
            "분할 완료: 후보 {}개, 버려진 요소 {}개, 방문 픽셀 {}",
            segments.len(),
            rejected_components,
            visited_pixels
        );

        Segmentation {
            segments,
            visited_pixels,
            rejected_components,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map_from_rows(rows: &[&str]) -> ClassMap {
        let height = rows.len();
        let width = rows[0].len();
        let labels = rows
            .iter()
            .flat_map(|row| {
                row.chars().map(|c| match c {
                    'G' => PixelClass::Bullish,
                    'R' => PixelClass::Bearish,
                    'D' => PixelClass::Dark,
                    'L' => PixelClass::Light,
                    _ => PixelClass::None,
                })
            })
            .collect();
        ClassMap::from_labels(width, height, labels).unwrap()
    }

    #[test]
    fn test_diagonal_pixels_are_connected() {
        let map = map_from_rows(&[
            "G.....", //
            ".G....",
            "..G...",
            "...G..",
            "....G.",
        ]);
        let result = CandleSegmenter::default().segment(&map);
        assert_eq!(result.segments.len(), 1);
        let s = &result.segments[0];
        assert_eq!((s.x1, s.y1, s.x2, s.y2, s.area), (0, 0, 4, 4, 5));
    }

    #[test]
    fn test_different_classes_are_separate() {
        let map = map_from_rows(&[
            "GGRR", //
            "GGRR",
            "GGRR",
        ]);
        let result = CandleSegmenter::default().segment(&map);
        assert_eq!(result.segments.len(), 2);
        assert_eq!(result.segments[0].class, PixelClass::Bullish);
        assert_eq!(result.segments[1].class, PixelClass::Bearish);
        assert!((result.segments[0].centroid.x - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_and_small_components_rejected() {
        let map = map_from_rows(&[
            "GGGGGG..R", //
            ".........",
            "LL.......",
            "LL.......",
        ]);
        let result = CandleSegmenter::default().segment(&map);
        // 한 행짜리 녹색, 1픽셀 적색, 4픽셀 밝은 블록 모두 제외
        assert!(result.segments.is_empty());
        assert_eq!(result.rejected_components, 3);
    }

    #[test]
    fn test_oversized_component_rejected() {
        let labels = vec![PixelClass::Dark; 60 * 40];
        let map = ClassMap::from_labels(60, 40, labels).unwrap();
        let result = CandleSegmenter::default().segment(&map);
        assert!(result.segments.is_empty());
        assert_eq!(result.visited_pixels, 2400);
    }

    #[test]
    fn test_each_pixel_visited_at_most_once() {
        let map = map_from_rows(&[
            "GGG.RRR.DD", //
            "GGG.RRR.DD",
            "GGG.RRR.DD",
            "..........",
            "LLLLL.GGGG",
        ]);
        let result = CandleSegmenter::default().segment(&map);
        assert_eq!(result.visited_pixels, map.classified_count());
        let area_sum: usize = result.segments.iter().map(|s| s.area).sum();
        assert!(area_sum <= map.classified_count());
    }

    #[test]
    fn test_from_box_dimensions() {
        let segment = Segment::from_box(3, 4, 6, 10, PixelClass::Bullish);
        assert_eq!((segment.width(), segment.height(), segment.area), (4, 7, 28));
        assert_eq!(segment.centroid, Point::new(4.5, 7.0));
    }

    #[test]
    #[should_panic(expected = "잘못된 경계 상자")]
    fn test_from_box_rejects_inverted_box() {
        Segment::from_box(10, 0, 5, 4, PixelClass::Bullish);
    }
}
