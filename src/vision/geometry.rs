use crate::config::GeometryConfig;
use crate::model::{CandleColor, PixelClass, Point};
use crate::vision::color::ClassMap;
use crate::vision::segment::Segment;
use log::{debug, trace};

/// 형상 검증을 통과한 캔들 후보
#[derive(Debug, Clone, PartialEq)]
pub struct CandleCandidate {
    pub x1: usize,
    pub y1: usize,
    pub x2: usize,
    pub y2: usize,
    pub centroid: Point,
    pub color: CandleColor,
    /// 0~100
    pub confidence: u8,
}

impl CandleCandidate {
    pub fn width(&self) -> usize {
        self.x2 - self.x1 + 1
    }

    pub fn height(&self) -> usize {
        self.y2 - self.y1 + 1
    }

    /// 다른 후보와 가로로 겹치는 픽셀 수
    fn horizontal_overlap(&self, other: &CandleCandidate) -> usize {
        let start = self.x1.max(other.x1);
        let end = self.x2.min(other.x2);
        if end >= start { end - start + 1 } else { 0 }
    }
}

/// 세그먼트가 거부된 이유
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// 높이/너비 비율이 너무 작음
    TooSquat,
    /// 색상 픽셀이 너무 적음
    TooFewColoredPixels,
    /// 신뢰도가 너무 낮음
    LowConfidence,
}

/// 경계 상자 안의 분류별 픽셀 수
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassTally {
    pub bullish: usize,
    pub bearish: usize,
    pub dark: usize,
    pub light: usize,
}

impl ClassTally {
    fn count(map: &ClassMap, x1: usize, y1: usize, x2: usize, y2: usize) -> ClassTally {
        let mut tally = ClassTally::default();
        for y in y1..=y2 {
            for x in x1..=x2 {
                match map.get(x, y) {
                    PixelClass::Bullish => tally.bullish += 1,
                    PixelClass::Bearish => tally.bearish += 1,
                    PixelClass::Dark => tally.dark += 1,
                    PixelClass::Light => tally.light += 1,
                    PixelClass::None => {}
                }
            }
        }
        tally
    }

    /// 어두운 픽셀은 하락으로, 밝은 픽셀은 상승으로 합산 (더 많을 때만)
    ///
    /// # Returns
    /// * `(usize, usize)` - (상승, 하락) 픽셀 수
    fn folded(&self) -> (usize, usize) {
        let mut bullish = self.bullish;
        let mut bearish = self.bearish;
        if self.dark > bearish {
            bearish += self.dark;
        }
        if self.light > bullish {
            bullish += self.light;
        }
        (bullish, bearish)
    }
}

/// 캔들 형상 분석기
///
/// 비율 검사 후 색상 순도 검사를 거쳐 텍스트, 격자선, UI 요소 같은 오탐을 걸러냅니다.
#[derive(Debug, Clone, Default)]
pub struct CandleGeometryAnalyzer {
    config: GeometryConfig,
}

impl CandleGeometryAnalyzer {
    pub fn new(config: GeometryConfig) -> CandleGeometryAnalyzer {
        CandleGeometryAnalyzer { config }
    }

    /// 세그먼트 하나 검증
    ///
    /// # Arguments
    /// * `map` - 세그먼트를 만든 분류 맵
    /// * `segment` - 검증할 세그먼트
    ///
    /// # Returns
    /// * `Result<CandleCandidate, RejectReason>` - 캔들 후보 또는 거부 이유
    pub fn evaluate(
        &self,
        map: &ClassMap,
        segment: &Segment,
    ) -> Result<CandleCandidate, RejectReason> {
        let box_width = segment.width();
        let box_height = segment.height();

        if (box_height as f64 / box_width as f64) < self.config.min_aspect_ratio {
            return Err(RejectReason::TooSquat);
        }

        let tally = ClassTally::count(map, segment.x1, segment.y1, segment.x2, segment.y2);
        let (bullish, bearish) = tally.folded();
        let total = bullish + bearish;
        if total < self.config.min_colored_pixels {
            return Err(RejectReason::TooFewColoredPixels);
        }

        let (color, dominant) = if bearish > bullish {
            (CandleColor::Bearish, bearish)
        } else {
            (CandleColor::Bullish, bullish)
        };

        let color_ratio = dominant as f64 / total as f64;
        let density_ratio = total as f64 / (box_width * box_height) as f64;
        let confidence = (color_ratio * density_ratio * 100.0).min(100.0).round() as u8;
        if confidence < self.config.min_confidence {
            return Err(RejectReason::LowConfidence);
        }

        Ok(CandleCandidate {
            x1: segment.x1,
            y1: segment.y1,
            x2: segment.x2,
            y2: segment.y2,
            centroid: segment.centroid,
            color,
            confidence,
        })
    }

    /// 세그먼트들을 검증하고 x 위치 순으로 정렬된 캔들 후보 반환
    ///
    /// 같은 시간 축(가로 위치)을 공유하는 후보들 중에서는 신뢰도가 가장 높은 것만 남깁니다.
    /// 신뢰도가 같으면 먼저 발견된 후보가 남습니다.
    pub fn analyze(&self, map: &ClassMap, segments: &[Segment]) -> Vec<CandleCandidate> {
        let mut accepted: Vec<CandleCandidate> = Vec::new();
        let mut rejected = 0usize;

        for segment in segments {
            match self.evaluate(map, segment) {
                Ok(candidate) => accepted.push(candidate),
                Err(reason) => {
                    trace!(
                        "세그먼트 거부 ({},{})-({},{}): {:?}",
                        segment.x1, segment.y1, segment.x2, segment.y2, reason
                    );
                    rejected += 1;
                }
            }
        }

        let candles = self.suppress_overlaps(accepted);
        debug!(
            "형상 검증: 캔들 {}개, 거부 {}개",
            candles.len(),
            rejected
        );
        candles
    }

    fn suppress_overlaps(&self, candidates: Vec<CandleCandidate>) -> Vec<CandleCandidate> {
        // 신뢰도 내림차순, 같으면 발견 순서 유지 (stable sort)
        let mut ranked = candidates;
        ranked.sort_by(|a, b| b.confidence.cmp(&a.confidence));

        let mut kept: Vec<CandleCandidate> = Vec::new();
        for candidate in ranked {
            let collides = kept.iter().any(|k| {
                let narrower = candidate.width().min(k.width()) as f64;
                candidate.horizontal_overlap(k) as f64 > narrower * self.config.max_horizontal_overlap
            });
            if !collides {
                kept.push(candidate);
            }
        }

        kept.sort_by(|a, b| a.centroid.x.total_cmp(&b.centroid.x));
        kept
    }
}
