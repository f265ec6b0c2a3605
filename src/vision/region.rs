use crate::bitmap::{Bitmap, Rgba, luminance};
use crate::config::{ColorConfig, RegionConfig};
use crate::model::{PixelClass, Region, RegionSource};
use crate::vision::color::ColorClassifier;
use log::{debug, warn};
use serde::Serialize;

/// 차트처럼 보이는 픽셀 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartPixelKind {
    /// 배경보다 약간 밝거나 어두운 무채색 (격자선)
    Grid,
    /// 상승/하락 캔들 색상
    Candle,
    /// 배경과 크게 다른 무채색 (축, 추세선, 캔들 심지)
    Line,
}

/// 영역 감지 결과
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionDetection {
    pub region: Region,
    pub source: RegionSource,
}

impl RegionDetection {
    /// 실제로 감지된 영역인지
    pub fn is_detected(&self) -> bool {
        self.source == RegionSource::Detected
    }
}

/// 차트 플롯 영역 감지기
///
/// 감지에 실패하면 항상 이미지 중앙 85% 영역으로 대체하므로 실패하지 않습니다.
#[derive(Debug, Clone, Default)]
pub struct RegionDetector {
    config: RegionConfig,
    classifier: ColorClassifier,
}

/// 누적 경계 상자 (포함 좌표)
#[derive(Debug, Clone, Copy)]
struct Bounds {
    min_x: usize,
    min_y: usize,
    max_x: usize,
    max_y: usize,
}

impl Bounds {
    fn new(x: usize, y: usize) -> Self {
        Bounds {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        }
    }

    fn include(&mut self, x: usize, y: usize) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }
}

/// 종류별 차트 픽셀 수
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct KindCounts {
    candle: usize,
    grid: usize,
    line: usize,
}

impl KindCounts {
    fn add(&mut self, kind: ChartPixelKind) {
        match kind {
            ChartPixelKind::Candle => self.candle += 1,
            ChartPixelKind::Grid => self.grid += 1,
            ChartPixelKind::Line => self.line += 1,
        }
    }
}

fn chroma(pixel: Rgba) -> u8 {
    let [r, g, b, _] = pixel;
    r.max(g).max(b) - r.min(g).min(b)
}

impl RegionDetector {
    pub fn new(config: RegionConfig, color: ColorConfig) -> RegionDetector {
        RegionDetector {
            config,
            classifier: ColorClassifier::new(color),
        }
    }

    /// 네 모서리 픽셀의 평균 밝기를 배경 밝기로 추정
    fn background_luminance(bitmap: &Bitmap) -> f64 {
        let (w, h) = (bitmap.width(), bitmap.height());
        let corners = [(0, 0), (w - 1, 0), (0, h - 1), (w - 1, h - 1)];
        corners
            .iter()
            .map(|&(x, y)| bitmap.luminance_at(x, y))
            .sum::<f64>()
            / corners.len() as f64
    }

    /// 픽셀 하나를 차트 요소로 분류
    pub fn classify_chart_pixel(&self, pixel: Rgba, background: f64) -> Option<ChartPixelKind> {
        match self.classifier.classify_pixel(pixel) {
            PixelClass::Bullish | PixelClass::Bearish => return Some(ChartPixelKind::Candle),
            _ => {}
        }

        if chroma(pixel) > self.config.max_chroma {
            return None;
        }

        let [r, g, b, _] = pixel;
        let delta = (luminance(r, g, b) - background).abs();
        if delta >= self.config.grid_max_delta {
            Some(ChartPixelKind::Line)
        } else if delta >= self.config.grid_min_delta {
            Some(ChartPixelKind::Grid)
        } else {
            None
        }
    }

    /// 중앙 영역 (기본값)
    pub fn fallback_region(&self, width: usize, height: usize) -> Region {
        let w = ((width as f64 * self.config.fallback_ratio).round() as usize).min(width);
        let h = ((height as f64 * self.config.fallback_ratio).round() as usize).min(height);
        Region::new((width - w) / 2, (height - h) / 2, w, h)
    }

    fn assumed(&self, bitmap: &Bitmap) -> RegionDetection {
        RegionDetection {
            region: self.fallback_region(bitmap.width(), bitmap.height()),
            source: RegionSource::Assumed,
        }
    }

    /// 차트 픽셀의 경계 상자와 종류별 개수
    fn scan(&self, bitmap: &Bitmap, background: f64) -> (Option<Bounds>, KindCounts) {
        let mut bounds: Option<Bounds> = None;
        let mut counts = KindCounts::default();

        for (x, y, pixel) in bitmap.pixels() {
            if let Some(kind) = self.classify_chart_pixel(pixel, background) {
                counts.add(kind);
                match bounds.as_mut() {
                    Some(b) => b.include(x, y),
                    None => bounds = Some(Bounds::new(x, y)),
                }
            }
        }
        (bounds, counts)
    }

    /// 차트 영역 감지
    pub fn detect(&self, bitmap: &Bitmap) -> RegionDetection {
        let (width, height) = (bitmap.width(), bitmap.height());
        if width == 0 || height == 0 {
            return self.assumed(bitmap);
        }

        let background = Self::background_luminance(bitmap);
        let (bounds, counts) = self.scan(bitmap, background);

        let Some(bounds) = bounds else {
            warn!("차트 요소를 찾지 못함, 중앙 영역 사용");
            return self.assumed(bitmap);
        };

        let margin_x = (width as f64 * self.config.margin_ratio).round() as usize;
        let margin_y = (height as f64 * self.config.margin_ratio).round() as usize;
        let x0 = bounds.min_x.saturating_sub(margin_x);
        let y0 = bounds.min_y.saturating_sub(margin_y);
        let x1 = (bounds.max_x + margin_x).min(width - 1);
        let y1 = (bounds.max_y + margin_y).min(height - 1);
        let region = Region::new(x0, y0, x1 - x0 + 1, y1 - y0 + 1);

        debug!(
            "차트 픽셀 캔들 {}개, 격자 {}개, 선 {}개, 후보 영역 {:?} (배경 밝기 {:.1})",
            counts.candle, counts.grid, counts.line, region, background
        );

        let big_enough = region.width > self.config.min_size && region.height > self.config.min_size;
        let covers = region.width as f64 >= width as f64 * self.config.min_coverage
            && region.height as f64 >= height as f64 * self.config.min_coverage;

        if big_enough && covers {
            RegionDetection {
                region,
                source: RegionSource::Detected,
            }
        } else {
            warn!("감지된 영역이 너무 작음 ({:?}), 중앙 영역 사용", region);
            self.assumed(bitmap)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_counts_each_kind() {
        let mut bitmap = Bitmap::filled(40, 30, [10, 10, 10, 255]);
        bitmap.fill_rect(5, 5, 2, 10, [30, 200, 60, 255]);
        bitmap.fill_rect(0, 20, 40, 1, [40, 40, 40, 255]);
        bitmap.fill_rect(30, 2, 1, 5, [220, 220, 220, 255]);

        let (bounds, counts) = RegionDetector::default().scan(&bitmap, 10.0);
        assert_eq!(
            counts,
            KindCounts {
                candle: 20,
                grid: 40,
                line: 5,
            }
        );
        let bounds = bounds.expect("차트 픽셀이 있어야 함");
        assert_eq!((bounds.min_x, bounds.min_y, bounds.max_x, bounds.max_y), (0, 2, 39, 20));
    }
}
