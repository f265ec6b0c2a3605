use crate::bitmap::Bitmap;
use crate::config::LevelConfig;
use crate::validator::{LevelStrength, LevelType, PriceLevel};
use crate::vision::ohlc::PriceScale;
use log::debug;
use serde::Serialize;

/// 감지된 수평 지지/저항선
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct DetectedLine {
    /// 픽셀 행
    pub y: usize,
    /// 평활화된 행 밀도 (어두운 픽셀 수)
    pub density: f64,
    /// 0~100
    pub confidence: u8,
}

impl DetectedLine {
    /// 가격 척도를 이용해 가격 레벨로 변환
    ///
    /// 기준 가격 이하면 지지선, 위면 저항선입니다.
    pub fn to_price_level(
        &self,
        scale: &PriceScale,
        reference_price: f64,
        strong_confidence: u8,
    ) -> PriceLevel {
        let price = scale.price_at(self.y as f64);
        PriceLevel {
            price,
            level_type: if price <= reference_price {
                LevelType::Support
            } else {
                LevelType::Resistance
            },
            strength: if self.confidence >= strong_confidence {
                LevelStrength::Strong
            } else {
                LevelStrength::Weak
            },
            confidence: self.confidence as f64,
        }
    }
}

/// 행 밀도 히스토그램 기반 지지/저항선 감지기
#[derive(Debug, Clone, Default)]
pub struct SupportResistanceLineDetector {
    config: LevelConfig,
}

impl SupportResistanceLineDetector {
    pub fn new(config: LevelConfig) -> SupportResistanceLineDetector {
        SupportResistanceLineDetector { config }
    }

    /// 행마다 어두운 픽셀(r+g+b < 임계값) 수
    pub fn row_histogram(&self, bitmap: &Bitmap) -> Vec<usize> {
        let mut histogram = vec![0usize; bitmap.height()];
        for (_, y, [r, g, b, _]) in bitmap.pixels() {
            if (r as u32 + g as u32 + b as u32) < self.config.dark_sum_threshold {
                histogram[y] += 1;
            }
        }
        histogram
    }

    /// 이동평균 평활화 (이미지 경계에서 창이 잘리면 남은 행 수로 평균)
    pub fn smooth(&self, histogram: &[usize]) -> Vec<f64> {
        let radius = self.config.smoothing_radius;
        let n = histogram.len();
        (0..n)
            .map(|i| {
                let start = i.saturating_sub(radius);
                let end = (i + radius).min(n - 1);
                let window = &histogram[start..=end];
                window.iter().sum::<usize>() as f64 / window.len() as f64
            })
            .collect()
    }

    fn is_strict_local_max(&self, smoothed: &[f64], y: usize) -> bool {
        let radius = self.config.peak_radius;
        let start = y.saturating_sub(radius);
        let end = (y + radius).min(smoothed.len() - 1);
        (start..=end)
            .filter(|&j| j != y)
            .all(|j| smoothed[y] > smoothed[j])
    }

    /// 수평선 감지
    ///
    /// 위에서 아래로 훑으며, 이미 채택된 선과 최소 간격보다 가까운 후보는 강도와 무관하게 버립니다.
    pub fn detect(&self, bitmap: &Bitmap) -> Vec<DetectedLine> {
        let (width, height) = (bitmap.width(), bitmap.height());
        if width == 0 || height == 0 {
            return Vec::new();
        }

        let smoothed = self.smooth(&self.row_histogram(bitmap));
        let min_density = width as f64 * self.config.min_density_ratio;
        let min_spacing = height as f64 * self.config.min_spacing_ratio;

        let mut lines: Vec<DetectedLine> = Vec::new();
        for (y, &density) in smoothed.iter().enumerate() {
            if density <= min_density || !self.is_strict_local_max(&smoothed, y) {
                continue;
            }
            let spaced = lines
                .iter()
                .all(|line| (y as f64 - line.y as f64).abs() >= min_spacing);
            if !spaced {
                continue;
            }

            let confidence = (density / width as f64 * 100.0).round().min(100.0) as u8;
            lines.push(DetectedLine {
                y,
                density,
                confidence,
            });
        }

        debug!("지지/저항선 {}개 감지", lines.len());
        lines
    }
}
