use crate::bitmap::Bitmap;
use crate::config::QualityConfig;
use log::debug;
use serde::Serialize;
use std::fmt::Display;

/// 이미지 품질 평가 결과
///
/// 평가 실패는 치명적이지 않으며, 호출자는 경고와 함께 분석을 계속할 수 있습니다.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct QualityReport {
    pub width: usize,
    pub height: usize,
    pub has_adequate_resolution: bool,
    /// 밝기 최대값 - 최소값
    pub contrast: f64,
    pub has_good_contrast: bool,
    /// 내부 픽셀의 평균 4-이웃 밝기 차이
    pub noise_level: f64,
    pub has_low_noise: bool,
    /// 세 항목을 모두 통과했는지
    pub is_acceptable: bool,
}

impl QualityReport {
    /// 항목별 판정 문구
    pub fn factor_summaries(&self) -> Vec<String> {
        vec![
            format!(
                "해상도: {} ({}x{})",
                if self.has_adequate_resolution {
                    "적합"
                } else {
                    "부족"
                },
                self.width,
                self.height
            ),
            format!(
                "대비: {} ({:.1})",
                if self.has_good_contrast {
                    "양호"
                } else {
                    "낮음"
                },
                self.contrast
            ),
            format!(
                "노이즈: {} ({:.1})",
                if self.has_low_noise { "낮음" } else { "높음" },
                self.noise_level
            ),
        ]
    }
}

impl Display for QualityReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "QualityReport {{ {}, {} }}",
            if self.is_acceptable {
                "통과"
            } else {
                "품질 저하"
            },
            self.factor_summaries().join(", ")
        )
    }
}

/// 이미지 품질 평가기
#[derive(Debug, Clone, Default)]
pub struct QualityAssessor {
    config: QualityConfig,
}

impl QualityAssessor {
    pub fn new(config: QualityConfig) -> QualityAssessor {
        QualityAssessor { config }
    }

    /// 비트맵 품질 평가
    pub fn assess(&self, bitmap: &Bitmap) -> QualityReport {
        let (width, height) = (bitmap.width(), bitmap.height());
        let has_adequate_resolution =
            width >= self.config.min_width && height >= self.config.min_height;

        let contrast = Self::contrast(bitmap);
        let noise_level = Self::noise_level(bitmap);
        let has_good_contrast = contrast > self.config.min_contrast;
        let has_low_noise = noise_level < self.config.max_noise;

        let report = QualityReport {
            width,
            height,
            has_adequate_resolution,
            contrast,
            has_good_contrast,
            noise_level,
            has_low_noise,
            is_acceptable: has_adequate_resolution && has_good_contrast && has_low_noise,
        };

        debug!("{}", report);
        report
    }

    /// 전체 버퍼의 밝기 범위
    fn contrast(bitmap: &Bitmap) -> f64 {
        let (min, max) = bitmap
            .pixels()
            .map(|(x, y, _)| bitmap.luminance_at(x, y))
            .fold((f64::MAX, f64::MIN), |(min, max), l| (min.min(l), max.max(l)));

        if bitmap.pixel_count() == 0 {
            0.0
        } else {
            max - min
        }
    }

    /// 내부 픽셀마다 네 이웃과의 평균 절대 밝기 차이를 구해 다시 평균
    fn noise_level(bitmap: &Bitmap) -> f64 {
        let (width, height) = (bitmap.width(), bitmap.height());
        if width < 3 || height < 3 {
            return 0.0;
        }

        let mut total = 0.0;
        for y in 1..height - 1 {
            for x in 1..width - 1 {
                let center = bitmap.luminance_at(x, y);
                let diff = (center - bitmap.luminance_at(x - 1, y)).abs()
                    + (center - bitmap.luminance_at(x + 1, y)).abs()
                    + (center - bitmap.luminance_at(x, y - 1)).abs()
                    + (center - bitmap.luminance_at(x, y + 1)).abs();
                total += diff / 4.0;
            }
        }

        total / ((width - 2) * (height - 2)) as f64
    }
}
