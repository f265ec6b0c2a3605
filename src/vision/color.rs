use crate::bitmap::{Bitmap, Rgba};
use crate::config::ColorConfig;
use crate::model::PixelClass;

/// 하이라이트용 상승 색상
const HIGHLIGHT_BULLISH: Rgba = [0, 255, 0, 255];
/// 하이라이트용 하락 색상
const HIGHLIGHT_BEARISH: Rgba = [255, 0, 0, 255];

/// 픽셀 분류 맵
///
/// 비트맵과 같은 크기의 격자에 픽셀마다 하나의 `PixelClass`를 저장합니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassMap {
    width: usize,
    height: usize,
    labels: Vec<PixelClass>,
}

impl ClassMap {
    /// 이미 계산된 라벨로 분류 맵 생성
    ///
    /// 라벨 수가 `width * height`와 다르거나 크기 계산이 넘치면 None
    pub fn from_labels(width: usize, height: usize, labels: Vec<PixelClass>) -> Option<ClassMap> {
        let expected = width.checked_mul(height)?;
        (labels.len() == expected).then_some(ClassMap {
            width,
            height,
            labels,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// 지정 좌표의 분류
    pub fn get(&self, x: usize, y: usize) -> PixelClass {
        self.labels[y * self.width + x]
    }

    pub fn labels(&self) -> &[PixelClass] {
        &self.labels
    }

    /// 분류된(None이 아닌) 픽셀 수
    pub fn classified_count(&self) -> usize {
        self.labels
            .iter()
            .filter(|&&c| c != PixelClass::None)
            .count()
    }

    /// 특정 분류의 픽셀 수
    pub fn count(&self, class: PixelClass) -> usize {
        self.labels.iter().filter(|&&c| c == class).count()
    }
}

/// 색상 분류기
///
/// 녹색=상승, 적색=하락, 어두운 배경이라는 하나의 차트 스타일에 맞춰진 휴리스틱입니다.
#[derive(Debug, Clone, Default)]
pub struct ColorClassifier {
    config: ColorConfig,
}

/// `dominant`가 두 채널보다 `ratio`배 넘게 크고 `min_channel`을 넘는지 확인
fn is_dominant(dominant: u8, other_a: u8, other_b: u8, ratio: f64, min_channel: u8) -> bool {
    let d = dominant as f64;
    d > ratio * other_a as f64 && d > ratio * other_b as f64 && dominant > min_channel
}

impl ColorClassifier {
    pub fn new(config: ColorConfig) -> ColorClassifier {
        ColorClassifier { config }
    }

    /// 분할용 임계값(1.2배)으로 픽셀 하나를 분류
    pub fn classify_pixel(&self, pixel: Rgba) -> PixelClass {
        let [r, g, b, _] = pixel;
        let ratio = self.config.segmentation_ratio;
        let min = self.config.min_channel;

        if is_dominant(g, r, b, ratio, min) {
            return PixelClass::Bullish;
        }
        if is_dominant(r, g, b, ratio, min) {
            return PixelClass::Bearish;
        }

        let mean = (r as f64 + g as f64 + b as f64) / 3.0;
        if mean < self.config.dark_threshold {
            PixelClass::Dark
        } else if mean > self.config.light_threshold {
            PixelClass::Light
        } else {
            PixelClass::None
        }
    }

    /// 비트맵 전체를 분류
    pub fn classify(&self, bitmap: &Bitmap) -> ClassMap {
        let labels = bitmap
            .pixels()
            .map(|(_, _, pixel)| self.classify_pixel(pixel))
            .collect();

        ClassMap {
            width: bitmap.width(),
            height: bitmap.height(),
            labels,
        }
    }

    /// 하이라이트용 임계값(1.5배)으로 강한 상승/하락 색상 판별
    ///
    /// 분류와는 별개의 더 엄격한 기준이며 화면 표시용으로만 사용됩니다.
    pub fn highlight_class(&self, pixel: Rgba) -> PixelClass {
        let [r, g, b, _] = pixel;
        let ratio = self.config.highlight_ratio;
        let min = self.config.min_channel;

        if is_dominant(g, r, b, ratio, min) {
            PixelClass::Bullish
        } else if is_dominant(r, g, b, ratio, min) {
            PixelClass::Bearish
        } else {
            PixelClass::None
        }
    }

    /// 강한 상승 픽셀은 순수 녹색, 강한 하락 픽셀은 순수 적색으로 칠한 새 비트맵 반환
    pub fn highlight(&self, bitmap: &Bitmap) -> Bitmap {
        let mut output = bitmap.clone();
        for (x, y, pixel) in bitmap.pixels() {
            match self.highlight_class(pixel) {
                PixelClass::Bullish => output.set_pixel(x, y, HIGHLIGHT_BULLISH),
                PixelClass::Bearish => output.set_pixel(x, y, HIGHLIGHT_BEARISH),
                _ => {}
            }
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> ColorClassifier {
        ColorClassifier::default()
    }

    #[test]
    fn test_classify_basic_colors() {
        let c = classifier();
        assert_eq!(c.classify_pixel([30, 200, 60, 255]), PixelClass::Bullish);
        assert_eq!(c.classify_pixel([220, 40, 40, 255]), PixelClass::Bearish);
        assert_eq!(c.classify_pixel([10, 10, 10, 255]), PixelClass::Dark);
        assert_eq!(c.classify_pixel([240, 240, 240, 255]), PixelClass::Light);
        assert_eq!(c.classify_pixel([128, 128, 128, 255]), PixelClass::None);
    }

    #[test]
    fn test_green_below_floor_is_not_bullish() {
        // 비율은 충분하지만 녹색 채널이 70 이하
        assert_eq!(classifier().classify_pixel([40, 65, 40, 255]), PixelClass::None);
    }

    #[test]
    fn test_highlight_threshold_is_stricter_than_segmentation() {
        let c = classifier();
        // g = 1.3 * r: 분할 기준(1.2)은 통과, 하이라이트 기준(1.5)은 실패
        let pixel = [100, 130, 100, 255];
        assert_eq!(c.classify_pixel(pixel), PixelClass::Bullish);
        assert_eq!(c.highlight_class(pixel), PixelClass::None);
        assert_eq!(c.highlight_class([50, 200, 50, 255]), PixelClass::Bullish);
        assert_eq!(c.highlight_class([200, 50, 50, 255]), PixelClass::Bearish);
    }

    #[test]
    fn test_classification_is_total_and_deterministic() {
        let c = classifier();
        let mut bitmap = Bitmap::filled(16, 16, [0, 0, 0, 255]);
        for (i, (x, y, _)) in Bitmap::filled(16, 16, [0, 0, 0, 255]).pixels().enumerate() {
            let v = (i * 37 % 256) as u8;
            bitmap.set_pixel(x, y, [v, v.wrapping_mul(3), v.wrapping_mul(7), 255]);
        }

        let first = c.classify(&bitmap);
        let second = c.classify(&bitmap);
        assert_eq!(first, second);
        assert_eq!(first.labels().len(), 256);
    }

    #[test]
    fn test_highlight_does_not_touch_source() {
        let c = classifier();
        let mut bitmap = Bitmap::filled(4, 4, [10, 10, 10, 255]);
        bitmap.set_pixel(1, 1, [40, 180, 40, 255]);
        let highlighted = c.highlight(&bitmap);
        assert_eq!(highlighted.pixel(1, 1), HIGHLIGHT_BULLISH);
        assert_eq!(bitmap.pixel(1, 1), [40, 180, 40, 255]);
        assert_eq!(highlighted.pixel(0, 0), [10, 10, 10, 255]);
    }

    #[test]
    fn test_from_labels_checks_size() {
        assert!(ClassMap::from_labels(2, 2, vec![PixelClass::None; 3]).is_none());
        assert!(ClassMap::from_labels(2, 2, vec![PixelClass::None; 4]).is_some());
        assert!(ClassMap::from_labels(usize::MAX, 2, Vec::new()).is_none());
    }
}
