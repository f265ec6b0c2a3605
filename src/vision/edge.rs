use crate::bitmap::{Bitmap, Rgba, luminance};
use crate::config::{EdgeConfig, GradientSource};
use log::trace;

/// 엣지로 판정된 픽셀 색상
const EDGE_MARKER: Rgba = [255, 255, 255, 255];

/// Sobel 엣지 강화기
///
/// 내부 픽셀마다 3x3 Sobel 경사도를 계산하고 임계값을 넘는 픽셀을 흰색으로 칠합니다.
/// 테두리 픽셀과 임계값 이하 픽셀은 원래 값을 유지합니다.
#[derive(Debug, Clone, Default)]
pub struct EdgeEnhancer {
    config: EdgeConfig,
}

impl EdgeEnhancer {
    pub fn new(config: EdgeConfig) -> EdgeEnhancer {
        EdgeEnhancer { config }
    }

    fn intensity(&self, bitmap: &Bitmap, x: usize, y: usize) -> f64 {
        let [r, g, b, _] = bitmap.pixel(x, y);
        match self.config.source {
            GradientSource::Red => r as f64,
            GradientSource::Luminance => luminance(r, g, b),
        }
    }

    /// 내부 픽셀의 경사도 크기
    ///
    /// # Panics
    /// * 테두리 픽셀이면 패닉 발생
    pub fn gradient_magnitude(&self, bitmap: &Bitmap, x: usize, y: usize) -> f64 {
        let p = |dx: isize, dy: isize| {
            let nx = (x as isize + dx) as usize;
            let ny = (y as isize + dy) as usize;
            self.intensity(bitmap, nx, ny)
        };

        let gx = (p(1, -1) + 2.0 * p(1, 0) + p(1, 1)) - (p(-1, -1) + 2.0 * p(-1, 0) + p(-1, 1));
        let gy = (p(-1, 1) + 2.0 * p(0, 1) + p(1, 1)) - (p(-1, -1) + 2.0 * p(0, -1) + p(1, -1));

        (gx * gx + gy * gy).sqrt()
    }

    /// 엣지를 강화한 새 비트맵 반환
    pub fn enhance(&self, bitmap: &Bitmap) -> Bitmap {
        let mut output = bitmap.clone();
        let (width, height) = (bitmap.width(), bitmap.height());
        if width < 3 || height < 3 {
            return output;
        }

        let mut edge_count = 0usize;
        for y in 1..height - 1 {
            for x in 1..width - 1 {
                if self.gradient_magnitude(bitmap, x, y) > self.config.threshold {
                    output.set_pixel(x, y, EDGE_MARKER);
                    edge_count += 1;
                }
            }
        }

        trace!("엣지 강화: {}개 픽셀 표시", edge_count);
        output
    }
}
