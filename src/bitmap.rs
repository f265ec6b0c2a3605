use crate::error::{VisionError, VisionResult};
use crate::model::Region;

/// RGBA 픽셀 (채널당 1바이트)
pub type Rgba = [u8; 4];

/// 한 픽셀의 채널 수
const CHANNELS: usize = 4;

/// RGBA 비트맵
///
/// 호출마다 소유되는 픽셀 버퍼입니다. 파이프라인 단계들은 원본을 수정하지 않고
/// 항상 새 비트맵을 반환합니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

/// Rec. 601 밝기
pub fn luminance(r: u8, g: u8, b: u8) -> f64 {
    0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64
}

impl Bitmap {
    /// 원시 RGBA 버퍼로부터 비트맵 생성
    ///
    /// # Arguments
    /// * `width` - 이미지 너비
    /// * `height` - 이미지 높이
    /// * `data` - `width * height * 4` 바이트의 RGBA 버퍼
    ///
    /// # Returns
    /// * `VisionResult<Bitmap>` - 버퍼 길이가 맞지 않거나 크기 계산이 넘치면 `InvalidBuffer`
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> VisionResult<Bitmap> {
        // 곱이 넘치면 usize::MAX (4의 배수가 아니므로 어떤 버퍼와도 불일치)
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(CHANNELS))
            .unwrap_or(usize::MAX);
        if data.len() != expected {
            return Err(VisionError::InvalidBuffer {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }

        Ok(Bitmap {
            width,
            height,
            data,
        })
    }

    /// 단색으로 채워진 비트맵 생성
    pub fn filled(width: usize, height: usize, color: Rgba) -> Bitmap {
        let mut data = Vec::with_capacity(width * height * CHANNELS);
        for _ in 0..width * height {
            data.extend_from_slice(&color);
        }
        Bitmap {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// 전체 픽셀 수
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// 원시 RGBA 버퍼
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    /// 비트맵을 소비하고 원시 버퍼 반환
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    fn offset(&self, x: usize, y: usize) -> usize {
        (y * self.width + x) * CHANNELS
    }

    /// 지정 좌표의 픽셀
    ///
    /// # Panics
    /// * 좌표가 이미지 범위를 벗어나면 패닉 발생
    pub fn pixel(&self, x: usize, y: usize) -> Rgba {
        let i = self.offset(x, y);
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    /// 범위를 확인하는 픽셀 조회
    pub fn get_pixel(&self, x: usize, y: usize) -> Option<Rgba> {
        if x < self.width && y < self.height {
            Some(self.pixel(x, y))
        } else {
            None
        }
    }

    /// 지정 좌표의 픽셀 설정 (범위 밖이면 무시)
    pub fn set_pixel(&mut self, x: usize, y: usize, color: Rgba) {
        if x < self.width && y < self.height {
            let i = self.offset(x, y);
            self.data[i..i + CHANNELS].copy_from_slice(&color);
        }
    }

    /// 사각형 영역을 단색으로 채움 (이미지 범위로 잘림)
    pub fn fill_rect(&mut self, x: usize, y: usize, width: usize, height: usize, color: Rgba) {
        let x_end = (x + width).min(self.width);
        let y_end = (y + height).min(self.height);
        for py in y..y_end {
            for px in x..x_end {
                self.set_pixel(px, py, color);
            }
        }
    }

    /// 지정 좌표의 밝기
    pub fn luminance_at(&self, x: usize, y: usize) -> f64 {
        let [r, g, b, _] = self.pixel(x, y);
        luminance(r, g, b)
    }

    /// 행 단위 픽셀 순회 (위에서 아래, 왼쪽에서 오른쪽)
    pub fn pixels(&self) -> impl Iterator<Item = (usize, usize, Rgba)> + '_ {
        self.data
            .chunks_exact(CHANNELS)
            .enumerate()
            .map(move |(i, p)| (i % self.width, i / self.width, [p[0], p[1], p[2], p[3]]))
    }

    /// 영역을 잘라낸 새 비트맵 반환
    ///
    /// 영역이 이미지를 벗어나면 이미지 경계로 잘립니다.
    pub fn crop(&self, region: &Region) -> Bitmap {
        let x0 = region.x.min(self.width);
        let y0 = region.y.min(self.height);
        let x1 = (region.x + region.width).min(self.width);
        let y1 = (region.y + region.height).min(self.height);
        let width = x1 - x0;
        let height = y1 - y0;

        let mut data = Vec::with_capacity(width * height * CHANNELS);
        for y in y0..y1 {
            let start = self.offset(x0, y);
            data.extend_from_slice(&self.data[start..start + width * CHANNELS]);
        }

        Bitmap {
            width,
            height,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_length_checked() {
        let result = Bitmap::new(2, 2, vec![0; 15]);
        assert!(matches!(
            result,
            Err(VisionError::InvalidBuffer {
                expected: 16,
                actual: 15,
                ..
            })
        ));
        assert!(Bitmap::new(2, 2, vec![0; 16]).is_ok());
    }

    #[test]
    fn test_oversized_dimensions_rejected() {
        let result = Bitmap::new(usize::MAX / 2, 3, Vec::new());
        assert!(matches!(
            result,
            Err(VisionError::InvalidBuffer {
                expected: usize::MAX,
                actual: 0,
                ..
            })
        ));
    }

    #[test]
    fn test_crop_copies_region() {
        let mut bitmap = Bitmap::filled(10, 10, [0, 0, 0, 255]);
        bitmap.set_pixel(3, 4, [255, 0, 0, 255]);

        let cropped = bitmap.crop(&Region::new(2, 3, 4, 4));
        assert_eq!(cropped.width(), 4);
        assert_eq!(cropped.height(), 4);
        assert_eq!(cropped.pixel(1, 1), [255, 0, 0, 255]);
        // 원본은 그대로 유지
        assert_eq!(bitmap.pixel(3, 4), [255, 0, 0, 255]);
    }

    #[test]
    fn test_crop_clamped_to_image() {
        let bitmap = Bitmap::filled(10, 10, [1, 2, 3, 255]);
        let cropped = bitmap.crop(&Region::new(8, 8, 5, 5));
        assert_eq!((cropped.width(), cropped.height()), (2, 2));
    }

    #[test]
    fn test_pixels_iterate_in_raster_order() {
        let bitmap = Bitmap::filled(3, 2, [0, 0, 0, 255]);
        let coords: Vec<(usize, usize)> = bitmap.pixels().map(|(x, y, _)| (x, y)).collect();
        assert_eq!(coords, vec![(0, 0), (1, 0), (2, 0), (0, 1), (1, 1), (2, 1)]);
    }
}
