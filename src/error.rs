/// 비전 파이프라인 입력 오류
///
/// 분석 자체를 시작할 수 없는 입력에 대해서만 사용됩니다.
/// 품질 저하나 영역 감지 실패 같은 상황은 오류가 아니라 경고와 함께 기본값으로 처리됩니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisionError {
    /// 버퍼 길이가 width * height * 4 와 맞지 않음
    InvalidBuffer {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },
    /// 이미지가 분석 가능한 최소 크기보다 작음
    ImageTooSmall {
        width: usize,
        height: usize,
        min_width: usize,
        min_height: usize,
    },
}

impl std::fmt::Display for VisionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VisionError::InvalidBuffer {
                width,
                height,
                expected,
                actual,
            } => write!(
                f,
                "잘못된 RGBA 버퍼: {}x{} 이미지는 {} 바이트가 필요하지만 {} 바이트가 주어짐",
                width, height, expected, actual
            ),
            VisionError::ImageTooSmall {
                width,
                height,
                min_width,
                min_height,
            } => write!(
                f,
                "이미지가 너무 작음: {}x{} (최소 {}x{})",
                width, height, min_width, min_height
            ),
        }
    }
}

impl std::error::Error for VisionError {}

/// 비전 파이프라인 결과
pub type VisionResult<T> = Result<T, VisionError>;
