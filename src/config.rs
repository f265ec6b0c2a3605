use log::{debug, error, info, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 설정 로드 오류
#[derive(Debug)]
pub enum ConfigError {
    /// 파일 오류
    FileError(String),
    /// 파싱 오류
    ParseError(String),
    /// 유효성 검사 오류
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::FileError(msg) => write!(f, "설정 파일 오류: {}", msg),
            ConfigError::ParseError(msg) => write!(f, "설정 파싱 오류: {}", msg),
            ConfigError::ValidationError(msg) => write!(f, "설정 유효성 검사 오류: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// 설정 로드 결과
pub type ConfigResult<T> = Result<T, ConfigError>;

/// 설정 형식
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
    /// 파일 확장자로 판단 (문자열 입력이면 JSON 먼저 시도)
    Auto,
}

impl ConfigFormat {
    fn from_path(path: &Path) -> ConfigResult<ConfigFormat> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(ConfigFormat::Json),
            Some("toml") => Ok(ConfigFormat::Toml),
            _ => {
                warn!("지원되지 않는 설정 파일 형식: {}", path.display());
                Err(ConfigError::FileError(format!(
                    "파일 형식을 감지할 수 없음: {}",
                    path.display()
                )))
            }
        }
    }
}

/// 설정 유효성 검사 트레이트
pub trait ConfigValidation {
    fn validate(&self) -> ConfigResult<()>;
}

fn ensure(condition: bool, msg: impl FnOnce() -> String) -> ConfigResult<()> {
    if condition {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(msg()))
    }
}

/// 입력 이미지 최소 크기 (이보다 작으면 분석 거부)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub min_width: usize,
    pub min_height: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        ExtractionConfig {
            min_width: 50,
            min_height: 50,
        }
    }
}

/// 이미지 품질 평가 임계값
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    pub min_width: usize,
    pub min_height: usize,
    /// 밝기 최대-최소 차이가 이 값을 넘어야 대비가 좋음
    pub min_contrast: f64,
    /// 평균 이웃 밝기 차이가 이 값보다 작아야 노이즈가 낮음
    pub max_noise: f64,
}

impl Default for QualityConfig {
    fn default() -> Self {
        QualityConfig {
            min_width: 400,
            min_height: 300,
            min_contrast: 50.0,
            max_noise: 30.0,
        }
    }
}

/// 차트 영역 감지 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionConfig {
    /// 각 변에 추가하는 여백 (이미지 크기 대비)
    pub margin_ratio: f64,
    /// 감지된 영역의 최소 너비/높이 (초과해야 함)
    pub min_size: usize,
    /// 감지된 영역이 덮어야 하는 최소 비율 (각 축)
    pub min_coverage: f64,
    /// 감지 실패 시 사용할 중앙 영역 비율
    pub fallback_ratio: f64,
    /// 격자선으로 볼 배경 대비 밝기 차이 하한
    pub grid_min_delta: f64,
    /// 격자선으로 볼 배경 대비 밝기 차이 상한 (이상이면 선)
    pub grid_max_delta: f64,
    /// 무채색으로 볼 최대 채널 차이
    pub max_chroma: u8,
}

impl Default for RegionConfig {
    fn default() -> Self {
        RegionConfig {
            margin_ratio: 0.02,
            min_size: 100,
            min_coverage: 0.3,
            fallback_ratio: 0.85,
            grid_min_delta: 10.0,
            grid_max_delta: 80.0,
            max_chroma: 30,
        }
    }
}

/// 경사도 계산에 사용할 채널
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GradientSource {
    Red,
    Luminance,
}

/// 엣지 강화 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeConfig {
    /// 경사도 크기가 이 값을 넘으면 흰색으로 칠함
    pub threshold: f64,
    pub source: GradientSource,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        EdgeConfig {
            threshold: 25.0,
            source: GradientSource::Red,
        }
    }
}

/// 색상 분류 임계값
///
/// 분할용(1.2배)과 하이라이트용(1.5배) 비율은 의도적으로 다릅니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub segmentation_ratio: f64,
    pub highlight_ratio: f64,
    /// 우세 채널의 최소값 (초과해야 함)
    pub min_channel: u8,
    pub dark_threshold: f64,
    pub light_threshold: f64,
}

impl Default for ColorConfig {
    fn default() -> Self {
        ColorConfig {
            segmentation_ratio: 1.2,
            highlight_ratio: 1.5,
            min_channel: 70,
            dark_threshold: 30.0,
            light_threshold: 220.0,
        }
    }
}

/// 연결 요소 분할 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    pub min_area: usize,
    pub max_area: usize,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        SegmentationConfig {
            min_area: 5,
            max_area: 2000,
        }
    }
}

/// 캔들 형상 검증 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    /// 높이/너비 최소 비율
    pub min_aspect_ratio: f64,
    pub min_colored_pixels: usize,
    pub min_confidence: u8,
    /// 가로 겹침이 좁은 쪽 너비의 이 비율을 넘으면 같은 시간 축으로 판단
    pub max_horizontal_overlap: f64,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        GeometryConfig {
            min_aspect_ratio: 0.8,
            min_colored_pixels: 5,
            min_confidence: 20,
            max_horizontal_overlap: 0.5,
        }
    }
}

/// 합성 가격 매핑 설정
///
/// 실제 시세와 보정된 값이 아닌 임의의 가격대입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OhlcConfig {
    pub base_price: f64,
    pub price_range: f64,
    pub decimals: u32,
}

impl Default for OhlcConfig {
    fn default() -> Self {
        OhlcConfig {
            base_price: 100.0,
            price_range: 20.0,
            decimals: 4,
        }
    }
}

/// 지지/저항선 감지 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    /// r+g+b 가 이 값보다 작으면 어두운 픽셀
    pub dark_sum_threshold: u32,
    /// 이동평균 반경 (2 → 5행 창)
    pub smoothing_radius: usize,
    /// 이미지 너비 대비 최소 밀도
    pub min_density_ratio: f64,
    /// 지역 최대값 비교 반경
    pub peak_radius: usize,
    /// 이미지 높이 대비 최소 간격
    pub min_spacing_ratio: f64,
    /// 이 신뢰도 이상이면 강한 레벨
    pub strong_confidence: u8,
}

impl Default for LevelConfig {
    fn default() -> Self {
        LevelConfig {
            dark_sum_threshold: 450,
            smoothing_radius: 2,
            min_density_ratio: 0.2,
            peak_radius: 2,
            min_spacing_ratio: 0.03,
            strong_confidence: 50,
        }
    }
}

/// 오버레이 요소 구성 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementConfig {
    /// 이 신뢰도보다 낮은 캔들은 이상치로 표시
    pub anomaly_confidence: u8,
    pub circle_padding: f64,
    pub dash_pattern: Vec<f64>,
}

impl Default for ElementConfig {
    fn default() -> Self {
        ElementConfig {
            anomaly_confidence: 40,
            circle_padding: 4.0,
            dash_pattern: vec![6.0, 4.0],
        }
    }
}

/// M1 진입 컨텍스트 검증 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    pub min_candles: usize,
    pub trend_lookback: usize,
    /// 고저 범위(%)가 이보다 작으면 횡보
    pub flat_range_pct: f64,
    /// 가격 변화(%)가 이보다 작으면 횡보
    pub flat_change_pct: f64,
    pub confirmation_body_ratio: f64,
    pub indecision_wick_ratio: f64,
    pub indecision_body_ratio: f64,
    pub indecision_min_count: usize,
    pub key_level_proximity_pct: f64,
    pub min_room_pct: f64,
    pub enter_score: u8,
    pub wait_score: u8,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        ValidatorConfig {
            min_candles: 20,
            trend_lookback: 10,
            flat_range_pct: 0.1,
            flat_change_pct: 0.05,
            confirmation_body_ratio: 0.6,
            indecision_wick_ratio: 0.8,
            indecision_body_ratio: 0.4,
            indecision_min_count: 2,
            key_level_proximity_pct: 0.1,
            min_room_pct: 0.15,
            enter_score: 70,
            wait_score: 50,
        }
    }
}

/// 전체 파이프라인 설정
///
/// 모든 필드의 기본값은 기준 휴리스틱 상수와 같습니다.
/// 설정 파일에서는 바꾸고 싶은 섹션/필드만 지정하면 됩니다.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub extraction: ExtractionConfig,
    pub quality: QualityConfig,
    pub region: RegionConfig,
    pub edge: EdgeConfig,
    pub color: ColorConfig,
    pub segmentation: SegmentationConfig,
    pub geometry: GeometryConfig,
    pub ohlc: OhlcConfig,
    pub levels: LevelConfig,
    pub elements: ElementConfig,
    pub validator: ValidatorConfig,
}

impl ConfigValidation for PipelineConfig {
    fn validate(&self) -> ConfigResult<()> {
        ensure(
            self.extraction.min_width > 0 && self.extraction.min_height > 0,
            || "extraction.min_width/min_height는 0보다 커야 합니다".to_string(),
        )?;
        ensure(
            self.region.fallback_ratio > 0.0 && self.region.fallback_ratio <= 1.0,
            || {
                format!(
                    "region.fallback_ratio는 (0, 1] 범위여야 합니다: {}",
                    self.region.fallback_ratio
                )
            },
        )?;
        ensure(
            (0.0..0.5).contains(&self.region.margin_ratio),
            || "region.margin_ratio는 [0, 0.5) 범위여야 합니다".to_string(),
        )?;
        ensure(self.color.segmentation_ratio >= 1.0, || {
            "color.segmentation_ratio는 1.0 이상이어야 합니다".to_string()
        })?;
        ensure(
            self.color.highlight_ratio >= self.color.segmentation_ratio,
            || "color.highlight_ratio는 segmentation_ratio 이상이어야 합니다".to_string(),
        )?;
        ensure(
            self.segmentation.min_area <= self.segmentation.max_area,
            || {
                format!(
                    "segmentation.min_area({})가 max_area({})보다 큽니다",
                    self.segmentation.min_area, self.segmentation.max_area
                )
            },
        )?;
        ensure(self.geometry.min_confidence <= 100, || {
            "geometry.min_confidence는 100 이하여야 합니다".to_string()
        })?;
        ensure(self.ohlc.price_range > 0.0, || {
            "ohlc.price_range는 0보다 커야 합니다".to_string()
        })?;
        ensure(self.validator.trend_lookback >= 2, || {
            "validator.trend_lookback은 2 이상이어야 합니다".to_string()
        })?;
        ensure(
            self.validator.min_candles >= self.validator.trend_lookback.max(3),
            || "validator.min_candles는 trend_lookback 및 3 이상이어야 합니다".to_string(),
        )?;
        ensure(
            self.validator.wait_score <= self.validator.enter_score,
            || "validator.wait_score는 enter_score 이하여야 합니다".to_string(),
        )?;
        Ok(())
    }
}

impl PipelineConfig {
    /// 파일에서 설정 로드
    ///
    /// # Arguments
    /// * `path` - 설정 파일 경로
    /// * `format` - 설정 파일 형식 (Auto면 확장자로 판단)
    ///
    /// # Returns
    /// * `ConfigResult<PipelineConfig>` - 검증된 설정 또는 오류
    pub fn load_from_file(path: &Path, format: ConfigFormat) -> ConfigResult<PipelineConfig> {
        debug!("설정 파일 로드 시작: {}", path.display());

        let format = match format {
            ConfigFormat::Auto => ConfigFormat::from_path(path)?,
            other => other,
        };

        let content = std::fs::read_to_string(path).map_err(|e| {
            error!("설정 파일 읽기 실패: {} - {}", path.display(), e);
            ConfigError::FileError(format!("파일 읽기 실패: {}", e))
        })?;

        let config = Self::load_from_str(&content, format).inspect_err(|e| {
            error!("설정 파일 처리 실패: {} - {}", path.display(), e);
        })?;

        info!("설정 파일 로드 완료: {}", path.display());
        Ok(config)
    }

    /// 문자열에서 설정 로드
    pub fn load_from_str(content: &str, format: ConfigFormat) -> ConfigResult<PipelineConfig> {
        let config: PipelineConfig = match format {
            ConfigFormat::Json => parse_json(content)?,
            ConfigFormat::Toml => parse_toml(content)?,
            // JSON으로 먼저 시도 후 실패하면 TOML
            ConfigFormat::Auto => parse_json(content).or_else(|_| parse_toml(content))?,
        };

        config.validate()?;
        Ok(config)
    }

    /// 설정을 파일로 저장 (Auto면 확장자, 확장자가 없으면 TOML)
    pub fn save_to_file(&self, path: &Path, format: ConfigFormat) -> ConfigResult<()> {
        self.validate()?;

        let format = match format {
            ConfigFormat::Auto => ConfigFormat::from_path(path).unwrap_or(ConfigFormat::Toml),
            other => other,
        };

        let content = match format {
            ConfigFormat::Json => serde_json::to_string_pretty(self)
                .map_err(|e| ConfigError::ParseError(format!("JSON 직렬화 실패: {}", e)))?,
            _ => toml::to_string_pretty(self)
                .map_err(|e| ConfigError::ParseError(format!("TOML 직렬화 실패: {}", e)))?,
        };

        std::fs::write(path, content).map_err(|e| {
            error!("설정 파일 쓰기 실패: {} - {}", path.display(), e);
            ConfigError::FileError(format!("파일 쓰기 실패: {}", e))
        })?;

        info!("설정 파일 저장 완료: {}", path.display());
        Ok(())
    }
}

fn parse_json<T: DeserializeOwned>(content: &str) -> ConfigResult<T> {
    serde_json::from_str(content).map_err(|e| {
        warn!("JSON 파싱 실패: {}", e);
        ConfigError::ParseError(format!("JSON 파싱 실패: {}", e))
    })
}

fn parse_toml<T: DeserializeOwned>(content: &str) -> ConfigResult<T> {
    toml::from_str(content).map_err(|e| {
        warn!("TOML 파싱 실패: {}", e);
        ConfigError::ParseError(format!("TOML 파싱 실패: {}", e))
    })
}
