use crate::bitmap::Bitmap;
use crate::config::PipelineConfig;
use crate::error::{VisionError, VisionResult};
use crate::model::CandleData;
use crate::validator::PriceLevel;
use crate::vision::color::ColorClassifier;
use crate::vision::edge::EdgeEnhancer;
use crate::vision::elements::{TechnicalElement, TechnicalElementComposer};
use crate::vision::geometry::CandleGeometryAnalyzer;
use crate::vision::levels::{DetectedLine, SupportResistanceLineDetector};
use crate::vision::ohlc::{OhlcEstimator, PriceScale};
use crate::vision::quality::{QualityAssessor, QualityReport};
use crate::vision::region::{RegionDetection, RegionDetector};
use crate::vision::segment::CandleSegmenter;
use log::{debug, info, warn};
use serde::Serialize;

/// 비트맵 한 장의 추출 결과
///
/// 캔들 좌표와 선의 y는 잘라낸 차트 영역 기준이고, 오버레이 요소는 원본 이미지 기준입니다.
#[derive(Serialize, Debug, Clone)]
pub struct ExtractionResult {
    pub quality: QualityReport,
    pub region: RegionDetection,
    /// 캔들이 없으면 None
    pub scale: Option<PriceScale>,
    /// x 위치 순
    pub candles: Vec<CandleData>,
    pub lines: Vec<DetectedLine>,
    /// 마지막 종가 기준으로 분류한 지지/저항 레벨
    pub levels: Vec<PriceLevel>,
    pub elements: Vec<TechnicalElement>,
    /// OHLC 불변식 위반으로 버려진 캔들 수
    pub discarded_candles: usize,
    pub warnings: Vec<String>,
}

impl ExtractionResult {
    /// 캔들이 하나라도 추출되었는지
    pub fn has_candles(&self) -> bool {
        !self.candles.is_empty()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.candles.last().map(|c| c.close)
    }
}

/// 차트 이미지 → 캔들 데이터 추출기
///
/// 품질 평가, 영역 감지, 엣지 강조, 색상 분류, 분할, 형상 검증, OHLC 추정,
/// 지지/저항선 감지, 오버레이 구성을 순서대로 실행합니다.
#[derive(Debug, Clone, Default)]
pub struct ChartExtractor {
    config: PipelineConfig,
    quality: QualityAssessor,
    region: RegionDetector,
    edge: EdgeEnhancer,
    classifier: ColorClassifier,
    segmenter: CandleSegmenter,
    geometry: CandleGeometryAnalyzer,
    ohlc: OhlcEstimator,
    lines: SupportResistanceLineDetector,
    composer: TechnicalElementComposer,
}

impl ChartExtractor {
    pub fn new(config: PipelineConfig) -> ChartExtractor {
        ChartExtractor {
            quality: QualityAssessor::new(config.quality.clone()),
            region: RegionDetector::new(config.region.clone(), config.color.clone()),
            edge: EdgeEnhancer::new(config.edge.clone()),
            classifier: ColorClassifier::new(config.color.clone()),
            segmenter: CandleSegmenter::new(config.segmentation.clone()),
            geometry: CandleGeometryAnalyzer::new(config.geometry.clone()),
            ohlc: OhlcEstimator::new(config.ohlc.clone()),
            lines: SupportResistanceLineDetector::new(config.levels.clone()),
            composer: TechnicalElementComposer::new(
                config.elements.clone(),
                config.validator.clone(),
            ),
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// 원시 RGBA 버퍼에서 추출
    ///
    /// # Arguments
    /// * `width` - 이미지 너비
    /// * `height` - 이미지 높이
    /// * `data` - 행 우선 RGBA8 버퍼
    ///
    /// # Returns
    /// * `VisionResult<ExtractionResult>` - 추출 결과 또는 입력 오류
    pub fn extract_rgba(
        &self,
        width: usize,
        height: usize,
        data: Vec<u8>,
    ) -> VisionResult<ExtractionResult> {
        let bitmap = Bitmap::new(width, height, data)?;
        self.extract(&bitmap)
    }

    /// 비트맵에서 추출
    ///
    /// 최소 크기보다 작은 이미지만 오류이며, 품질 저하, 영역 대체, 캔들 없음은 경고로 기록됩니다.
    pub fn extract(&self, bitmap: &Bitmap) -> VisionResult<ExtractionResult> {
        let min = &self.config.extraction;
        if bitmap.width() < min.min_width || bitmap.height() < min.min_height {
            return Err(VisionError::ImageTooSmall {
                width: bitmap.width(),
                height: bitmap.height(),
                min_width: min.min_width,
                min_height: min.min_height,
            });
        }

        let mut warnings = Vec::new();

        let quality = self.quality.assess(bitmap);
        if !quality.is_acceptable {
            let message = format!("이미지 품질 저하: {}", quality.factor_summaries().join(", "));
            warn!("{}", message);
            warnings.push(message);
        }

        let region = self.region.detect(bitmap);
        if !region.is_detected() {
            let message = format!("차트 영역을 감지하지 못해 중앙 영역 사용: {:?}", region.region);
            warn!("{}", message);
            warnings.push(message);
        }

        let chart = bitmap.crop(&region.region);
        let enhanced = self.edge.enhance(&chart);
        let class_map = self.classifier.classify(&enhanced);
        let segmentation = self.segmenter.segment(&class_map);
        debug!(
            "분할: 세그먼트 {}개, 방문 픽셀 {}개, 크기 제외 {}개",
            segmentation.segments.len(),
            segmentation.visited_pixels,
            segmentation.rejected_components
        );

        let candidates = self.geometry.analyze(&class_map, &segmentation.segments);
        let scale = self.ohlc.scale(&candidates);
        let (candles, discarded_candles) =
            OhlcEstimator::retain_valid(self.ohlc.estimate(&candidates));
        if discarded_candles > 0 {
            warnings.push(format!("OHLC 불변식 위반 캔들 {}개 제거", discarded_candles));
        }
        if candles.is_empty() {
            let message = "캔들을 찾지 못함".to_string();
            warn!("{}", message);
            warnings.push(message);
        }

        let lines = self.lines.detect(&chart);
        let levels = match (scale.as_ref(), candles.last()) {
            (Some(scale), Some(last)) => lines
                .iter()
                .map(|line| {
                    line.to_price_level(scale, last.close, self.config.levels.strong_confidence)
                })
                .collect(),
            _ => Vec::new(),
        };
        let elements = self.composer.compose(&candles, &lines, &region.region);

        info!(
            "차트 추출 완료: 캔들 {}개, 지지/저항선 {}개, 경고 {}개",
            candles.len(),
            lines.len(),
            warnings.len()
        );

        Ok(ExtractionResult {
            quality,
            region,
            scale,
            candles,
            lines,
            levels,
            elements,
            discarded_candles,
            warnings,
        })
    }
}
