// 차트 이미지 분석 모듈
// 캔들스틱 차트 이미지를 합성 OHLC 캔들 시퀀스와 오버레이 요소로 변환합니다.

pub mod color;
pub mod edge;
pub mod elements;
pub mod geometry;
pub mod levels;
pub mod ohlc;
pub mod pipeline;
pub mod quality;
pub mod region;
pub mod segment;

pub use color::{ClassMap, ColorClassifier};
pub use edge::EdgeEnhancer;
pub use elements::{TechnicalElement, TechnicalElementComposer};
pub use geometry::{CandleCandidate, CandleGeometryAnalyzer, RejectReason};
pub use levels::{DetectedLine, SupportResistanceLineDetector};
pub use ohlc::{OhlcEstimator, PriceScale};
pub use pipeline::{ChartExtractor, ExtractionResult};
pub use quality::{QualityAssessor, QualityReport};
pub use region::{ChartPixelKind, RegionDetection, RegionDetector};
pub use segment::{CandleSegmenter, Segment, Segmentation};
