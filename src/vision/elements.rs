use crate::bitmap::Rgba;
use crate::config::{ElementConfig, ValidatorConfig};
use crate::model::{CandleData, Region, TrendDirection};
use crate::validator::trend::classify_trend;
use crate::vision::levels::DetectedLine;
use serde::Serialize;

const LEVEL_COLOR: Rgba = [255, 200, 0, 255];
const UP_COLOR: Rgba = [0, 200, 80, 255];
const DOWN_COLOR: Rgba = [230, 50, 50, 255];
const FLAT_COLOR: Rgba = [160, 160, 160, 255];
const ANOMALY_COLOR: Rgba = [255, 0, 255, 255];

/// 화면 오버레이용 기술적 요소
///
/// 출력 전용이며 파이프라인이 다시 읽지 않습니다. 좌표는 원본 이미지 기준입니다.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind")]
pub enum TechnicalElement {
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        color: Rgba,
        dash: Option<Vec<f64>>,
    },
    Label {
        x: f64,
        y: f64,
        text: String,
        color: Rgba,
        dash: Option<Vec<f64>>,
    },
    Circle {
        cx: f64,
        cy: f64,
        radius: f64,
        color: Rgba,
        dash: Option<Vec<f64>>,
    },
}

/// 감지 결과를 오버레이 요소로 바꾸는 구성기
#[derive(Debug, Clone, Default)]
pub struct TechnicalElementComposer {
    config: ElementConfig,
    trend: ValidatorConfig,
}

impl TechnicalElementComposer {
    pub fn new(config: ElementConfig, trend: ValidatorConfig) -> TechnicalElementComposer {
        TechnicalElementComposer { config, trend }
    }

    /// 지지/저항선 하나당 점선과 라벨
    pub fn level_elements(&self, lines: &[DetectedLine], region: &Region) -> Vec<TechnicalElement> {
        let left = region.x as f64;
        let right = (region.x + region.width) as f64;

        lines
            .iter()
            .flat_map(|line| {
                let y = (region.y + line.y) as f64;
                [
                    TechnicalElement::Line {
                        x1: left,
                        y1: y,
                        x2: right,
                        y2: y,
                        color: LEVEL_COLOR,
                        dash: Some(self.config.dash_pattern.clone()),
                    },
                    TechnicalElement::Label {
                        x: left + 4.0,
                        y: y - 4.0,
                        text: format!("S/R {}%", line.confidence),
                        color: LEVEL_COLOR,
                        dash: None,
                    },
                ]
            })
            .collect()
    }

    /// 첫 캔들과 마지막 캔들 중심을 잇는 추세선과 라벨
    pub fn trend_elements(&self, candles: &[CandleData], region: &Region) -> Vec<TechnicalElement> {
        let (Some(first), Some(last)) = (candles.first(), candles.last()) else {
            return Vec::new();
        };
        if candles.len() < 2 {
            return Vec::new();
        }

        let trend = classify_trend(
            candles,
            candles.len(),
            self.trend.flat_range_pct,
            self.trend.flat_change_pct,
        );
        let (color, text) = match trend.direction {
            TrendDirection::Up => (UP_COLOR, "상승 추세"),
            TrendDirection::Down => (DOWN_COLOR, "하락 추세"),
            TrendDirection::Flat => (FLAT_COLOR, "횡보"),
        };

        let (ox, oy) = (region.x as f64, region.y as f64);
        vec![
            TechnicalElement::Line {
                x1: ox + first.position.x,
                y1: oy + first.position.y,
                x2: ox + last.position.x,
                y2: oy + last.position.y,
                color,
                dash: None,
            },
            TechnicalElement::Label {
                x: ox + last.position.x,
                y: oy + last.position.y - 8.0,
                text: format!("{} ({:+.2}%)", text, trend.change_pct),
                color,
                dash: None,
            },
        ]
    }

    /// 신뢰도가 낮은 캔들을 점선 원으로 표시
    pub fn anomaly_elements(&self, candles: &[CandleData], region: &Region) -> Vec<TechnicalElement> {
        candles
            .iter()
            .filter(|c| c.confidence < self.config.anomaly_confidence)
            .map(|c| TechnicalElement::Circle {
                cx: region.x as f64 + c.position.x,
                cy: region.y as f64 + c.position.y,
                radius: c.width.max(c.height) as f64 / 2.0 + self.config.circle_padding,
                color: ANOMALY_COLOR,
                dash: Some(self.config.dash_pattern.clone()),
            })
            .collect()
    }

    /// 모든 오버레이 요소 구성
    pub fn compose(
        &self,
        candles: &[CandleData],
        lines: &[DetectedLine],
        region: &Region,
    ) -> Vec<TechnicalElement> {
        let mut elements = self.level_elements(lines, region);
        elements.extend(self.trend_elements(candles, region));
        elements.extend(self.anomaly_elements(candles, region));
        elements
    }
}
