use crate::config::OhlcConfig;
use crate::model::{CandleColor, CandleData};
use crate::vision::geometry::CandleCandidate;
use log::{debug, warn};
use serde::Serialize;

/// 픽셀 행을 합성 가격으로 바꾸는 선형 척도
///
/// 픽셀 y는 아래로 증가하고 가격은 위로 증가하므로 뒤집어서 매핑합니다.
#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct PriceScale {
    pub min_y: usize,
    pub max_y: usize,
    pub base_price: f64,
    pub price_range: f64,
}

impl PriceScale {
    /// 캔들 후보들의 위/아래 경계로 척도 생성 (후보가 없으면 None)
    pub fn from_candidates(candidates: &[CandleCandidate], config: &OhlcConfig) -> Option<Self> {
        let min_y = candidates.iter().map(|c| c.y1).min()?;
        let max_y = candidates.iter().map(|c| c.y2).max()?;
        Some(PriceScale {
            min_y,
            max_y,
            base_price: config.base_price,
            price_range: config.price_range,
        })
    }

    /// 픽셀 행의 가격
    ///
    /// 세로 범위가 0이면 가격대 중간값을 반환합니다.
    pub fn price_at(&self, y: f64) -> f64 {
        let span = self.max_y as f64 - self.min_y as f64;
        let fraction = if span > 0.0 {
            1.0 - (y - self.min_y as f64) / span
        } else {
            0.5
        };
        self.base_price + fraction * self.price_range
    }
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// 합성 OHLC 추정기
#[derive(Debug, Clone, Default)]
pub struct OhlcEstimator {
    config: OhlcConfig,
}

impl OhlcEstimator {
    pub fn new(config: OhlcConfig) -> OhlcEstimator {
        OhlcEstimator { config }
    }

    /// 캔들 후보들의 가격 척도
    pub fn scale(&self, candidates: &[CandleCandidate]) -> Option<PriceScale> {
        PriceScale::from_candidates(candidates, &self.config)
    }

    /// x 위치 순으로 정렬된 후보들로부터 OHLC 추정
    ///
    /// 양봉은 시가=아래 경계, 종가=위 경계이고 음봉은 반대입니다.
    /// 고가/저가는 반올림 이후 마지막에 다시 계산하여 불변식을 보장합니다.
    pub fn estimate(&self, candidates: &[CandleCandidate]) -> Vec<CandleData> {
        let Some(scale) = self.scale(candidates) else {
            return Vec::new();
        };

        let decimals = self.config.decimals;
        let candles: Vec<CandleData> = candidates
            .iter()
            .map(|c| {
                let top = round_to(scale.price_at(c.y1 as f64), decimals);
                let bottom = round_to(scale.price_at(c.y2 as f64), decimals);
                let (open, close) = match c.color {
                    CandleColor::Bullish => (bottom, top),
                    CandleColor::Bearish => (top, bottom),
                };

                CandleData {
                    position: c.centroid,
                    width: c.width(),
                    height: c.height(),
                    color: c.color,
                    open,
                    high: open.max(close),
                    low: open.min(close),
                    close,
                    confidence: c.confidence,
                }
            })
            .collect();

        debug!(
            "OHLC 추정: {}개 캔들, 세로 범위 {}..{}",
            candles.len(),
            scale.min_y,
            scale.max_y
        );
        candles
    }

    /// OHLC 불변식을 위반하는 캔들 제거
    ///
    /// # Returns
    /// * `(Vec<CandleData>, usize)` - 유효한 캔들과 제거된 개수
    pub fn retain_valid(candles: Vec<CandleData>) -> (Vec<CandleData>, usize) {
        let before = candles.len();
        let valid: Vec<CandleData> = candles.into_iter().filter(|c| c.is_valid()).collect();
        let discarded = before - valid.len();
        if discarded > 0 {
            warn!("OHLC 불변식 위반 캔들 {}개 제거", discarded);
        }
        (valid, discarded)
    }
}
