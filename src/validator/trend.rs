use crate::model::{CandleData, TrendDirection};
use serde::Serialize;

/// 최근 캔들 구간의 추세 측정값
#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct TrendAnalysis {
    pub direction: TrendDirection,
    /// 첫 종가 대비 마지막 종가 변화율 (%)
    pub change_pct: f64,
    /// (최고가 - 최저가) / 마지막 종가 (%)
    pub range_pct: f64,
}

/// 마지막 `lookback`개 캔들의 추세 분류
///
/// 고저 범위가 `flat_range_pct` 미만이거나 변화율 절대값이 `flat_change_pct` 미만이면 횡보입니다.
/// 캔들이 두 개 미만이거나 마지막 종가가 0 이하면 횡보로 취급합니다.
pub fn classify_trend(
    candles: &[CandleData],
    lookback: usize,
    flat_range_pct: f64,
    flat_change_pct: f64,
) -> TrendAnalysis {
    let window = &candles[candles.len().saturating_sub(lookback)..];
    let flat = TrendAnalysis {
        direction: TrendDirection::Flat,
        change_pct: 0.0,
        range_pct: 0.0,
    };

    let (Some(first), Some(last)) = (window.first(), window.last()) else {
        return flat;
    };
    if window.len() < 2 || first.close <= 0.0 || last.close <= 0.0 {
        return flat;
    }

    let change_pct = (last.close - first.close) / first.close * 100.0;
    let high = window.iter().map(|c| c.high).fold(f64::MIN, f64::max);
    let low = window.iter().map(|c| c.low).fold(f64::MAX, f64::min);
    let range_pct = (high - low) / last.close * 100.0;

    let direction = if range_pct < flat_range_pct || change_pct.abs() < flat_change_pct {
        TrendDirection::Flat
    } else if change_pct > 0.0 {
        TrendDirection::Up
    } else {
        TrendDirection::Down
    };

    TrendAnalysis {
        direction,
        change_pct,
        range_pct,
    }
}
