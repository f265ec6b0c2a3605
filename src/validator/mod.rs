// 진입 컨텍스트 검증 모듈
// 추출된 캔들 시퀀스와 외부 분석 결과로 신호의 진입 가능성을 판정합니다.

pub mod m1_context;
pub mod trend;

pub use m1_context::{M1ContextInput, M1ContextValidation, M1ContextValidator, Recommendation};
pub use trend::{TrendAnalysis, classify_trend};

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// 가격 레벨 유형
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LevelType {
    Support,
    Resistance,
}

/// 가격 레벨 강도
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LevelStrength {
    Strong,
    Weak,
}

/// 외부 합류(confluence) 분석기가 제공하는 지지/저항 레벨
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PriceLevel {
    pub price: f64,
    pub level_type: LevelType,
    pub strength: LevelStrength,
    /// 0~100
    pub confidence: f64,
}

impl PriceLevel {
    /// 가격 대비 이 레벨까지의 거리 (%)
    pub fn distance_pct(&self, price: f64) -> f64 {
        (self.price - price).abs() / price * 100.0
    }
}

impl Display for PriceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:?}({:?}) @ {:.4} [{:.0}%]",
            self.level_type, self.strength, self.price, self.confidence
        )
    }
}

/// 거래량 추세
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VolumeTrend {
    Increasing,
    Decreasing,
    Stable,
}

/// 외부 거래량 분석기 결과
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct VolumeContext {
    pub trend: VolumeTrend,
    /// 평소 대비 비정상적인 거래량인지
    pub is_abnormal: bool,
    /// 0~100
    pub confidence: f64,
}

impl VolumeContext {
    /// 비정상적이면서 증가하는 거래량인지
    pub fn is_abnormal_increase(&self) -> bool {
        self.is_abnormal && self.trend == VolumeTrend::Increasing
    }
}
