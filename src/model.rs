use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// 픽셀 분류 결과
///
/// 채널 비율과 밝기 임계값으로 픽셀마다 다시 계산되며 저장되지 않습니다.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PixelClass {
    /// 분류되지 않은 배경
    #[default]
    None,
    /// 상승 캔들 색상 (녹색)
    Bullish,
    /// 하락 캔들 색상 (적색)
    Bearish,
    /// 어두운 무채색
    Dark,
    /// 밝은 무채색
    Light,
}

/// 캔들 방향
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandleColor {
    /// 양봉
    Bullish,
    /// 음봉
    Bearish,
}

impl Display for CandleColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CandleColor::Bullish => write!(f, "양봉"),
            CandleColor::Bearish => write!(f, "음봉"),
        }
    }
}

/// 픽셀 좌표 (서브픽셀 정밀도)
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

/// 이미지에서 추출된 캔들 하나
///
/// 가격은 합성 값이므로 실제 시세로 해석하면 안 됩니다.
/// 캔들 간의 상대적인 순서와 모양만 의미가 있습니다.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CandleData {
    /// 픽셀 무게중심
    pub position: Point,
    /// 픽셀 너비
    pub width: usize,
    /// 픽셀 높이
    pub height: usize,
    pub color: CandleColor,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// 0~100 신뢰도
    pub confidence: u8,
}

impl CandleData {
    /// 캔들 바디 크기 (|종가 - 시가|)
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    /// 고가와 저가의 차이
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// 윗꼬리 길이
    pub fn upper_wick(&self) -> f64 {
        self.high - self.open.max(self.close)
    }

    /// 아래꼬리 길이
    pub fn lower_wick(&self) -> f64 {
        self.open.min(self.close) - self.low
    }

    /// 종가가 시가보다 높은지 확인
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// 종가가 시가보다 낮은지 확인
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    /// OHLC 불변식 검사
    ///
    /// `high >= max(open, close)` 이고 `low <= min(open, close)` 이며 모든 값이 유한해야 합니다.
    pub fn is_valid(&self) -> bool {
        let finite = [self.open, self.high, self.low, self.close]
            .iter()
            .all(|v| v.is_finite());
        finite && self.high >= self.open.max(self.close) && self.low <= self.open.min(self.close)
    }
}

impl Display for CandleData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CandleData({} @ ({:.1}, {:.1}), o={:.4}, h={:.4}, l={:.4}, c={:.4}, conf={})",
            self.color,
            self.position.x,
            self.position.y,
            self.open,
            self.high,
            self.low,
            self.close,
            self.confidence
        )
    }
}

/// 차트 플롯 영역을 나타내는 픽셀 사각형
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Region {
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Region {
            x,
            y,
            width,
            height,
        }
    }

    /// 이미지 전체를 덮는 영역
    pub fn full(width: usize, height: usize) -> Self {
        Region::new(0, 0, width, height)
    }
}

/// 영역이 실제로 감지되었는지, 기본값으로 가정되었는지
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionSource {
    Detected,
    Assumed,
}

/// 외부에서 전달되는 매매 신호 방향
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalDirection {
    Buy,
    Sell,
    Neutral,
}

impl Display for SignalDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalDirection::Buy => write!(f, "BUY"),
            SignalDirection::Sell => write!(f, "SELL"),
            SignalDirection::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

impl std::str::FromStr for SignalDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "BUY" | "LONG" => Ok(SignalDirection::Buy),
            "SELL" | "SHORT" => Ok(SignalDirection::Sell),
            "NEUTRAL" | "NONE" => Ok(SignalDirection::Neutral),
            _ => Err(format!("알 수 없는 신호 방향: {}", s)),
        }
    }
}

/// 추세 방향
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendDirection {
    Up,
    Down,
    /// 횡보
    Flat,
}

impl Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrendDirection::Up => write!(f, "UP"),
            TrendDirection::Down => write!(f, "DOWN"),
            TrendDirection::Flat => write!(f, "FLAT"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(open: f64, high: f64, low: f64, close: f64) -> CandleData {
        CandleData {
            position: Point::new(0.0, 0.0),
            width: 5,
            height: 20,
            color: CandleColor::Bullish,
            open,
            high,
            low,
            close,
            confidence: 80,
        }
    }

    #[test]
    fn test_candle_shape_helpers() {
        let c = candle(100.0, 104.0, 98.0, 102.0);
        assert!((c.body() - 2.0).abs() < 1e-9);
        assert!((c.range() - 6.0).abs() < 1e-9);
        assert!((c.upper_wick() - 2.0).abs() < 1e-9);
        assert!((c.lower_wick() - 2.0).abs() < 1e-9);
        assert!(c.is_bullish());
        assert!(c.is_valid());
    }

    #[test]
    fn test_invalid_ohlc_detected() {
        assert!(!candle(100.0, 99.0, 98.0, 102.0).is_valid());
        assert!(!candle(100.0, 104.0, 101.0, 102.0).is_valid());
        assert!(!candle(f64::NAN, 104.0, 98.0, 102.0).is_valid());
    }

    #[test]
    fn test_signal_direction_from_str() {
        assert_eq!("buy".parse::<SignalDirection>(), Ok(SignalDirection::Buy));
        assert_eq!("Short".parse::<SignalDirection>(), Ok(SignalDirection::Sell));
        assert!("sideways".parse::<SignalDirection>().is_err());
    }
}
