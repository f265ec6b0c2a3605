use crate::config::ValidatorConfig;
use crate::model::{CandleData, SignalDirection, TrendDirection};
use crate::validator::trend::classify_trend;
use crate::validator::{LevelStrength, LevelType, PriceLevel, VolumeContext};
use log::{debug, info};
use serde::Serialize;
use std::fmt::Display;

/// 추세가 정의되었을 때의 기본 점수
const TREND_BASE_SCORE: i32 = 25;
const PULLBACK_SCORE: i32 = 20;
const CONFIRMATION_SCORE: i32 = 25;
const INDECISION_PENALTY: i32 = 30;
const KEY_LEVEL_SCORE: i32 = 20;
const VOLUME_SCORE: i32 = 15;
const ROOM_PENALTY: i32 = 25;
const ALIGNED_SCORE: i32 = 10;
const MISALIGNED_PENALTY: i32 = 20;

/// 진입 추천
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recommendation {
    Enter,
    Wait,
    Skip,
}

impl Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Recommendation::Enter => write!(f, "ENTER"),
            Recommendation::Wait => write!(f, "WAIT"),
            Recommendation::Skip => write!(f, "SKIP"),
        }
    }
}

/// 검증 입력
///
/// 캔들은 오래된 것부터 최신 순서여야 합니다 (마지막 캔들이 가장 최근).
#[derive(Debug, Clone)]
pub struct M1ContextInput<'a> {
    pub candles: &'a [CandleData],
    pub signal: SignalDirection,
    pub volume: Option<VolumeContext>,
    pub levels: &'a [PriceLevel],
}

impl<'a> M1ContextInput<'a> {
    pub fn new(candles: &'a [CandleData], signal: SignalDirection) -> Self {
        M1ContextInput {
            candles,
            signal,
            volume: None,
            levels: &[],
        }
    }

    /// 거래량 분석 결과 설정
    pub fn with_volume(mut self, volume: VolumeContext) -> Self {
        self.volume = Some(volume);
        self
    }

    /// 지지/저항 레벨 설정
    pub fn with_levels(mut self, levels: &'a [PriceLevel]) -> Self {
        self.levels = levels;
        self
    }
}

/// M1 컨텍스트 검증 결과
///
/// 호출마다 새로 만들어지며 상태를 갖지 않습니다.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct M1ContextValidation {
    pub is_valid_for_entry: bool,
    /// 발견 순서대로 정렬된 거부 사유
    pub rejection_reasons: Vec<String>,
    /// 0~100
    pub context_score: u8,
    pub trend_direction: TrendDirection,
    /// 추세 방향의 조정 후 재개 패턴
    pub pullback_detected: bool,
    /// 신호 방향과 일치하는 강한 확인 캔들
    pub confirmation_candle: bool,
    /// 최근 캔들에 우유부단 패턴이 없음
    pub no_indecision: bool,
    /// 신호 방향의 강한 레벨 근처
    pub near_key_level: bool,
    /// 비정상적으로 증가하는 거래량
    pub volume_confirmed: bool,
    /// 반대 레벨까지 충분한 여유
    pub sufficient_room: bool,
    pub recommendation: Recommendation,
}

impl M1ContextValidation {
    /// 점수 계산 없이 즉시 거부된 결과
    fn rejected(reason: String, trend_direction: TrendDirection) -> Self {
        M1ContextValidation {
            is_valid_for_entry: false,
            rejection_reasons: vec![reason],
            context_score: 0,
            trend_direction,
            pullback_detected: false,
            confirmation_candle: false,
            no_indecision: false,
            near_key_level: false,
            volume_confirmed: false,
            sufficient_room: false,
            recommendation: Recommendation::Skip,
        }
    }
}

impl Display for M1ContextValidation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "M1Context {{ rec: {}, score: {}, trend: {}, pullback: {}, confirmation: {}, no_indecision: {}, key_level: {}, volume: {}, room: {}, reasons: [{}] }}",
            self.recommendation,
            self.context_score,
            self.trend_direction,
            self.pullback_detected,
            self.confirmation_candle,
            self.no_indecision,
            self.near_key_level,
            self.volume_confirmed,
            self.sufficient_room,
            self.rejection_reasons.join("; ")
        )
    }
}

/// M1 진입 컨텍스트 검증기
///
/// 호출 간 상태가 없는 점수 계산기입니다.
#[derive(Debug, Clone, Default)]
pub struct M1ContextValidator {
    config: ValidatorConfig,
}

impl M1ContextValidator {
    pub fn new(config: ValidatorConfig) -> M1ContextValidator {
        M1ContextValidator { config }
    }

    /// 마지막 세 캔들이 추세 방향의 조정 후 재개 모양인지 확인
    ///
    /// 상승 추세: 양봉 → 직전 종가 아래로 마감한 음봉 → 조정 종가 위로 마감한 양봉.
    /// 하락 추세는 대칭입니다.
    pub fn detect_pullback(candles: &[CandleData], trend: TrendDirection) -> bool {
        let [c1, c2, c3] = match candles {
            [.., a, b, c] => [a, b, c],
            _ => return false,
        };

        match trend {
            TrendDirection::Up => {
                c1.is_bullish()
                    && c2.is_bearish()
                    && c2.close < c1.close
                    && c3.is_bullish()
                    && c3.close > c2.close
            }
            TrendDirection::Down => {
                c1.is_bearish()
                    && c2.is_bullish()
                    && c2.close > c1.close
                    && c3.is_bearish()
                    && c3.close < c2.close
            }
            TrendDirection::Flat => false,
        }
    }

    /// 바디가 범위의 일정 비율 이상이고 방향이 신호와 같은 캔들인지
    pub fn is_strong_confirmation(&self, candle: &CandleData, signal: SignalDirection) -> bool {
        let range = candle.range();
        if range <= 0.0 {
            return false;
        }

        let strong_body = candle.body() / range >= self.config.confirmation_body_ratio;
        let matches_signal = match signal {
            SignalDirection::Buy => candle.is_bullish(),
            SignalDirection::Sell => candle.is_bearish(),
            SignalDirection::Neutral => false,
        };
        strong_body && matches_signal
    }

    /// 양쪽 꼬리가 모두 길고 바디가 작은 우유부단 캔들인지
    pub fn is_indecision(&self, candle: &CandleData) -> bool {
        let body = candle.body();
        let wick_limit = body * self.config.indecision_wick_ratio;
        candle.upper_wick() > wick_limit
            && candle.lower_wick() > wick_limit
            && body < candle.range() * self.config.indecision_body_ratio
    }

    /// 신호 방향과 같은 유형의 강한 레벨이 가격 근처에 있는지
    ///
    /// 매수는 지지선, 매도는 저항선을 봅니다.
    pub fn is_near_key_level(
        &self,
        price: f64,
        signal: SignalDirection,
        levels: &[PriceLevel],
    ) -> bool {
        let wanted = match signal {
            SignalDirection::Buy => LevelType::Support,
            SignalDirection::Sell => LevelType::Resistance,
            SignalDirection::Neutral => return false,
        };

        levels.iter().any(|level| {
            level.level_type == wanted
                && level.strength == LevelStrength::Strong
                && level.distance_pct(price) <= self.config.key_level_proximity_pct
        })
    }

    /// 진행 방향의 가장 가까운 반대 레벨
    ///
    /// 매수는 가격 위의 저항선, 매도는 가격 아래의 지지선입니다.
    pub fn nearest_opposing_level<'l>(
        price: f64,
        signal: SignalDirection,
        levels: &'l [PriceLevel],
    ) -> Option<&'l PriceLevel> {
        let (opposing, above) = match signal {
            SignalDirection::Buy => (LevelType::Resistance, true),
            SignalDirection::Sell => (LevelType::Support, false),
            SignalDirection::Neutral => return None,
        };

        levels
            .iter()
            .filter(|level| {
                let ahead = if above {
                    level.price > price
                } else {
                    level.price < price
                };
                level.level_type == opposing && ahead
            })
            .min_by(|a, b| a.distance_pct(price).total_cmp(&b.distance_pct(price)))
    }

    /// 반대 레벨까지 충분한 여유가 있는지 (반대 레벨이 없으면 충분)
    pub fn has_sufficient_room(
        &self,
        price: f64,
        signal: SignalDirection,
        levels: &[PriceLevel],
    ) -> bool {
        Self::nearest_opposing_level(price, signal, levels)
            .is_none_or(|level| level.distance_pct(price) >= self.config.min_room_pct)
    }

    fn recommend(&self, score: u8, reasons: usize) -> Recommendation {
        if score >= self.config.enter_score && reasons == 0 {
            Recommendation::Enter
        } else if score >= self.config.wait_score && reasons <= 1 {
            Recommendation::Wait
        } else {
            Recommendation::Skip
        }
    }

    /// 진입 컨텍스트 검증
    pub fn validate(&self, input: &M1ContextInput<'_>) -> M1ContextValidation {
        let result = self.evaluate(input);
        info!("{}", result);
        result
    }

    fn evaluate(&self, input: &M1ContextInput<'_>) -> M1ContextValidation {
        let candles = input.candles;
        let signal = input.signal;

        if candles.len() < self.config.min_candles.max(3) {
            return M1ContextValidation::rejected(
                format!(
                    "캔들 부족: {}개 (최소 {}개)",
                    candles.len(),
                    self.config.min_candles
                ),
                TrendDirection::Flat,
            );
        }
        if signal == SignalDirection::Neutral {
            return M1ContextValidation::rejected(
                "중립 신호는 진입 대상이 아님".to_string(),
                TrendDirection::Flat,
            );
        }

        let trend = classify_trend(
            candles,
            self.config.trend_lookback,
            self.config.flat_range_pct,
            self.config.flat_change_pct,
        );
        debug!(
            "추세 {} (변화 {:.4}%, 범위 {:.4}%)",
            trend.direction, trend.change_pct, trend.range_pct
        );

        if trend.direction == TrendDirection::Flat {
            return M1ContextValidation::rejected(
                format!(
                    "횡보 추세 (변화 {:.3}%, 범위 {:.3}%)",
                    trend.change_pct, trend.range_pct
                ),
                TrendDirection::Flat,
            );
        }

        let mut reasons = Vec::new();
        let mut score = TREND_BASE_SCORE;

        let pullback_detected = Self::detect_pullback(candles, trend.direction);
        if pullback_detected {
            score += PULLBACK_SCORE;
        }

        // 최소 캔들 수 검사를 통과했으므로 마지막 캔들은 항상 존재
        let last = &candles[candles.len() - 1];
        let confirmation_candle = self.is_strong_confirmation(last, signal);
        if confirmation_candle {
            score += CONFIRMATION_SCORE;
        } else {
            reasons.push("신호 방향의 강한 확인 캔들 없음".to_string());
        }

        let indecision_count = candles[candles.len() - 3..]
            .iter()
            .filter(|c| self.is_indecision(c))
            .count();
        let no_indecision = indecision_count < self.config.indecision_min_count;
        if !no_indecision {
            score -= INDECISION_PENALTY;
            reasons.push(format!("최근 3개 중 우유부단 캔들 {}개", indecision_count));
        }

        let price = last.close;
        let near_key_level = self.is_near_key_level(price, signal, input.levels);
        if near_key_level {
            score += KEY_LEVEL_SCORE;
        }

        let volume_confirmed = input
            .volume
            .as_ref()
            .is_some_and(VolumeContext::is_abnormal_increase);
        if volume_confirmed {
            score += VOLUME_SCORE;
        }

        let sufficient_room = self.has_sufficient_room(price, signal, input.levels);
        if !sufficient_room {
            score -= ROOM_PENALTY;
            reasons.push(format!(
                "반대 레벨까지 여유 부족 (최소 {:.2}%)",
                self.config.min_room_pct
            ));
        }

        let aligned = matches!(
            (trend.direction, signal),
            (TrendDirection::Up, SignalDirection::Buy) | (TrendDirection::Down, SignalDirection::Sell)
        );
        if aligned {
            score += ALIGNED_SCORE;
        } else {
            score -= MISALIGNED_PENALTY;
            reasons.push(format!("추세({})와 신호({}) 불일치", trend.direction, signal));
        }

        let context_score = score.clamp(0, 100) as u8;
        let recommendation = self.recommend(context_score, reasons.len());

        M1ContextValidation {
            is_valid_for_entry: recommendation == Recommendation::Enter,
            rejection_reasons: reasons,
            context_score,
            trend_direction: trend.direction,
            pullback_detected,
            confirmation_candle,
            no_indecision,
            near_key_level,
            volume_confirmed,
            sufficient_room,
            recommendation,
        }
    }
}
