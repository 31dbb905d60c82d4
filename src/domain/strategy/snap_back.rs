//! Bollinger snap-back with an EMA(200) trend filter.
//!
//! Long: close above EMA(200), the bar's low tags the lower band, RSI(7) below
//! 30, and the same bar closes green back inside the band. Short mirrors at the
//! upper band below EMA(200) with RSI(7) above 70 and a red close.
//!
//! The stop is the tighter of a swing-extreme stop (last 11 bars, 0.2% buffer)
//! and 1.5 x ATR(14) from entry, where ATR is a plain 14-bar mean of true range.
//! Half closes at the middle band with the stop moved to entry; the rest at the
//! opposite band.

use super::{two_target_ladder, ExitAction, ExitPlan, StrategyPolicy, Trigger};
use crate::domain::candle::Candle;
use crate::domain::indicator::{
    atr, bollinger, calculate_atr_rolling, calculate_bollinger, calculate_ema, calculate_rsi,
    BollingerBands,
};
use crate::domain::indicator_helpers::{closes, swing_high_through, swing_low_through};
use crate::domain::position::{Position, Side};

const TREND_PERIOD: usize = 200;
const RSI_PERIOD: usize = 7;
const RSI_OVERSOLD: f64 = 30.0;
const RSI_OVERBOUGHT: f64 = 70.0;
const SWING_LOOKBACK: usize = 10;
const STOP_BUFFER: f64 = 0.002;
const ATR_MULTIPLIER: f64 = 1.5;

pub struct SnapBack {
    trend: Vec<f64>,
    bands: BollingerBands,
    rsi: Vec<f64>,
    atr: Vec<f64>,
}

impl SnapBack {
    pub fn new(candles: &[Candle]) -> Self {
        let closes = closes(candles);
        SnapBack {
            trend: calculate_ema(&closes, TREND_PERIOD),
            bands: calculate_bollinger(
                &closes,
                bollinger::DEFAULT_PERIOD,
                bollinger::DEFAULT_MULTIPLIER,
            ),
            rsi: calculate_rsi(&closes, RSI_PERIOD),
            atr: calculate_atr_rolling(candles, atr::DEFAULT_PERIOD),
        }
    }
}

impl StrategyPolicy for SnapBack {
    fn detect_trigger(&mut self, candles: &[Candle], i: usize) -> Option<Trigger> {
        let bar = &candles[i];
        let (upper, lower) = (self.bands.upper[i], self.bands.lower[i]);

        let side = if bar.close > self.trend[i] {
            let snapped = bar.low <= lower
                && self.rsi[i] < RSI_OVERSOLD
                && bar.is_bullish()
                && bar.close > lower;
            snapped.then_some(Side::Long)
        } else if bar.close < self.trend[i] {
            let snapped = bar.high >= upper
                && self.rsi[i] > RSI_OVERBOUGHT
                && bar.is_bearish()
                && bar.close < upper;
            snapped.then_some(Side::Short)
        } else {
            None
        }?;

        Some(Trigger {
            side,
            market_price: bar.close,
        })
    }

    fn plan_exits(&self, candles: &[Candle], i: usize, side: Side, entry_price: f64) -> ExitPlan {
        let atr_distance = self.atr[i] * ATR_MULTIPLIER;
        match side {
            Side::Long => {
                let swing_stop =
                    swing_low_through(candles, i, SWING_LOOKBACK) * (1.0 - STOP_BUFFER);
                ExitPlan {
                    stop: swing_stop.max(entry_price - atr_distance),
                    first_target: self.bands.middle[i],
                    second_target: Some(self.bands.upper[i]),
                }
            }
            Side::Short => {
                let swing_stop =
                    swing_high_through(candles, i, SWING_LOOKBACK) * (1.0 + STOP_BUFFER);
                ExitPlan {
                    stop: swing_stop.min(entry_price + atr_distance),
                    first_target: self.bands.middle[i],
                    second_target: Some(self.bands.lower[i]),
                }
            }
        }
    }

    fn evaluate_exit(&self, candles: &[Candle], i: usize, position: &Position) -> ExitAction {
        two_target_ladder(position, &candles[i])
    }
}
