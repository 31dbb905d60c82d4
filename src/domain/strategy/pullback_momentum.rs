//! Long-only pullback to EMA(50) inside an EMA(200) uptrend.
//!
//! Serves both `htf-sma-crossover-momentum` and `dynamic-retest`.
//!
//! Setup: the bar's low holds above EMA(200) while its range touches EMA(50)
//! and RSI(14) sits in 40..=55. The setup is cancelled once a close drops more
//! than 1% under EMA(50) or five bars pass without a trigger.
//!
//! Trigger: on a later bar, the previous candle closed green above its EMA(50).
//! Entry is at the current bar's open.
//!
//! Exits: half at the prior 20-bar swing high with the stop moved to entry;
//! the remainder closes when a close falls under EMA(20); otherwise the stop
//! (10-bar swing low, widened to at least 2 x ATR).

use super::{first_target_partial, stop_exit, ExitAction, ExitPlan, Fill, StrategyPolicy, Trigger};
use crate::domain::candle::Candle;
use crate::domain::indicator::{atr, calculate_atr, calculate_ema, calculate_rsi, rsi};
use crate::domain::indicator_helpers::{closes, swing_high_before, swing_low_before};
use crate::domain::position::{ExitReason, Position, Side};

const TREND_PERIOD: usize = 200;
const PULLBACK_PERIOD: usize = 50;
const RUNNER_PERIOD: usize = 20;
const RSI_MIN: f64 = 40.0;
const RSI_MAX: f64 = 55.0;
const INVALIDATION: f64 = 0.99;
const SETUP_EXPIRY_BARS: usize = 5;
const STOP_LOOKBACK: usize = 10;
const TARGET_LOOKBACK: usize = 20;
const MIN_STOP_ATR: f64 = 2.0;
const FALLBACK_STOP: f64 = 0.98;
const FALLBACK_TARGET_R: f64 = 1.5;

pub struct PullbackMomentum {
    trend: Vec<f64>,
    pullback: Vec<f64>,
    runner: Vec<f64>,
    rsi: Vec<f64>,
    atr: Vec<f64>,
    /// Bar index of the most recent qualifying touch.
    setup: Option<usize>,
}

impl PullbackMomentum {
    pub fn new(candles: &[Candle]) -> Self {
        let closes = closes(candles);
        PullbackMomentum {
            trend: calculate_ema(&closes, TREND_PERIOD),
            pullback: calculate_ema(&closes, PULLBACK_PERIOD),
            runner: calculate_ema(&closes, RUNNER_PERIOD),
            rsi: calculate_rsi(&closes, rsi::DEFAULT_PERIOD),
            atr: calculate_atr(candles, atr::DEFAULT_PERIOD),
            setup: None,
        }
    }
}

impl StrategyPolicy for PullbackMomentum {
    fn detect_setup(&mut self, candles: &[Candle], i: usize) -> bool {
        let bar = &candles[i];
        let ema50 = self.pullback[i];

        let uptrend = bar.low > self.trend[i];
        let touches = bar.low <= ema50 && bar.high >= ema50;
        if uptrend && touches && (RSI_MIN..=RSI_MAX).contains(&self.rsi[i]) {
            self.setup = Some(i);
        }

        if let Some(start) = self.setup {
            if bar.close < ema50 * INVALIDATION || i - start > SETUP_EXPIRY_BARS {
                self.setup = None;
            }
        }
        self.setup.is_some()
    }

    fn detect_trigger(&mut self, candles: &[Candle], i: usize) -> Option<Trigger> {
        let start = self.setup?;
        if i <= start {
            return None;
        }
        let prev = &candles[i - 1];
        if !(prev.is_bullish() && prev.close > self.pullback[i - 1]) {
            return None;
        }
        self.setup = None;
        Some(Trigger {
            side: Side::Long,
            market_price: candles[i].open,
        })
    }

    fn plan_exits(&self, candles: &[Candle], i: usize, _side: Side, entry_price: f64) -> ExitPlan {
        let mut stop = swing_low_before(candles, i, STOP_LOOKBACK);
        let min_distance = MIN_STOP_ATR * self.atr[i];
        if entry_price - stop < min_distance {
            stop = entry_price - min_distance;
        }
        if stop >= entry_price {
            stop = entry_price * FALLBACK_STOP;
        }

        let risk = entry_price - stop;
        let mut first_target = swing_high_before(candles, i, TARGET_LOOKBACK);
        if first_target <= entry_price + risk {
            first_target = entry_price + risk * FALLBACK_TARGET_R;
        }
        ExitPlan {
            stop,
            first_target,
            second_target: None,
        }
    }

    fn evaluate_exit(&self, candles: &[Candle], i: usize, position: &Position) -> ExitAction {
        let bar = &candles[i];
        if let Some(action) = first_target_partial(position, bar) {
            return action;
        }
        if position.flags.partial_taken && bar.close < self.runner[i] {
            return ExitAction::Close(Fill {
                market_price: bar.close,
                reason: ExitReason::TrendBreak,
            });
        }
        stop_exit(position, bar).unwrap_or(ExitAction::Hold)
    }
}
