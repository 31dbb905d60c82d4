//! 50-EMA trend continuation on a pullback and engulfing reversal.
//!
//! With the close above EMA(50), count the unbroken run of red candles
//! immediately before the current bar (looking back at most five). Two or more
//! arm the setup; a green candle that engulfs the last red body triggers a
//! long. Shorts mirror this below the EMA.
//!
//! Stop sits just beyond the swing extreme of the last six bars; the single
//! target is 2R. No partials.

use super::{ExitAction, ExitPlan, Fill, StrategyPolicy, Trigger};
use crate::domain::candle::Candle;
use crate::domain::indicator::calculate_ema;
use crate::domain::indicator_helpers::{closes, swing_high_through, swing_low_through};
use crate::domain::position::{ExitReason, Position, Side};

const EMA_PERIOD: usize = 50;
const PULLBACK_SCAN: usize = 5;
const MIN_PULLBACK_CANDLES: usize = 2;
const SWING_LOOKBACK: usize = 5;
const STOP_BUFFER: f64 = 0.002;
const REWARD_R: f64 = 2.0;

pub struct TrendContinuation {
    ema: Vec<f64>,
    /// Trend direction of the armed setup, if any.
    trend: Option<Side>,
}

impl TrendContinuation {
    pub fn new(candles: &[Candle]) -> Self {
        TrendContinuation {
            ema: calculate_ema(&closes(candles), EMA_PERIOD),
            trend: None,
        }
    }

    fn pullback_len(candles: &[Candle], i: usize, trend: Side) -> usize {
        let earliest = i.saturating_sub(PULLBACK_SCAN);
        (earliest..i)
            .rev()
            .take_while(|&j| match trend {
                Side::Long => candles[j].is_bearish(),
                Side::Short => candles[j].is_bullish(),
            })
            .count()
    }
}

fn engulfs(current: &Candle, prev: &Candle, side: Side) -> bool {
    if current.body() <= prev.body() {
        return false;
    }
    match side {
        Side::Long => {
            current.is_bullish()
                && prev.is_bearish()
                && current.open <= prev.close
                && current.close >= prev.open
        }
        Side::Short => {
            current.is_bearish()
                && prev.is_bullish()
                && current.open >= prev.close
                && current.close <= prev.open
        }
    }
}

impl StrategyPolicy for TrendContinuation {
    fn detect_setup(&mut self, candles: &[Candle], i: usize) -> bool {
        let close = candles[i].close;
        let trend = if close > self.ema[i] {
            Some(Side::Long)
        } else if close < self.ema[i] {
            Some(Side::Short)
        } else {
            None
        };
        self.trend =
            trend.filter(|&side| Self::pullback_len(candles, i, side) >= MIN_PULLBACK_CANDLES);
        self.trend.is_some()
    }

    fn detect_trigger(&mut self, candles: &[Candle], i: usize) -> Option<Trigger> {
        let side = self.trend?;
        if i == 0 || !engulfs(&candles[i], &candles[i - 1], side) {
            return None;
        }
        Some(Trigger {
            side,
            market_price: candles[i].close,
        })
    }

    fn plan_exits(&self, candles: &[Candle], i: usize, side: Side, entry_price: f64) -> ExitPlan {
        let stop = match side {
            Side::Long => swing_low_through(candles, i, SWING_LOOKBACK) * (1.0 - STOP_BUFFER),
            Side::Short => swing_high_through(candles, i, SWING_LOOKBACK) * (1.0 + STOP_BUFFER),
        };
        let risk = (entry_price - stop).abs();
        ExitPlan {
            stop,
            first_target: side.beyond(entry_price, risk * REWARD_R),
            second_target: None,
        }
    }

    fn evaluate_exit(&self, candles: &[Candle], i: usize, position: &Position) -> ExitAction {
        let bar = &candles[i];
        if position.side.reached(bar, position.first_target) {
            ExitAction::Close(Fill {
                market_price: position.first_target,
                reason: ExitReason::Target,
            })
        } else if position.side.stopped(bar, position.stop_price) {
            ExitAction::Close(Fill {
                market_price: position.stop_price,
                reason: ExitReason::StopLoss,
            })
        } else {
            ExitAction::Hold
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::strategy::test_support::{bar, flat_candles, open_position};

    fn green(close: f64, body: f64) -> Candle {
        bar(close - body, close + 0.2, close - body - 0.2, close)
    }

    fn red(close: f64, body: f64) -> Candle {
        bar(close + body, close + body + 0.2, close - 0.2, close)
    }

    /// Long uptrend, two red pullback bars, then a bullish engulfing bar.
    fn pullback_and_engulf() -> Vec<Candle> {
        let mut candles: Vec<Candle> = (0..57)
            .map(|i| green(100.0 + i as f64 * 0.5, 0.3))
            .collect();
        candles.push(red(127.8, 0.3));
        candles.push(red(127.5, 0.3));
        candles.push(green(128.6, 1.2));
        candles
    }

    #[test]
    fn pullback_arms_and_engulfing_triggers() {
        let candles = pullback_and_engulf();
        let mut policy = TrendContinuation::new(&candles);
        let i = candles.len() - 1;
        assert!(policy.detect_setup(&candles, i));
        let trigger = policy.detect_trigger(&candles, i).unwrap();
        assert_eq!(trigger.side, Side::Long);

        let plan = policy.plan_exits(&candles, i, Side::Long, trigger.market_price);
        assert!(plan.stop < trigger.market_price);
        assert!(plan.first_target > trigger.market_price);
        let risk = trigger.market_price - plan.stop;
        assert!((plan.first_target - trigger.market_price - 2.0 * risk).abs() < 1e-9);
    }

    #[test]
    fn single_red_bar_is_not_a_pullback() {
        let mut candles = pullback_and_engulf();
        let n = candles.len();
        candles[n - 3] = green(127.8, 0.3);
        let mut policy = TrendContinuation::new(&candles);
        assert!(!policy.detect_setup(&candles, n - 1));
    }

    #[test]
    fn flat_market_has_no_trend() {
        let candles = flat_candles(60);
        let mut policy = TrendContinuation::new(&candles);
        assert!(!policy.detect_setup(&candles, 55));
        assert!(policy.detect_trigger(&candles, 55).is_none());
    }

    #[test]
    fn target_checked_before_stop() {
        let candles = vec![bar(100.0, 106.0, 97.0, 101.0)];
        let policy = TrendContinuation {
            ema: vec![f64::NAN],
            trend: None,
        };
        let p = open_position(Side::Long, 100.0, 98.0, 104.0, None);
        assert_eq!(
            policy.evaluate_exit(&candles, 0, &p),
            ExitAction::Close(Fill {
                market_price: 104.0,
                reason: ExitReason::Target
            })
        );
    }
}
