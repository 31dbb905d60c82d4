//! Bollinger squeeze breakout.
//!
//! Setup: the current band width sits at or below the 20th percentile of the
//! previous 90 widths (at least 72 of them defined). Trigger: the close breaks
//! out of the band on twice the 20-bar average volume, RSI(14) inside the
//! directional band (50-70 long, 30-50 short) and the MACD histogram on the
//! breakout side and expanding.
//!
//! Exit ladder, first match per bar:
//! - 2.5%: close half, stop to entry
//! - 4.5%: close half of what remains, arm a 2% trailing stop off the best close
//! - once trailing, only the trailing stop applies
//! - 1.8% stop
//! - 48-bar timeout

use super::{
    first_target_partial, stop_exit, ExitAction, ExitPlan, Fill, StrategyPolicy, Trigger,
    PARTIAL_FRACTION,
};
use crate::domain::candle::Candle;
use crate::domain::indicator::{
    bollinger, calculate_bollinger, calculate_macd, calculate_rsi, calculate_sma, macd, rsi,
    BollingerBands,
};
use crate::domain::indicator_helpers::{closes, volumes};
use crate::domain::position::{ExitReason, Position, Side};

pub const SQUEEZE_LOOKBACK: usize = 90;
const MIN_DEFINED_WIDTHS: usize = 72;
const SQUEEZE_PERCENTILE: f64 = 0.2;
const VOLUME_PERIOD: usize = 20;
const VOLUME_MULTIPLIER: f64 = 2.0;
const STOP_PCT: f64 = 0.018;
const FIRST_TARGET_PCT: f64 = 0.025;
const SECOND_TARGET_PCT: f64 = 0.045;
const TRAILING_PCT: f64 = 0.02;
const MAX_BARS_HELD: usize = 48;

pub struct SqueezeBreakout {
    bands: BollingerBands,
    width: Vec<f64>,
    rsi: Vec<f64>,
    histogram: Vec<f64>,
    volume_avg: Vec<f64>,
}

impl SqueezeBreakout {
    pub fn new(candles: &[Candle]) -> Self {
        let closes = closes(candles);
        let bands = calculate_bollinger(
            &closes,
            bollinger::DEFAULT_PERIOD,
            bollinger::DEFAULT_MULTIPLIER,
        );
        let width = bands.width();
        SqueezeBreakout {
            bands,
            width,
            rsi: calculate_rsi(&closes, rsi::DEFAULT_PERIOD),
            histogram: calculate_macd(
                &closes,
                macd::DEFAULT_FAST,
                macd::DEFAULT_SLOW,
                macd::DEFAULT_SIGNAL,
            )
            .histogram,
            volume_avg: calculate_sma(&volumes(candles), VOLUME_PERIOD),
        }
    }

    /// 20th-percentile band width over the bars before `i`, if enough are defined.
    fn squeeze_threshold(&self, i: usize) -> Option<f64> {
        let mut recent: Vec<f64> = self.width[i.saturating_sub(SQUEEZE_LOOKBACK)..i]
            .iter()
            .copied()
            .filter(|w| !w.is_nan())
            .collect();
        if recent.len() < MIN_DEFINED_WIDTHS {
            return None;
        }
        recent.sort_by(f64::total_cmp);
        let index = (recent.len() as f64 * SQUEEZE_PERCENTILE).floor() as usize;
        recent.get(index).copied()
    }
}

impl StrategyPolicy for SqueezeBreakout {
    fn detect_setup(&mut self, _candles: &[Candle], i: usize) -> bool {
        self.squeeze_threshold(i)
            .is_some_and(|threshold| self.width[i] <= threshold)
    }

    fn detect_trigger(&mut self, candles: &[Candle], i: usize) -> Option<Trigger> {
        if i == 0 {
            return None;
        }
        let bar = &candles[i];
        let rsi = self.rsi[i];
        let hist = self.histogram[i];
        let prev_hist = self.histogram[i - 1];
        let volume_spike = bar.volume > self.volume_avg[i] * VOLUME_MULTIPLIER;

        let long = bar.close > self.bands.upper[i]
            && volume_spike
            && (50.0..=70.0).contains(&rsi)
            && hist > 0.0
            && hist > prev_hist;
        let short = bar.close < self.bands.lower[i]
            && volume_spike
            && (30.0..=50.0).contains(&rsi)
            && hist < 0.0
            && hist < prev_hist;

        let side = match (long, short) {
            (true, _) => Side::Long,
            (false, true) => Side::Short,
            (false, false) => return None,
        };
        Some(Trigger {
            side,
            market_price: bar.close,
        })
    }

    fn plan_exits(&self, _candles: &[Candle], _i: usize, side: Side, entry_price: f64) -> ExitPlan {
        let stop = match side {
            Side::Long => entry_price * (1.0 - STOP_PCT),
            Side::Short => entry_price * (1.0 + STOP_PCT),
        };
        ExitPlan {
            stop,
            first_target: side.beyond(entry_price, entry_price * FIRST_TARGET_PCT),
            second_target: Some(side.beyond(entry_price, entry_price * SECOND_TARGET_PCT)),
        }
    }

    fn evaluate_exit(&self, candles: &[Candle], i: usize, position: &Position) -> ExitAction {
        let bar = &candles[i];
        let flags = position.flags;

        if let Some(action) = first_target_partial(position, bar) {
            return action;
        }

        if let Some(second) = position.second_target {
            if flags.partial_taken
                && !flags.second_partial_taken
                && position.side.reached(bar, second)
            {
                let mut next = position.scaled_out(PARTIAL_FRACTION);
                next.flags.second_partial_taken = true;
                next.flags.trailing_active = true;
                return ExitAction::Partial {
                    fill: Fill {
                        market_price: second,
                        reason: ExitReason::PartialTarget,
                    },
                    fraction: PARTIAL_FRACTION,
                    next,
                };
            }
        }

        if flags.trailing_active {
            let trail = match position.side {
                Side::Long => position.highest_since_entry * (1.0 - TRAILING_PCT),
                Side::Short => position.lowest_since_entry * (1.0 + TRAILING_PCT),
            };
            return if position.side.stopped(bar, trail) {
                ExitAction::Close(Fill {
                    market_price: trail,
                    reason: ExitReason::TrailingStop,
                })
            } else {
                ExitAction::Hold
            };
        }

        if let Some(stop) = stop_exit(position, bar) {
            return stop;
        }
        if position.bars_held(i) >= MAX_BARS_HELD {
            return ExitAction::Close(Fill {
                market_price: bar.close,
                reason: ExitReason::Timeout,
            });
        }
        ExitAction::Hold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::strategy::test_support::{bar, flat_candles, open_position};

    fn policy() -> (Vec<Candle>, SqueezeBreakout) {
        let candles = flat_candles(120);
        let policy = SqueezeBreakout::new(&candles);
        (candles, policy)
    }

    #[test]
    fn flat_market_is_a_squeeze() {
        let (candles, mut policy) = policy();
        assert!(policy.detect_setup(&candles, 100));
        assert!(policy.detect_trigger(&candles, 100).is_none());
    }

    #[test]
    fn not_enough_defined_widths() {
        let (candles, mut policy) = policy();
        // widths defined from index 19; 19..90 gives 71
        assert!(!policy.detect_setup(&candles, 90));
        assert!(policy.detect_setup(&candles, 91));
    }

    #[test]
    fn plan_uses_percent_targets() {
        let (candles, policy) = policy();
        let plan = policy.plan_exits(&candles, 100, Side::Short, 200.0);
        assert!((plan.stop - 203.6).abs() < 1e-9);
        assert!((plan.first_target - 195.0).abs() < 1e-9);
        assert!((plan.second_target.unwrap() - 191.0).abs() < 1e-9);
    }

    #[test]
    fn second_target_arms_trailing_stop() {
        let mut candles = flat_candles(100);
        candles.push(bar(104.0, 104.6, 103.9, 104.4));
        let policy = SqueezeBreakout::new(&candles);
        let mut p = open_position(Side::Long, 100.0, 100.0, 102.5, Some(104.5));
        p.flags.partial_taken = true;
        p.flags.moved_to_breakeven = true;

        let ExitAction::Partial { fill, next, .. } = policy.evaluate_exit(&candles, 100, &p) else {
            panic!("expected second partial");
        };
        assert_eq!(fill.market_price, 104.5);
        assert!(next.flags.trailing_active);
        assert!(next.flags.second_partial_taken);
        assert!((next.remaining_size - 500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn trailing_stop_replaces_fixed_stop() {
        let mut candles = flat_candles(100);
        // dips under the entry stop but stays above the trail
        candles.push(bar(106.0, 106.2, 99.0, 106.0));
        let policy = SqueezeBreakout::new(&candles);
        let mut p = open_position(Side::Long, 100.0, 100.0, 102.5, Some(104.5));
        p.flags.partial_taken = true;
        p.flags.second_partial_taken = true;
        p.flags.trailing_active = true;
        p.highest_since_entry = 100.5;

        // trail = 100.5 * 0.98 = 98.49, low 99.0 holds
        assert_eq!(policy.evaluate_exit(&candles, 100, &p), ExitAction::Hold);

        p.highest_since_entry = 110.0;
        assert_eq!(
            policy.evaluate_exit(&candles, 100, &p),
            ExitAction::Close(Fill {
                market_price: 110.0 * 0.98,
                reason: ExitReason::TrailingStop
            })
        );
    }

    #[test]
    fn timeout_after_max_hold() {
        let (candles, policy) = policy();
        let mut p = open_position(Side::Short, 100.0, 101.8, 97.5, Some(95.5));
        p.entry_index = 100 - MAX_BARS_HELD;
        assert_eq!(
            policy.evaluate_exit(&candles, 100, &p),
            ExitAction::Close(Fill {
                market_price: 100.0,
                reason: ExitReason::Timeout
            })
        );
    }
}
