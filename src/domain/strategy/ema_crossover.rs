//! EMA(20)/EMA(50) crossover with two-stage profit taking.
//!
//! Long on an upward cross with RSI(14) above 50, short on a downward cross
//! with RSI below 50. Stop 1.8% from entry; half the position closes at 1.5R
//! with the stop moved to entry, the rest at 2.5R.

use super::{two_target_ladder, ExitAction, ExitPlan, StrategyPolicy, Trigger};
use crate::domain::candle::Candle;
use crate::domain::indicator::{calculate_ema, calculate_rsi, rsi};
use crate::domain::indicator_helpers::{closes, crossed_above, crossed_below};
use crate::domain::position::{Position, Side};

const FAST_PERIOD: usize = 20;
const SLOW_PERIOD: usize = 50;
const RSI_MIDLINE: f64 = 50.0;
const STOP_PCT: f64 = 0.018;
const FIRST_TARGET_R: f64 = 1.5;
const SECOND_TARGET_R: f64 = 2.5;

pub struct EmaCrossover {
    fast: Vec<f64>,
    slow: Vec<f64>,
    rsi: Vec<f64>,
}

impl EmaCrossover {
    pub fn new(candles: &[Candle]) -> Self {
        let closes = closes(candles);
        EmaCrossover {
            fast: calculate_ema(&closes, FAST_PERIOD),
            slow: calculate_ema(&closes, SLOW_PERIOD),
            rsi: calculate_rsi(&closes, rsi::DEFAULT_PERIOD),
        }
    }
}

impl StrategyPolicy for EmaCrossover {
    fn detect_trigger(&mut self, candles: &[Candle], i: usize) -> Option<Trigger> {
        let side = if crossed_above(&self.fast, &self.slow, i) && self.rsi[i] > RSI_MIDLINE {
            Side::Long
        } else if crossed_below(&self.fast, &self.slow, i) && self.rsi[i] < RSI_MIDLINE {
            Side::Short
        } else {
            return None;
        };
        Some(Trigger {
            side,
            market_price: candles[i].close,
        })
    }

    fn plan_exits(&self, _candles: &[Candle], _i: usize, side: Side, entry_price: f64) -> ExitPlan {
        let stop = match side {
            Side::Long => entry_price * (1.0 - STOP_PCT),
            Side::Short => entry_price * (1.0 + STOP_PCT),
        };
        let risk = (entry_price - stop).abs();
        ExitPlan {
            stop,
            first_target: side.beyond(entry_price, risk * FIRST_TARGET_R),
            second_target: Some(side.beyond(entry_price, risk * SECOND_TARGET_R)),
        }
    }

    fn evaluate_exit(&self, candles: &[Candle], i: usize, position: &Position) -> ExitAction {
        two_target_ladder(position, &candles[i])
    }
}
