//! Hoffman inventory retracement bar (IRB) breakout.
//!
//! The previous candle is an IRB when its close retraces at least 45% of its
//! range against its own direction. A long needs EMA(20) above EMA(80), an
//! EMA(20) slope of at least 28 degrees over five bars, a bullish IRB and the
//! current bar trading above the IRB high; entry is at the IRB high. Shorts
//! mirror through the IRB low.
//!
//! Stop 0.1% beyond the IRB's opposite extreme, target 1.3R. Once price reaches
//! 1R the stop moves to entry; the target and stop are then checked on the same
//! bar against the amended stop.

use super::{stop_exit, ExitAction, ExitPlan, Fill, StrategyPolicy, Trigger};
use crate::domain::candle::Candle;
use crate::domain::indicator::calculate_ema;
use crate::domain::indicator_helpers::{closes, slope_angle_degrees};
use crate::domain::position::{ExitReason, Position, Side};

const FAST_PERIOD: usize = 20;
const SLOW_PERIOD: usize = 80;
const RETRACEMENT: f64 = 0.45;
const MIN_ANGLE_DEGREES: f64 = 28.0;
const SLOPE_LOOKBACK: usize = 5;
const STOP_BUFFER: f64 = 0.001;
const REWARD_R: f64 = 1.3;

/// Direction of the trend an IRB candle pauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Irb {
    Bullish,
    Bearish,
}

impl Irb {
    pub fn classify(candle: &Candle) -> Option<Irb> {
        let range = candle.range();
        if range == 0.0 {
            return None;
        }
        if candle.is_bullish() {
            ((candle.high - candle.close) / range >= RETRACEMENT).then_some(Irb::Bullish)
        } else {
            ((candle.close - candle.low) / range >= RETRACEMENT).then_some(Irb::Bearish)
        }
    }
}

pub struct HoffmanIrb {
    fast: Vec<f64>,
    slow: Vec<f64>,
    irb: Option<Irb>,
}

impl HoffmanIrb {
    pub fn new(candles: &[Candle]) -> Self {
        let closes = closes(candles);
        HoffmanIrb {
            fast: calculate_ema(&closes, FAST_PERIOD),
            slow: calculate_ema(&closes, SLOW_PERIOD),
            irb: None,
        }
    }
}

impl StrategyPolicy for HoffmanIrb {
    fn detect_setup(&mut self, candles: &[Candle], i: usize) -> bool {
        self.irb = if i > 0 { Irb::classify(&candles[i - 1]) } else { None };
        self.irb.is_some()
    }

    fn detect_trigger(&mut self, candles: &[Candle], i: usize) -> Option<Trigger> {
        let irb = self.irb?;
        let (bar, irb_bar) = (&candles[i], &candles[i - 1]);
        let angle = slope_angle_degrees(&self.fast, i, SLOPE_LOOKBACK);

        if self.fast[i] > self.slow[i]
            && angle >= MIN_ANGLE_DEGREES
            && irb == Irb::Bullish
            && bar.high > irb_bar.high
        {
            return Some(Trigger {
                side: Side::Long,
                market_price: irb_bar.high,
            });
        }
        if self.fast[i] < self.slow[i]
            && angle <= -MIN_ANGLE_DEGREES
            && irb == Irb::Bearish
            && bar.low < irb_bar.low
        {
            return Some(Trigger {
                side: Side::Short,
                market_price: irb_bar.low,
            });
        }
        None
    }

    fn plan_exits(&self, candles: &[Candle], i: usize, side: Side, entry_price: f64) -> ExitPlan {
        let irb_bar = &candles[i - 1];
        let stop = match side {
            Side::Long => irb_bar.low * (1.0 - STOP_BUFFER),
            Side::Short => irb_bar.high * (1.0 + STOP_BUFFER),
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
        let one_r = position.side.beyond(position.entry_price, position.risk());
        let current = if !position.flags.moved_to_breakeven && position.side.reached(bar, one_r) {
            position.with_stop_at_breakeven()
        } else {
            position.clone()
        };

        if current.side.reached(bar, current.first_target) {
            return ExitAction::Close(Fill {
                market_price: current.first_target,
                reason: ExitReason::Target,
            });
        }
        if let Some(stop) = stop_exit(&current, bar) {
            return stop;
        }
        if current != *position {
            ExitAction::Amend(current)
        } else {
            ExitAction::Hold
        }
    }
}
