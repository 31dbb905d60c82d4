//! Strategy identifiers and the per-bar policy each backtest drives.
//!
//! Every strategy is a small state machine behind [`StrategyPolicy`]. The
//! driver in [`crate::domain::backtest`] owns the position, balance and
//! ledger; a policy only answers four questions per bar:
//!
//! 1. [`StrategyPolicy::detect_setup`]: is the market in a state worth watching?
//! 2. [`StrategyPolicy::detect_trigger`]: does this bar open a position, and at
//!    what market price (before slippage)?
//! 3. [`StrategyPolicy::plan_exits`]: stop and targets for a fresh entry.
//! 4. [`StrategyPolicy::evaluate_exit`]: what happens to an open position on
//!    this bar, first matching rung of the strategy's exit ladder wins.
//!
//! Indicators are computed once per run in each policy's constructor.

pub mod ema_crossover;
pub mod hoffman_irb;
pub mod mean_reversion;
pub mod pullback_momentum;
pub mod registry;
pub mod snap_back;
pub mod squeeze_breakout;
pub mod trend_continuation;

use std::fmt;
use std::str::FromStr;

use crate::domain::candle::Candle;
use crate::domain::error::TradelabError;
use crate::domain::position::{ExitReason, Position, Side};

/// Share of the open size closed at each partial target.
pub const PARTIAL_FRACTION: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyId {
    MeanReversionHf,
    EmaCrossoverPartial,
    BbSqueezeBreakout,
    Ema50TrendContinuation,
    BbSnapBack,
    HoffmanIrb,
    HtfSmaCrossoverMomentum,
    DynamicRetest,
}

impl StrategyId {
    pub const ALL: [StrategyId; 8] = [
        StrategyId::MeanReversionHf,
        StrategyId::EmaCrossoverPartial,
        StrategyId::BbSqueezeBreakout,
        StrategyId::Ema50TrendContinuation,
        StrategyId::BbSnapBack,
        StrategyId::HoffmanIrb,
        StrategyId::HtfSmaCrossoverMomentum,
        StrategyId::DynamicRetest,
    ];

    pub const DEFAULT: StrategyId = StrategyId::MeanReversionHf;

    pub fn as_str(self) -> &'static str {
        match self {
            StrategyId::MeanReversionHf => "mean-reversion-hf",
            StrategyId::EmaCrossoverPartial => "ema-crossover-partial",
            StrategyId::BbSqueezeBreakout => "bb-squeeze-breakout",
            StrategyId::Ema50TrendContinuation => "50ema-trend-continuation",
            StrategyId::BbSnapBack => "bb-snap-back",
            StrategyId::HoffmanIrb => "hoffman-irb",
            StrategyId::HtfSmaCrossoverMomentum => "htf-sma-crossover-momentum",
            StrategyId::DynamicRetest => "dynamic-retest",
        }
    }

    /// Unknown identifiers fall back to [`StrategyId::DEFAULT`].
    pub fn parse_or_default(id: &str) -> Self {
        id.parse().unwrap_or(StrategyId::DEFAULT)
    }

    /// Shortest candle series the strategy will run on.
    pub fn min_candles(self) -> usize {
        match self {
            StrategyId::MeanReversionHf | StrategyId::EmaCrossoverPartial => 50,
            StrategyId::BbSqueezeBreakout | StrategyId::HoffmanIrb => 100,
            StrategyId::Ema50TrendContinuation => 60,
            StrategyId::BbSnapBack => 210,
            StrategyId::HtfSmaCrossoverMomentum | StrategyId::DynamicRetest => 200,
        }
    }

    /// First bar index the driver evaluates.
    pub fn warmup(self) -> usize {
        match self {
            StrategyId::MeanReversionHf | StrategyId::EmaCrossoverPartial => 50,
            StrategyId::BbSqueezeBreakout => squeeze_breakout::SQUEEZE_LOOKBACK,
            StrategyId::Ema50TrendContinuation => 52,
            StrategyId::BbSnapBack => 210,
            StrategyId::HoffmanIrb => 85,
            StrategyId::HtfSmaCrossoverMomentum | StrategyId::DynamicRetest => 200,
        }
    }

    /// Fraction of balance risked per trade unless the config overrides it.
    pub fn default_risk(self) -> f64 {
        match self {
            StrategyId::HoffmanIrb => 0.01,
            _ => 0.02,
        }
    }
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StrategyId {
    type Err = TradelabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StrategyId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| TradelabError::UnknownStrategy { id: s.to_string() })
    }
}

/// An entry signal. `market_price` is the reference price before slippage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trigger {
    pub side: Side,
    pub market_price: f64,
}

/// Protective stop and profit targets fixed at entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExitPlan {
    pub stop: f64,
    pub first_target: f64,
    pub second_target: Option<f64>,
}

/// Exit reference price (before slippage) and why.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fill {
    pub market_price: f64,
    pub reason: ExitReason,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExitAction {
    Hold,
    /// Keep the position open with new stops or flags.
    Amend(Position),
    /// Close `fraction` of the remaining size and continue as `next`.
    Partial {
        fill: Fill,
        fraction: f64,
        next: Position,
    },
    Close(Fill),
}

pub trait StrategyPolicy {
    /// Update setup state for bar `i` while flat. Strategies without a
    /// separate setup phase are always armed.
    fn detect_setup(&mut self, candles: &[Candle], i: usize) -> bool {
        let _ = (candles, i);
        true
    }

    fn detect_trigger(&mut self, candles: &[Candle], i: usize) -> Option<Trigger>;

    /// `entry_price` already includes entry slippage.
    fn plan_exits(&self, candles: &[Candle], i: usize, side: Side, entry_price: f64) -> ExitPlan;

    fn evaluate_exit(&self, candles: &[Candle], i: usize, position: &Position) -> ExitAction;
}

/// Construct the policy for `id`, precomputing its indicators over `candles`.
pub fn build_policy(id: StrategyId, candles: &[Candle]) -> Box<dyn StrategyPolicy> {
    match id {
        StrategyId::MeanReversionHf => Box::new(mean_reversion::MeanReversion::new(candles)),
        StrategyId::EmaCrossoverPartial => Box::new(ema_crossover::EmaCrossover::new(candles)),
        StrategyId::BbSqueezeBreakout => Box::new(squeeze_breakout::SqueezeBreakout::new(candles)),
        StrategyId::Ema50TrendContinuation => {
            Box::new(trend_continuation::TrendContinuation::new(candles))
        }
        StrategyId::BbSnapBack => Box::new(snap_back::SnapBack::new(candles)),
        StrategyId::HoffmanIrb => Box::new(hoffman_irb::HoffmanIrb::new(candles)),
        StrategyId::HtfSmaCrossoverMomentum | StrategyId::DynamicRetest => {
            Box::new(pullback_momentum::PullbackMomentum::new(candles))
        }
    }
}

/// Stop rung: fill at the stop, labelled breakeven once the stop sits at entry.
pub(crate) fn stop_exit(position: &Position, bar: &Candle) -> Option<ExitAction> {
    if !position.side.stopped(bar, position.stop_price) {
        return None;
    }
    let reason = if position.flags.moved_to_breakeven {
        ExitReason::Breakeven
    } else {
        ExitReason::StopLoss
    };
    Some(ExitAction::Close(Fill {
        market_price: position.stop_price,
        reason,
    }))
}

/// First-target rung: close half at the target and move the stop to entry.
pub(crate) fn first_target_partial(position: &Position, bar: &Candle) -> Option<ExitAction> {
    if position.flags.partial_taken || !position.side.reached(bar, position.first_target) {
        return None;
    }
    let mut next = position
        .with_stop_at_breakeven()
        .scaled_out(PARTIAL_FRACTION);
    next.flags.partial_taken = true;
    Some(ExitAction::Partial {
        fill: Fill {
            market_price: position.first_target,
            reason: ExitReason::PartialTarget,
        },
        fraction: PARTIAL_FRACTION,
        next,
    })
}

/// Ladder shared by the two-target strategies: half at the first target with
/// breakeven, the rest at the second target, otherwise the stop.
pub(crate) fn two_target_ladder(position: &Position, bar: &Candle) -> ExitAction {
    if let Some(action) = first_target_partial(position, bar) {
        return action;
    }
    if let Some(second) = position.second_target {
        if position.flags.partial_taken && position.side.reached(bar, second) {
            return ExitAction::Close(Fill {
                market_price: second,
                reason: ExitReason::Target,
            });
        }
    }
    stop_exit(position, bar).unwrap_or(ExitAction::Hold)
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::domain::candle::Candle;
    use crate::domain::position::{Position, PositionFlags, Side};

    pub fn bar(open: f64, high: f64, low: f64, close: f64) -> Candle {
        Candle {
            time: 0,
            open,
            high,
            low,
            close,
            volume: 100.0,
        }
    }

    pub fn flat_candles(n: usize) -> Vec<Candle> {
        (0..n)
            .map(|i| Candle {
                time: i as i64 * 3_600_000,
                open: 100.0,
                high: 100.0,
                low: 100.0,
                close: 100.0,
                volume: 100.0,
            })
            .collect()
    }

    pub fn open_position(side: Side, entry: f64, stop: f64, first: f64, second: Option<f64>) -> Position {
        Position {
            side,
            entry_price: entry,
            stop_price: stop,
            first_target: first,
            second_target: second,
            entry_index: 0,
            remaining_size: 1_000.0,
            flags: PositionFlags::default(),
            highest_since_entry: entry,
            lowest_since_entry: entry,
        }
    }
}
