//! Open positions and executed trades.
//!
//! A [`Position`] belongs to exactly one backtest run. Transitions (partial
//! exits, stop moves, extrema tracking) return a new value instead of patching
//! the old one in place.

use std::fmt;

use crate::domain::candle::Candle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Long,
    Short,
}

impl Side {
    /// `bar` traded at or through a profit level.
    pub fn reached(self, bar: &Candle, level: f64) -> bool {
        match self {
            Side::Long => bar.high >= level,
            Side::Short => bar.low <= level,
        }
    }

    /// `bar` traded at or through a protective stop.
    pub fn stopped(self, bar: &Candle, stop: f64) -> bool {
        match self {
            Side::Long => bar.low <= stop,
            Side::Short => bar.high >= stop,
        }
    }

    /// Move `price` by `distance` in this side's favour.
    pub fn beyond(self, price: f64, distance: f64) -> f64 {
        match self {
            Side::Long => price + distance,
            Side::Short => price - distance,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Long => write!(f, "long"),
            Side::Short => write!(f, "short"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PositionFlags {
    pub partial_taken: bool,
    pub second_partial_taken: bool,
    pub moved_to_breakeven: bool,
    pub trailing_active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub side: Side,
    pub entry_price: f64,
    pub stop_price: f64,
    pub first_target: f64,
    pub second_target: Option<f64>,
    pub entry_index: usize,
    /// Notional still open, after the entry fee.
    pub remaining_size: f64,
    pub flags: PositionFlags,
    pub highest_since_entry: f64,
    pub lowest_since_entry: f64,
}

impl Position {
    /// Distance between entry and the current stop.
    pub fn risk(&self) -> f64 {
        (self.entry_price - self.stop_price).abs()
    }

    pub fn bars_held(&self, index: usize) -> usize {
        index.saturating_sub(self.entry_index)
    }

    pub fn with_extrema(&self, price: f64) -> Self {
        Position {
            highest_since_entry: self.highest_since_entry.max(price),
            lowest_since_entry: self.lowest_since_entry.min(price),
            ..self.clone()
        }
    }

    pub fn with_stop_at_breakeven(&self) -> Self {
        Position {
            stop_price: self.entry_price,
            flags: PositionFlags {
                moved_to_breakeven: true,
                ..self.flags
            },
            ..self.clone()
        }
    }

    /// Keep `1 - fraction` of the open size.
    pub fn scaled_out(&self, fraction: f64) -> Self {
        Position {
            remaining_size: self.remaining_size - self.remaining_size * fraction,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Loss,
}

impl Outcome {
    /// Strictly positive P&L wins; zero counts as a loss.
    pub fn from_pnl(pnl: f64) -> Self {
        if pnl > 0.0 { Outcome::Win } else { Outcome::Loss }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Win => write!(f, "Win"),
            Outcome::Loss => write!(f, "Loss"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    Target,
    PartialTarget,
    StopLoss,
    Breakeven,
    TrailingStop,
    Timeout,
    IndicatorExtreme,
    TrendBreak,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExitReason::Target => "target",
            ExitReason::PartialTarget => "partial target",
            ExitReason::StopLoss => "stop loss",
            ExitReason::Breakeven => "breakeven",
            ExitReason::TrailingStop => "trailing stop",
            ExitReason::Timeout => "timeout",
            ExitReason::IndicatorExtreme => "indicator extreme",
            ExitReason::TrendBreak => "trend break",
        };
        write!(f, "{s}")
    }
}

/// One full or partial close, immutable once recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutedTrade {
    pub entry_time: i64,
    pub entry_price: f64,
    pub exit_time: i64,
    pub exit_price: f64,
    pub side: Side,
    pub pnl: f64,
    pub pnl_percent: f64,
    pub outcome: Outcome,
    pub exit_reason: ExitReason,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(high: f64, low: f64) -> Candle {
        Candle {
            time: 0,
            open: low,
            high,
            low,
            close: high,
            volume: 1.0,
        }
    }

    fn sample_long() -> Position {
        Position {
            side: Side::Long,
            entry_price: 100.0,
            stop_price: 97.0,
            first_target: 104.0,
            second_target: Some(108.0),
            entry_index: 10,
            remaining_size: 1_000.0,
            flags: PositionFlags::default(),
            highest_since_entry: 100.0,
            lowest_since_entry: 100.0,
        }
    }

    #[test]
    fn long_reached_and_stopped() {
        assert!(Side::Long.reached(&bar(104.0, 99.0), 104.0));
        assert!(!Side::Long.reached(&bar(103.9, 99.0), 104.0));
        assert!(Side::Long.stopped(&bar(101.0, 97.0), 97.0));
        assert!(!Side::Long.stopped(&bar(101.0, 97.1), 97.0));
    }

    #[test]
    fn short_reached_and_stopped() {
        assert!(Side::Short.reached(&bar(101.0, 96.0), 96.0));
        assert!(!Side::Short.reached(&bar(101.0, 96.1), 96.0));
        assert!(Side::Short.stopped(&bar(103.0, 99.0), 103.0));
        assert!(!Side::Short.stopped(&bar(102.9, 99.0), 103.0));
    }

    #[test]
    fn beyond_moves_in_favour() {
        assert_eq!(Side::Long.beyond(100.0, 5.0), 105.0);
        assert_eq!(Side::Short.beyond(100.0, 5.0), 95.0);
    }

    #[test]
    fn risk_and_bars_held() {
        let p = sample_long();
        assert!((p.risk() - 3.0).abs() < f64::EPSILON);
        assert_eq!(p.bars_held(15), 5);
        assert_eq!(p.bars_held(5), 0);
    }

    #[test]
    fn breakeven_returns_new_value() {
        let p = sample_long();
        let moved = p.with_stop_at_breakeven();
        assert_eq!(moved.stop_price, 100.0);
        assert!(moved.flags.moved_to_breakeven);
        assert_eq!(p.stop_price, 97.0);
        assert!(!p.flags.moved_to_breakeven);
    }

    #[test]
    fn scaled_out_halves_size() {
        let p = sample_long().scaled_out(0.5);
        assert!((p.remaining_size - 500.0).abs() < f64::EPSILON);
        let q = p.scaled_out(0.5);
        assert!((q.remaining_size - 250.0).abs() < f64::EPSILON);
    }

    #[test]
    fn extrema_tracking() {
        let p = sample_long().with_extrema(105.0).with_extrema(98.0);
        assert_eq!(p.highest_since_entry, 105.0);
        assert_eq!(p.lowest_since_entry, 98.0);
    }

    #[test]
    fn outcome_from_pnl() {
        assert_eq!(Outcome::from_pnl(0.01), Outcome::Win);
        assert_eq!(Outcome::from_pnl(0.0), Outcome::Loss);
        assert_eq!(Outcome::from_pnl(-3.0), Outcome::Loss);
    }

    #[test]
    fn display_strings() {
        assert_eq!(Side::Short.to_string(), "short");
        assert_eq!(Outcome::Win.to_string(), "Win");
        assert_eq!(ExitReason::TrailingStop.to_string(), "trailing stop");
    }
}
