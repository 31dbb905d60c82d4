//! Performance statistics over a trade ledger and equity curve.

use super::position::{ExecutedTrade, Side};

/// Bars per year assumed when annualizing the Sharpe ratio.
pub const DEFAULT_PERIODS_PER_YEAR: f64 = 252.0;

/// Wins as a percentage of all trades; 0 with no trades.
pub fn win_rate(wins: usize, total_trades: usize) -> f64 {
    if total_trades > 0 {
        wins as f64 / total_trades as f64 * 100.0
    } else {
        0.0
    }
}

/// `gross_profit / gross_loss`; `+inf` for profit without loss, 0 when both are zero.
pub fn profit_factor(gross_profit: f64, gross_loss: f64) -> f64 {
    if gross_loss > 0.0 {
        gross_profit / gross_loss
    } else if gross_profit > 0.0 {
        f64::INFINITY
    } else {
        0.0
    }
}

/// Per-bar simple returns of an equity curve.
pub fn period_returns(equity_curve: &[f64]) -> Vec<f64> {
    equity_curve
        .windows(2)
        .map(|w| {
            let prev = w[0];
            if prev != 0.0 { (w[1] - prev) / prev } else { 0.0 }
        })
        .collect()
}

/// mean / population std-dev of period returns, times sqrt(periods_per_year).
/// Zero risk-free rate. Returns 0 when the deviation is zero.
pub fn sharpe_ratio(equity_curve: &[f64], periods_per_year: f64) -> f64 {
    let returns = period_returns(equity_curve);
    if returns.is_empty() {
        return 0.0;
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();

    if stddev > 0.0 {
        mean / stddev * periods_per_year.sqrt()
    } else {
        0.0
    }
}

/// Largest peak-to-trough decline as a fraction of the peak, and the longest
/// run of bars spent below a prior peak.
pub fn max_drawdown(equity_curve: &[f64]) -> (f64, usize) {
    let Some(&first) = equity_curve.first() else {
        return (0.0, 0);
    };

    let mut peak = first;
    let mut max_dd = 0.0_f64;
    let mut max_duration = 0usize;
    let mut duration = 0usize;

    for &equity in equity_curve {
        if equity >= peak {
            peak = equity;
            duration = 0;
        } else if peak > 0.0 {
            max_dd = max_dd.max((peak - equity) / peak);
            duration += 1;
            max_duration = max_duration.max(duration);
        }
    }

    (max_dd, max_duration)
}

/// Summary statistics beyond the headline figures on `BacktestResult`.
#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    /// Percent change from first to last equity point.
    pub total_return: f64,
    pub max_drawdown: f64,
    pub max_drawdown_duration: usize,
    pub avg_win: f64,
    /// Mean absolute loss.
    pub avg_loss: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    pub long_trades: usize,
    pub short_trades: usize,
}

impl Metrics {
    pub fn compute(trades: &[ExecutedTrade], equity_curve: &[f64]) -> Self {
        let initial = equity_curve.first().copied().unwrap_or(0.0);
        let final_equity = equity_curve.last().copied().unwrap_or(initial);
        let total_return = if initial > 0.0 {
            (final_equity / initial - 1.0) * 100.0
        } else {
            0.0
        };

        let (max_drawdown, max_drawdown_duration) = max_drawdown(equity_curve);

        let mut wins = 0usize;
        let mut losses = 0usize;
        let mut total_wins = 0.0_f64;
        let mut total_losses = 0.0_f64;
        let mut largest_win = 0.0_f64;
        let mut largest_loss = 0.0_f64;
        let mut long_trades = 0usize;

        for trade in trades {
            if trade.pnl > 0.0 {
                wins += 1;
                total_wins += trade.pnl;
                largest_win = largest_win.max(trade.pnl);
            } else {
                losses += 1;
                total_losses += trade.pnl.abs();
                largest_loss = largest_loss.max(trade.pnl.abs());
            }
            if trade.side == Side::Long {
                long_trades += 1;
            }
        }

        let avg_win = if wins > 0 { total_wins / wins as f64 } else { 0.0 };
        let avg_loss = if losses > 0 {
            total_losses / losses as f64
        } else {
            0.0
        };

        Metrics {
            total_return,
            max_drawdown,
            max_drawdown_duration,
            avg_win,
            avg_loss,
            largest_win,
            largest_loss,
            long_trades,
            short_trades: trades.len() - long_trades,
        }
    }
}
