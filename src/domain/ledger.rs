//! Running balance, equity curve and trade ledger for a single backtest run.

use super::execution::{ExecutionConfig, realized_pnl};
use super::position::{ExecutedTrade, ExitReason, Outcome, Side};

/// A close (full or partial) about to be booked.
#[derive(Debug, Clone, PartialEq)]
pub struct Closing {
    pub side: Side,
    pub entry_price: f64,
    pub entry_time: i64,
    /// Fill price after slippage.
    pub exit_price: f64,
    pub exit_time: i64,
    pub closed_size: f64,
    pub reason: ExitReason,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    pub starting_balance: f64,
    pub balance: f64,
    /// Seeded with the starting balance, then one point per processed bar.
    pub equity_curve: Vec<f64>,
    pub trades: Vec<ExecutedTrade>,
    pub wins: usize,
    pub losses: usize,
    pub gross_profit: f64,
    /// Sum of absolute losses.
    pub gross_loss: f64,
}

impl Ledger {
    pub fn new(starting_balance: f64) -> Self {
        Ledger {
            starting_balance,
            balance: starting_balance,
            equity_curve: vec![starting_balance],
            trades: Vec::new(),
            wins: 0,
            losses: 0,
            gross_profit: 0.0,
            gross_loss: 0.0,
        }
    }

    pub fn total_trades(&self) -> usize {
        self.wins + self.losses
    }

    /// Book a close: realize P&L net of the exit fee, update the balance and
    /// the win/loss tallies, append the trade.
    pub fn record_exit(&mut self, closing: Closing, config: &ExecutionConfig) -> &ExecutedTrade {
        let pnl = realized_pnl(
            closing.side,
            closing.entry_price,
            closing.exit_price,
            closing.closed_size,
            config,
        );
        let outcome = Outcome::from_pnl(pnl);
        match outcome {
            Outcome::Win => {
                self.wins += 1;
                self.gross_profit += pnl;
            }
            Outcome::Loss => {
                self.losses += 1;
                self.gross_loss += pnl.abs();
            }
        }
        self.balance += pnl;
        // Relative to the balance after this close is booked.
        let pnl_percent = if self.balance != 0.0 {
            pnl / self.balance * 100.0
        } else {
            0.0
        };

        let index = self.trades.len();
        self.trades.push(ExecutedTrade {
            entry_time: closing.entry_time,
            entry_price: closing.entry_price,
            exit_time: closing.exit_time,
            exit_price: closing.exit_price,
            side: closing.side,
            pnl,
            pnl_percent,
            outcome,
            exit_reason: closing.reason,
        });
        &self.trades[index]
    }

    pub fn record_equity(&mut self) {
        self.equity_curve.push(self.balance);
    }

    /// Trades ordered by entry time, most recent first. Stable, so partial
    /// closes of one position keep their booking order.
    pub fn trades_newest_first(&self) -> Vec<ExecutedTrade> {
        let mut trades = self.trades.clone();
        trades.sort_by(|a, b| b.entry_time.cmp(&a.entry_time));
        trades
    }
}
