//! Bar-by-bar backtest driver.
//!
//! One forward pass over the candles per run. While flat the strategy policy
//! is asked for a setup and then a trigger; an entry fills at the trigger price
//! plus slippage and is sized from the stop distance. While in a position the
//! policy walks its exit ladder and the driver books whatever it returns.
//! The balance is appended to the equity curve after every processed bar.

use super::candle::Candle;
use super::execution::{
    apply_entry_slippage, apply_exit_slippage, position_notional, size_after_entry_fee,
    ExecutionConfig,
};
use super::ledger::{Closing, Ledger};
use super::metrics::{profit_factor, sharpe_ratio, win_rate, DEFAULT_PERIODS_PER_YEAR};
use super::position::{ExecutedTrade, Position, PositionFlags};
use super::strategy::{build_policy, ExitAction, Fill, StrategyId, StrategyPolicy};

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub starting_balance: f64,
    pub execution: ExecutionConfig,
    /// Overrides the strategy's own risk budget when set.
    pub risk_per_trade: Option<f64>,
    /// Annualisation factor for the Sharpe ratio.
    pub periods_per_year: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            starting_balance: 10_000.0,
            execution: ExecutionConfig::default(),
            risk_per_trade: None,
            periods_per_year: DEFAULT_PERIODS_PER_YEAR,
        }
    }
}

impl BacktestConfig {
    pub fn risk_for(&self, strategy: StrategyId) -> f64 {
        self.risk_per_trade.unwrap_or_else(|| strategy.default_risk())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub strategy: StrategyId,
    pub total_trades: usize,
    pub wins: usize,
    pub losses: usize,
    /// Percent of closes with positive P&L.
    pub win_rate: f64,
    pub profit_factor: f64,
    pub sharpe_ratio: f64,
    pub final_balance: f64,
    pub equity_curve: Vec<f64>,
    /// Newest entry first.
    pub trades: Vec<ExecutedTrade>,
}

impl BacktestResult {
    /// Result of a run that never started.
    pub fn empty(strategy: StrategyId, starting_balance: f64) -> Self {
        BacktestResult {
            strategy,
            total_trades: 0,
            wins: 0,
            losses: 0,
            win_rate: 0.0,
            profit_factor: 0.0,
            sharpe_ratio: 0.0,
            final_balance: starting_balance,
            equity_curve: vec![starting_balance],
            trades: Vec::new(),
        }
    }
}

/// Run `strategy_id` with default costs. Unknown ids run the default strategy.
pub fn run_backtest(candles: &[Candle], strategy_id: &str) -> BacktestResult {
    run_backtest_with(
        candles,
        StrategyId::parse_or_default(strategy_id),
        &BacktestConfig::default(),
    )
}

pub fn run_backtest_with(
    candles: &[Candle],
    strategy: StrategyId,
    config: &BacktestConfig,
) -> BacktestResult {
    if candles.len() < strategy.min_candles() {
        log::debug!(
            "{strategy}: {} candles, need {}; nothing to run",
            candles.len(),
            strategy.min_candles()
        );
        return BacktestResult::empty(strategy, config.starting_balance);
    }

    let mut policy = build_policy(strategy, candles);
    let risk_fraction = config.risk_for(strategy);
    let (ledger, position) = simulate(
        policy.as_mut(),
        candles,
        strategy.warmup(),
        risk_fraction,
        config,
    );

    if let Some(open) = &position {
        log::debug!(
            "{strategy}: {} position from bar {} still open at end of data",
            open.side,
            open.entry_index
        );
    }

    let total_trades = ledger.total_trades();
    let result = BacktestResult {
        strategy,
        total_trades,
        wins: ledger.wins,
        losses: ledger.losses,
        win_rate: win_rate(ledger.wins, total_trades),
        profit_factor: profit_factor(ledger.gross_profit, ledger.gross_loss),
        sharpe_ratio: sharpe_ratio(&ledger.equity_curve, config.periods_per_year),
        final_balance: ledger.balance,
        trades: ledger.trades_newest_first(),
        equity_curve: ledger.equity_curve,
    };
    log::info!(
        "{strategy}: {} trades ({}W/{}L), final balance {:.2}",
        result.total_trades,
        result.wins,
        result.losses,
        result.final_balance
    );
    result
}

/// Drive `policy` from bar `start` to the end. Returns the ledger and any
/// position still open after the last bar.
fn simulate(
    policy: &mut dyn StrategyPolicy,
    candles: &[Candle],
    start: usize,
    risk_fraction: f64,
    config: &BacktestConfig,
) -> (Ledger, Option<Position>) {
    let mut ledger = Ledger::new(config.starting_balance);
    let mut position: Option<Position> = None;

    for i in start..candles.len() {
        position = match position.take() {
            None => try_enter(policy, candles, i, ledger.balance, risk_fraction, config),
            Some(open) => {
                let open = open.with_extrema(candles[i].close);
                let action = policy.evaluate_exit(candles, i, &open);
                apply_exit(action, open, candles, i, &mut ledger, config)
            }
        };
        ledger.record_equity();
    }
    (ledger, position)
}

fn try_enter(
    policy: &mut dyn StrategyPolicy,
    candles: &[Candle],
    i: usize,
    balance: f64,
    risk_fraction: f64,
    config: &BacktestConfig,
) -> Option<Position> {
    if !policy.detect_setup(candles, i) {
        return None;
    }
    let trigger = policy.detect_trigger(candles, i)?;
    let side = trigger.side;
    let entry_price =
        apply_entry_slippage(side, trigger.market_price, config.execution.slippage_rate);
    let plan = policy.plan_exits(candles, i, side, entry_price);

    let Some(notional) = position_notional(
        balance,
        risk_fraction,
        entry_price,
        plan.stop,
        &config.execution,
    ) else {
        log::warn!(
            "bar {i}: skipping {side} entry at {entry_price:.4}, stop {:.4} gives no usable size",
            plan.stop
        );
        return None;
    };

    log::debug!(
        "bar {i}: open {side} at {entry_price:.4} stop {:.4} target {:.4}",
        plan.stop,
        plan.first_target
    );
    let close = candles[i].close;
    Some(Position {
        side,
        entry_price,
        stop_price: plan.stop,
        first_target: plan.first_target,
        second_target: plan.second_target,
        entry_index: i,
        remaining_size: size_after_entry_fee(notional, &config.execution),
        flags: PositionFlags::default(),
        highest_since_entry: close,
        lowest_since_entry: close,
    })
}

fn apply_exit(
    action: ExitAction,
    open: Position,
    candles: &[Candle],
    i: usize,
    ledger: &mut Ledger,
    config: &BacktestConfig,
) -> Option<Position> {
    match action {
        ExitAction::Hold => Some(open),
        ExitAction::Amend(next) => Some(next),
        ExitAction::Partial {
            fill,
            fraction,
            next,
        } => {
            book(ledger, candles, i, &open, fill, open.remaining_size * fraction, config);
            Some(next)
        }
        ExitAction::Close(fill) => {
            book(ledger, candles, i, &open, fill, open.remaining_size, config);
            None
        }
    }
}

fn book(
    ledger: &mut Ledger,
    candles: &[Candle],
    i: usize,
    position: &Position,
    fill: Fill,
    closed_size: f64,
    config: &BacktestConfig,
) {
    let exit_price =
        apply_exit_slippage(position.side, fill.market_price, config.execution.slippage_rate);
    let trade = ledger.record_exit(
        Closing {
            side: position.side,
            entry_price: position.entry_price,
            entry_time: candles[position.entry_index].time,
            exit_price,
            exit_time: candles[i].time,
            closed_size,
            reason: fill.reason,
        },
        &config.execution,
    );
    log::debug!(
        "bar {i}: {} {} exit at {:.4}, pnl {:.2}",
        trade.side,
        trade.exit_reason,
        trade.exit_price,
        trade.pnl
    );
}
