//! Fill simulation: slippage, fees, position sizing and realized P&L.
//!
//! Slippage always moves the fill against the trader:
//! - long entry (buy): `price * (1 + s)`
//! - short entry (sell): `price * (1 - s)`
//! - long exit (sell): `price * (1 - s)`
//! - short exit (buy to cover): `price * (1 + s)`
//!
//! Sizes are notional amounts in quote currency, not unit counts.

use super::position::Side;

/// Cost and sizing parameters shared by every strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionConfig {
    /// Fraction of traded notional charged on entry and on every exit.
    pub fee_rate: f64,
    pub slippage_rate: f64,
    /// Upper bound on position notional as a fraction of balance.
    pub max_position_fraction: f64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        ExecutionConfig {
            fee_rate: 0.001,
            slippage_rate: 0.0005,
            max_position_fraction: 0.95,
        }
    }
}

pub fn apply_entry_slippage(side: Side, market_price: f64, slippage_rate: f64) -> f64 {
    match side {
        Side::Long => market_price * (1.0 + slippage_rate),
        Side::Short => market_price * (1.0 - slippage_rate),
    }
}

pub fn apply_exit_slippage(side: Side, market_price: f64, slippage_rate: f64) -> f64 {
    match side {
        Side::Long => market_price * (1.0 - slippage_rate),
        Side::Short => market_price * (1.0 + slippage_rate),
    }
}

pub fn calculate_fee(notional: f64, config: &ExecutionConfig) -> f64 {
    notional * config.fee_rate
}

/// Notional that loses `balance * risk_fraction` if the stop is hit,
/// capped at `max_position_fraction` of balance.
///
/// Returns `None` when the stop distance is zero, negative or not finite.
pub fn position_notional(
    balance: f64,
    risk_fraction: f64,
    entry_price: f64,
    stop_price: f64,
    config: &ExecutionConfig,
) -> Option<f64> {
    let risk_distance = (entry_price - stop_price).abs();
    if !(risk_distance > 0.0) || !risk_distance.is_finite() || !(entry_price > 0.0) {
        return None;
    }
    let risk_amount = balance * risk_fraction;
    let uncapped = risk_amount / (risk_distance / entry_price);
    Some(uncapped.min(balance * config.max_position_fraction))
}

/// Notional left in the position after the entry fee.
pub fn size_after_entry_fee(notional: f64, config: &ExecutionConfig) -> f64 {
    notional - calculate_fee(notional, config)
}

/// Net P&L of closing `closed_size` notional at `exit_price`, exit fee included.
pub fn realized_pnl(
    side: Side,
    entry_price: f64,
    exit_price: f64,
    closed_size: f64,
    config: &ExecutionConfig,
) -> f64 {
    let units = closed_size / entry_price;
    let gross = match side {
        Side::Long => (exit_price - entry_price) * units,
        Side::Short => (entry_price - exit_price) * units,
    };
    gross - calculate_fee(closed_size, config)
}
