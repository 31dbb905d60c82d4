//! Configuration validation.
//!
//! Every `[backtest]` key is optional and falls back to the defaults of
//! [`BacktestConfig`]; a key that is present must parse and be in range.

use crate::domain::backtest::BacktestConfig;
use crate::domain::error::TradelabError;
use crate::domain::execution::ExecutionConfig;
use crate::domain::strategy::StrategyId;
use crate::ports::config_port::ConfigPort;

const SECTION: &str = "backtest";

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), TradelabError> {
    validate_starting_balance(config)?;
    validate_rate(config, "fee_rate")?;
    validate_rate(config, "slippage_rate")?;
    validate_max_position_fraction(config)?;
    validate_risk_per_trade(config)?;
    validate_periods_per_year(config)?;
    validate_strategy(config)?;
    Ok(())
}

/// Validated [`BacktestConfig`] with defaults for absent keys.
pub fn backtest_config_from(config: &dyn ConfigPort) -> Result<BacktestConfig, TradelabError> {
    validate_backtest_config(config)?;
    let defaults = BacktestConfig::default();
    let execution = &defaults.execution;
    Ok(BacktestConfig {
        starting_balance: read_double(config, "starting_balance")?
            .unwrap_or(defaults.starting_balance),
        execution: ExecutionConfig {
            fee_rate: read_double(config, "fee_rate")?.unwrap_or(execution.fee_rate),
            slippage_rate: read_double(config, "slippage_rate")?
                .unwrap_or(execution.slippage_rate),
            max_position_fraction: read_double(config, "max_position_fraction")?
                .unwrap_or(execution.max_position_fraction),
        },
        risk_per_trade: read_double(config, "risk_per_trade")?,
        periods_per_year: read_double(config, "periods_per_year")?
            .unwrap_or(defaults.periods_per_year),
    })
}

/// `Ok(None)` when the key is absent; an error when present but not a number.
fn read_double(config: &dyn ConfigPort, key: &str) -> Result<Option<f64>, TradelabError> {
    let Some(raw) = config.get_string(SECTION, key) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(Some)
        .ok_or_else(|| invalid(key, format!("{key} must be a number, got '{raw}'")))
}

fn invalid(key: &str, reason: String) -> TradelabError {
    TradelabError::ConfigInvalid {
        section: SECTION.to_string(),
        key: key.to_string(),
        reason,
    }
}

fn validate_starting_balance(config: &dyn ConfigPort) -> Result<(), TradelabError> {
    match read_double(config, "starting_balance")? {
        Some(value) if value <= 0.0 => Err(invalid(
            "starting_balance",
            "starting_balance must be positive".to_string(),
        )),
        _ => Ok(()),
    }
}

fn validate_rate(config: &dyn ConfigPort, key: &str) -> Result<(), TradelabError> {
    match read_double(config, key)? {
        Some(value) if !(0.0..1.0).contains(&value) => {
            Err(invalid(key, format!("{key} must be in [0, 1)")))
        }
        _ => Ok(()),
    }
}

fn validate_max_position_fraction(config: &dyn ConfigPort) -> Result<(), TradelabError> {
    match read_double(config, "max_position_fraction")? {
        Some(value) if value <= 0.0 || value > 1.0 => Err(invalid(
            "max_position_fraction",
            "max_position_fraction must be in (0, 1]".to_string(),
        )),
        _ => Ok(()),
    }
}

fn validate_risk_per_trade(config: &dyn ConfigPort) -> Result<(), TradelabError> {
    match read_double(config, "risk_per_trade")? {
        Some(value) if value <= 0.0 || value >= 1.0 => Err(invalid(
            "risk_per_trade",
            "risk_per_trade must be in (0, 1)".to_string(),
        )),
        _ => Ok(()),
    }
}

fn validate_periods_per_year(config: &dyn ConfigPort) -> Result<(), TradelabError> {
    match read_double(config, "periods_per_year")? {
        Some(value) if value <= 0.0 => Err(invalid(
            "periods_per_year",
            "periods_per_year must be positive".to_string(),
        )),
        _ => Ok(()),
    }
}

fn validate_strategy(config: &dyn ConfigPort) -> Result<(), TradelabError> {
    match config.get_string("data", "strategy") {
        Some(id) => id.trim().parse::<StrategyId>().map(|_| ()),
        None => Ok(()),
    }
}
