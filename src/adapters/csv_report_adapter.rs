//! CSV report adapter implementing ReportPort.
//!
//! Writes the trade ledger to the output path and the equity curve next to it
//! as `<stem>_equity.csv`. A `#`-prefixed preamble names the strategy and its
//! headline figures.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::domain::backtest::BacktestResult;
use crate::domain::error::TradelabError;
use crate::domain::strategy::registry::StrategyDescription;
use crate::ports::report_port::ReportPort;

pub struct CsvReportAdapter;

/// `trades.csv` -> `trades_equity.csv`, in the same directory.
pub fn equity_path(output_path: &Path) -> PathBuf {
    let stem = output_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string());
    output_path.with_file_name(format!("{stem}_equity.csv"))
}

fn report_error(path: &Path, e: impl std::fmt::Display) -> TradelabError {
    TradelabError::Report {
        reason: format!("{}: {e}", path.display()),
    }
}

fn write_trades(
    path: &Path,
    result: &BacktestResult,
    description: &StrategyDescription,
) -> Result<(), TradelabError> {
    let mut file = File::create(path)?;
    writeln!(file, "# {} ({})", description.name, result.strategy)?;
    writeln!(
        file,
        "# trades={} wins={} losses={} win_rate={:.2} profit_factor={:.4} sharpe={:.4} final_balance={:.2}",
        result.total_trades,
        result.wins,
        result.losses,
        result.win_rate,
        result.profit_factor,
        result.sharpe_ratio,
        result.final_balance
    )?;

    let mut wtr = csv::Writer::from_writer(file);
    wtr.write_record([
        "entry_time",
        "entry_price",
        "exit_time",
        "exit_price",
        "side",
        "pnl",
        "pnl_percent",
        "outcome",
        "exit_reason",
    ])
    .map_err(|e| report_error(path, e))?;
    for trade in &result.trades {
        wtr.write_record([
            trade.entry_time.to_string(),
            format!("{:.6}", trade.entry_price),
            trade.exit_time.to_string(),
            format!("{:.6}", trade.exit_price),
            trade.side.to_string(),
            format!("{:.6}", trade.pnl),
            format!("{:.4}", trade.pnl_percent),
            trade.outcome.to_string(),
            trade.exit_reason.to_string(),
        ])
        .map_err(|e| report_error(path, e))?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_equity(path: &Path, equity_curve: &[f64]) -> Result<(), TradelabError> {
    let mut wtr = csv::Writer::from_path(path).map_err(|e| report_error(path, e))?;
    wtr.write_record(["step", "balance"])
        .map_err(|e| report_error(path, e))?;
    for (step, balance) in equity_curve.iter().enumerate() {
        wtr.write_record([step.to_string(), format!("{balance:.6}")])
            .map_err(|e| report_error(path, e))?;
    }
    wtr.flush()?;
    Ok(())
}

impl ReportPort for CsvReportAdapter {
    fn write(
        &self,
        result: &BacktestResult,
        description: &StrategyDescription,
        output_path: &str,
    ) -> Result<(), TradelabError> {
        let trades_path = Path::new(output_path);
        write_trades(trades_path, result, description)?;
        let equity = equity_path(trades_path);
        write_equity(&equity, &result.equity_curve)?;
        log::info!(
            "wrote {} trades to {} and equity curve to {}",
            result.trades.len(),
            trades_path.display(),
            equity.display()
        );
        Ok(())
    }
}
