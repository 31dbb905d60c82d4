//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{run_backtest_with, BacktestConfig, BacktestResult};
use crate::domain::config_validation::{backtest_config_from, validate_backtest_config};
use crate::domain::error::TradelabError;
use crate::domain::metrics::Metrics;
use crate::domain::signal::{check_signal, Signal};
use crate::domain::strategy::registry::describe;
use crate::domain::strategy::StrategyId;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "tradelab", about = "Candle strategy backtester and signal checker")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest over one symbol's candles
    Backtest {
        /// Directory holding `<symbol>.csv` files (overrides [data] directory)
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
        /// Overrides [data] symbol
        #[arg(long)]
        symbol: Option<String>,
        /// Strategy id (overrides [data] strategy)
        #[arg(short, long)]
        strategy: Option<String>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Trade ledger CSV; the equity curve goes beside it
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Check the latest bar for a signal
    Signal {
        #[arg(short, long)]
        data_dir: PathBuf,
        #[arg(long)]
        symbol: String,
    },
    /// List the available strategies
    Strategies,
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let outcome = match cli.command {
        Command::Backtest {
            data_dir,
            symbol,
            strategy,
            config,
            output,
        } => run_backtest(
            data_dir.as_deref(),
            symbol.as_deref(),
            strategy.as_deref(),
            config.as_deref(),
            output.as_deref(),
        ),
        Command::Signal { data_dir, symbol } => run_signal(&data_dir, &symbol),
        Command::Strategies => {
            print!("{}", format_strategies());
            Ok(())
        }
        Command::Validate { config } => run_validate(&config),
    };
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, TradelabError> {
    eprintln!("Loading config from {}", path.display());
    FileConfigAdapter::from_file(path)
}

/// Where, what and how to backtest, after merging flags over the config file.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub data_dir: PathBuf,
    pub symbol: String,
    pub strategy: StrategyId,
    pub config: BacktestConfig,
}

/// Command-line values win over `[data]` keys. An explicitly named strategy
/// must exist; with none given the default strategy runs.
pub fn resolve_settings(
    adapter: Option<&dyn ConfigPort>,
    data_dir: Option<&Path>,
    symbol: Option<&str>,
    strategy: Option<&str>,
) -> Result<RunSettings, TradelabError> {
    let from_config = |key: &str| adapter.and_then(|a| a.get_string("data", key));

    let data_dir = data_dir
        .map(Path::to_path_buf)
        .or_else(|| from_config("directory").map(PathBuf::from))
        .ok_or_else(|| TradelabError::ConfigMissing {
            section: "data".to_string(),
            key: "directory".to_string(),
        })?;
    let symbol = symbol
        .map(str::to_string)
        .or_else(|| from_config("symbol"))
        .ok_or_else(|| TradelabError::ConfigMissing {
            section: "data".to_string(),
            key: "symbol".to_string(),
        })?;
    let strategy = match strategy.map(str::to_string).or_else(|| from_config("strategy")) {
        Some(id) => id.trim().parse()?,
        None => StrategyId::DEFAULT,
    };
    let config = match adapter {
        Some(a) => backtest_config_from(a)?,
        None => BacktestConfig::default(),
    };

    Ok(RunSettings {
        data_dir,
        symbol,
        strategy,
        config,
    })
}

pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    symbol: &str,
    strategy: StrategyId,
    config: &BacktestConfig,
) -> Result<BacktestResult, TradelabError> {
    let candles = data_port.fetch_candles(symbol)?;
    if candles.len() < strategy.min_candles() {
        return Err(TradelabError::InsufficientData {
            symbol: symbol.to_string(),
            bars: candles.len(),
            minimum: strategy.min_candles(),
        });
    }
    eprintln!(
        "Running {strategy} on {symbol}: {} candles",
        candles.len()
    );
    Ok(run_backtest_with(&candles, strategy, config))
}

fn run_backtest(
    data_dir: Option<&Path>,
    symbol: Option<&str>,
    strategy: Option<&str>,
    config_path: Option<&Path>,
    output: Option<&Path>,
) -> Result<(), TradelabError> {
    let adapter = config_path.map(load_config).transpose()?;
    let settings = resolve_settings(
        adapter.as_ref().map(|a| a as &dyn ConfigPort),
        data_dir,
        symbol,
        strategy,
    )?;

    let data_port = CsvAdapter::new(settings.data_dir.clone());
    let result = run_backtest_pipeline(
        &data_port,
        &settings.symbol,
        settings.strategy,
        &settings.config,
    )?;
    let metrics = Metrics::compute(&result.trades, &result.equity_curve);
    print!("{}", format_summary(&result, &metrics));

    if let Some(path) = output {
        CsvReportAdapter.write(
            &result,
            &describe(settings.strategy),
            &path.display().to_string(),
        )?;
        eprintln!("\nReport written to: {}", path.display());
    }
    Ok(())
}

fn run_signal(data_dir: &Path, symbol: &str) -> Result<(), TradelabError> {
    let candles = CsvAdapter::new(data_dir.to_path_buf()).fetch_candles(symbol)?;
    println!("{}", format_signal(symbol, check_signal(&candles).as_ref()));
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), TradelabError> {
    let adapter = load_config(config_path)?;
    validate_backtest_config(&adapter)?;
    println!("{}: ok", config_path.display());
    Ok(())
}

pub fn format_summary(result: &BacktestResult, metrics: &Metrics) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== {} ===", describe(result.strategy).name);
    let _ = writeln!(out, "Total Trades:     {}", result.total_trades);
    let _ = writeln!(out, "Wins / Losses:    {} / {}", result.wins, result.losses);
    let _ = writeln!(out, "Win Rate:         {:.1}%", result.win_rate);
    let _ = writeln!(out, "Profit Factor:    {:.2}", result.profit_factor);
    let _ = writeln!(out, "Sharpe Ratio:     {:.2}", result.sharpe_ratio);
    let _ = writeln!(out, "Total Return:     {:.2}%", metrics.total_return);
    let _ = writeln!(out, "Max Drawdown:     -{:.1}%", metrics.max_drawdown * 100.0);
    let _ = writeln!(out, "Final Balance:    {:.2}", result.final_balance);
    out
}

pub fn format_signal(symbol: &str, signal: Option<&Signal>) -> String {
    match signal {
        Some(s) => format!("{symbol}: {} at {:.4} ({})", s.side, s.price, s.reason),
        None => format!("{symbol}: no signal"),
    }
}

pub fn format_strategies() -> String {
    let mut out = String::new();
    for id in StrategyId::ALL {
        let d = describe(id);
        let _ = writeln!(out, "{id}  {}", d.name);
        let _ = writeln!(out, "    {}", d.description);
        for rule in d.buy_rules.iter().chain(d.sell_rules) {
            let _ = writeln!(out, "    - {rule}");
        }
    }
    out
}
