//! Backtest report port.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::TradelabError;
use crate::domain::strategy::registry::StrategyDescription;

pub trait ReportPort {
    fn write(
        &self,
        result: &BacktestResult,
        description: &StrategyDescription,
        output_path: &str,
    ) -> Result<(), TradelabError>;
}
