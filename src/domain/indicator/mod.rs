//! Technical indicator library.
//!
//! Every function is pure and returns a series aligned index-for-index with its
//! input. Positions inside an indicator's warm-up hold `f64::NAN` rather than
//! being omitted, so `series[i]` always describes `candles[i]`.
//!
//! - [`calculate_sma`], [`calculate_ema`]: moving averages
//! - [`calculate_rsi`]: windowed relative strength index
//! - [`calculate_macd`]: MACD line, signal line and histogram
//! - [`calculate_bollinger`]: Bollinger bands (population std-dev)
//! - [`calculate_atr`], [`calculate_atr_rolling`]: average true range
//! - [`calculate_stoch_rsi`]: stochastic RSI %K / %D

pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod stoch_rsi;

pub use atr::{calculate_atr, calculate_atr_rolling};
pub use bollinger::{calculate_bollinger, BollingerBands};
pub use ema::calculate_ema;
pub use macd::{calculate_macd, MacdSeries};
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;
pub use stoch_rsi::{calculate_stoch_rsi, StochRsi};

/// A series of `len` undefined values.
pub(crate) fn undefined(len: usize) -> Vec<f64> {
    vec![f64::NAN; len]
}
