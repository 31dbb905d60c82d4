//! Core domain types and logic: candles, indicators, the backtest engine,
//! the strategy policies and the signal checker.

pub mod candle;
pub mod position;
pub mod execution;
pub mod ledger;
pub mod indicator;
pub mod indicator_helpers;
pub mod backtest;
pub mod metrics;
pub mod signal;
pub mod strategy;
pub mod config_validation;
pub mod error;
