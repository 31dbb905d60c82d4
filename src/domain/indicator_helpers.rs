//! Shared helpers for indicator-driven strategy logic.

use crate::domain::candle::Candle;

pub fn closes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}

pub fn volumes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.volume).collect()
}

/// Highest high over `candles[index - lookback..index]` (the current bar excluded).
/// `f64::NEG_INFINITY` when the window is empty.
pub fn swing_high_before(candles: &[Candle], index: usize, lookback: usize) -> f64 {
    candles[index.saturating_sub(lookback)..index]
        .iter()
        .map(|c| c.high)
        .fold(f64::NEG_INFINITY, f64::max)
}

/// Lowest low over `candles[index - lookback..index]` (the current bar excluded).
/// `f64::INFINITY` when the window is empty.
pub fn swing_low_before(candles: &[Candle], index: usize, lookback: usize) -> f64 {
    candles[index.saturating_sub(lookback)..index]
        .iter()
        .map(|c| c.low)
        .fold(f64::INFINITY, f64::min)
}

/// Highest high over `candles[index - lookback..=index]` (the current bar included).
pub fn swing_high_through(candles: &[Candle], index: usize, lookback: usize) -> f64 {
    swing_high_before(candles, index + 1, lookback + 1)
}

/// Lowest low over `candles[index - lookback..=index]` (the current bar included).
pub fn swing_low_through(candles: &[Candle], index: usize, lookback: usize) -> f64 {
    swing_low_before(candles, index + 1, lookback + 1)
}

/// `fast` moved from at-or-below `slow` to strictly above it between `i-1` and `i`.
/// Undefined operands never cross.
pub fn crossed_above(fast: &[f64], slow: &[f64], i: usize) -> bool {
    i > 0 && fast[i - 1] <= slow[i - 1] && fast[i] > slow[i]
}

/// `fast` moved from at-or-above `slow` to strictly below it between `i-1` and `i`.
pub fn crossed_below(fast: &[f64], slow: &[f64], i: usize) -> bool {
    i > 0 && fast[i - 1] >= slow[i - 1] && fast[i] < slow[i]
}

/// Slope of `series` over the last `lookback` bars as an angle in degrees:
/// atan((s[i] - s[i-lookback]) / s[i-lookback]). Zero before enough history.
pub fn slope_angle_degrees(series: &[f64], index: usize, lookback: usize) -> f64 {
    if index < lookback {
        return 0.0;
    }
    let base = series[index - lookback];
    let slope = (series[index] - base) / base;
    slope.atan().to_degrees()
}
