//! RSI (Relative Strength Index) indicator.
//!
//! The first value (index `period`) averages the gains and losses of the first
//! `period` price changes. Every later value is recomputed from scratch over the
//! trailing window `data[i-period+1..=i]`: that window holds `period - 1`
//! changes, and their sums are still divided by `period`. This is not Wilder
//! smoothing; strategy thresholds are tuned against this exact series.
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss)).
//! If avg_loss == 0: RSI = 100.
//!
//! Warmup: indices `0..period` are undefined.

use super::undefined;

pub const DEFAULT_PERIOD: usize = 14;

pub fn calculate_rsi(data: &[f64], period: usize) -> Vec<f64> {
    let mut values = undefined(data.len());
    if period == 0 || data.len() <= period {
        return values;
    }

    let (gains, losses) = sum_changes(&data[..=period]);
    values[period] = rsi_from_averages(gains / period as f64, losses / period as f64);

    for i in period + 1..data.len() {
        let (gains, losses) = sum_changes(&data[i + 1 - period..=i]);
        values[i] = rsi_from_averages(gains / period as f64, losses / period as f64);
    }

    values
}

fn sum_changes(window: &[f64]) -> (f64, f64) {
    let mut gains = 0.0;
    let mut losses = 0.0;
    for pair in window.windows(2) {
        let change = pair[1] - pair[0];
        if change > 0.0 {
            gains += change;
        } else {
            losses -= change;
        }
    }
    (gains, losses)
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
}
