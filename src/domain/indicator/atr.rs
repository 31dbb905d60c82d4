//! Average True Range.
//!
//! True range: bar 0 uses high - low; later bars use
//! max(high - low, |high - prev_close|, |low - prev_close|).
//!
//! [`calculate_atr`] is Wilder-smoothed: seed with the simple mean of the
//! first n true ranges at index n-1, then ATR[i] = (ATR[i-1]*(n-1) + TR[i]) / n.
//!
//! [`calculate_atr_rolling`] is a plain trailing mean of the last n true ranges,
//! defined from index n (every window bar has a previous close).

use super::undefined;
use crate::domain::candle::Candle;

pub const DEFAULT_PERIOD: usize = 14;

fn true_ranges(candles: &[Candle]) -> Vec<f64> {
    candles
        .iter()
        .enumerate()
        .map(|(i, c)| {
            if i == 0 {
                c.range()
            } else {
                c.true_range(candles[i - 1].close)
            }
        })
        .collect()
}

pub fn calculate_atr(candles: &[Candle], period: usize) -> Vec<f64> {
    let mut values = undefined(candles.len());
    if period == 0 || candles.len() < period {
        return values;
    }

    let tr = true_ranges(candles);
    let mut atr = tr[..period].iter().sum::<f64>() / period as f64;
    values[period - 1] = atr;

    for i in period..candles.len() {
        atr = (atr * (period - 1) as f64 + tr[i]) / period as f64;
        values[i] = atr;
    }

    values
}

pub fn calculate_atr_rolling(candles: &[Candle], period: usize) -> Vec<f64> {
    let mut values = undefined(candles.len());
    if period == 0 {
        return values;
    }

    let tr = true_ranges(candles);
    for i in period..candles.len() {
        values[i] = tr[i + 1 - period..=i].iter().sum::<f64>() / period as f64;
    }

    values
}
