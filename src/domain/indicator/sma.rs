//! Simple Moving Average.
//!
//! SMA(n)[i] = mean(data[i-n+1..=i]). Warmup: first (n-1) values are undefined.
//! A window containing an undefined value is itself undefined.

use super::undefined;

pub fn calculate_sma(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 {
        return undefined(data.len());
    }

    let mut values = Vec::with_capacity(data.len());
    for i in 0..data.len() {
        if i + 1 < period {
            values.push(f64::NAN);
            continue;
        }
        let window = &data[i + 1 - period..=i];
        values.push(window.iter().sum::<f64>() / period as f64);
    }
    values
}
