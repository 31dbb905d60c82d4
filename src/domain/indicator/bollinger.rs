//! Bollinger Bands indicator.
//!
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! StdDev is the population standard deviation (divides by N, not N-1).
//! Default parameters: period=20, multiplier=2.0.
//! Warmup: first (period-1) values are undefined.

use super::calculate_sma;

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_MULTIPLIER: f64 = 2.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BollingerBands {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
}

impl BollingerBands {
    /// Upper minus lower band.
    pub fn width(&self) -> Vec<f64> {
        self.upper
            .iter()
            .zip(self.lower.iter())
            .map(|(u, l)| u - l)
            .collect()
    }
}

pub fn calculate_bollinger(data: &[f64], period: usize, multiplier: f64) -> BollingerBands {
    let middle = calculate_sma(data, period);
    let mut upper = Vec::with_capacity(data.len());
    let mut lower = Vec::with_capacity(data.len());

    for (i, &mean) in middle.iter().enumerate() {
        if mean.is_nan() {
            upper.push(f64::NAN);
            lower.push(f64::NAN);
            continue;
        }

        let window = &data[i + 1 - period..=i];
        let variance = window
            .iter()
            .map(|v| {
                let diff = v - mean;
                diff * diff
            })
            .sum::<f64>()
            / period as f64;
        let stddev = variance.sqrt();

        upper.push(mean + stddev * multiplier);
        lower.push(mean - stddev * multiplier);
    }

    BollingerBands {
        upper,
        middle,
        lower,
    }
}
