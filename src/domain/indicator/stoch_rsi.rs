//! Stochastic RSI.
//!
//! stoch[i] = (RSI[i] - min) / (max - min) * 100 over the trailing
//! `stoch_period` RSI values; 50 when that range is zero. A window holding an
//! undefined RSI value is undefined. %K = SMA(stoch, k_smooth),
//! %D = SMA(%K, d_smooth).

use super::{calculate_rsi, calculate_sma};

pub const DEFAULT_RSI_PERIOD: usize = 14;
pub const DEFAULT_STOCH_PERIOD: usize = 14;
pub const DEFAULT_K_SMOOTH: usize = 3;
pub const DEFAULT_D_SMOOTH: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct StochRsi {
    pub k: Vec<f64>,
    pub d: Vec<f64>,
}

pub fn calculate_stoch_rsi(
    data: &[f64],
    rsi_period: usize,
    stoch_period: usize,
    k_smooth: usize,
    d_smooth: usize,
) -> StochRsi {
    let rsi = calculate_rsi(data, rsi_period);
    let mut stoch = Vec::with_capacity(rsi.len());

    for i in 0..rsi.len() {
        if stoch_period == 0 || i + 1 < stoch_period || rsi[i].is_nan() {
            stoch.push(f64::NAN);
            continue;
        }

        let window = &rsi[i + 1 - stoch_period..=i];
        if window.iter().any(|v| v.is_nan()) {
            stoch.push(f64::NAN);
            continue;
        }

        let min = window.iter().copied().fold(f64::INFINITY, f64::min);
        let max = window.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let range = max - min;
        stoch.push(if range == 0.0 {
            50.0
        } else {
            (rsi[i] - min) / range * 100.0
        });
    }

    let k = calculate_sma(&stoch, k_smooth);
    let d = calculate_sma(&k, d_smooth);
    StochRsi { k, d }
}
