//! Stateless "is there a trade right now" check on the most recent bar.
//!
//! Buy: EMA(9) > EMA(21) > SMA(50) with the close above SMA(200), RSI(14)
//! strictly between 40 and 70, and either a MACD line cross above its signal
//! or a StochRSI %K cross above %D while %K is under 30.
//!
//! Sell mirrors it: EMA(9) < EMA(21) < SMA(50), close under SMA(200), RSI
//! between 30 and 60, a MACD cross down or a %K cross under %D above 70.
//!
//! Undefined indicator values never satisfy a comparison, so a series too
//! short for SMA(200) cannot signal.

use std::fmt;

use super::candle::Candle;
use super::indicator::{
    calculate_ema, calculate_macd, calculate_rsi, calculate_sma, calculate_stoch_rsi, macd, rsi,
    stoch_rsi,
};
use super::indicator_helpers::closes;

pub const MIN_CANDLES: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalSide {
    Buy,
    Sell,
}

impl fmt::Display for SignalSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalSide::Buy => write!(f, "Buy"),
            SignalSide::Sell => write!(f, "Sell"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub side: SignalSide,
    /// Close of the last bar.
    pub price: f64,
    pub reason: String,
}

/// Indicator readings for the last two bars.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    pub price: f64,
    pub ema9: f64,
    pub ema21: f64,
    pub sma50: f64,
    pub sma200: f64,
    pub rsi: f64,
    pub stoch_k: f64,
    pub stoch_d: f64,
    pub prev_stoch_k: f64,
    pub prev_stoch_d: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub prev_macd: f64,
    pub prev_macd_signal: f64,
}

impl Snapshot {
    /// `None` below [`MIN_CANDLES`].
    pub fn from_candles(candles: &[Candle]) -> Option<Self> {
        if candles.len() < MIN_CANDLES {
            return None;
        }
        let closes = closes(candles);
        let ema9 = calculate_ema(&closes, 9);
        let ema21 = calculate_ema(&closes, 21);
        let sma50 = calculate_sma(&closes, 50);
        let sma200 = calculate_sma(&closes, 200);
        let rsi = calculate_rsi(&closes, rsi::DEFAULT_PERIOD);
        let stoch = calculate_stoch_rsi(
            &closes,
            stoch_rsi::DEFAULT_RSI_PERIOD,
            stoch_rsi::DEFAULT_STOCH_PERIOD,
            stoch_rsi::DEFAULT_K_SMOOTH,
            stoch_rsi::DEFAULT_D_SMOOTH,
        );
        let macd = calculate_macd(
            &closes,
            macd::DEFAULT_FAST,
            macd::DEFAULT_SLOW,
            macd::DEFAULT_SIGNAL,
        );

        let last = closes.len() - 1;
        let prev = last - 1;
        Some(Snapshot {
            price: closes[last],
            ema9: ema9[last],
            ema21: ema21[last],
            sma50: sma50[last],
            sma200: sma200[last],
            rsi: rsi[last],
            stoch_k: stoch.k[last],
            stoch_d: stoch.d[last],
            prev_stoch_k: stoch.k[prev],
            prev_stoch_d: stoch.d[prev],
            macd: macd.macd[last],
            macd_signal: macd.signal[last],
            prev_macd: macd.macd[prev],
            prev_macd_signal: macd.signal[prev],
        })
    }

    pub fn evaluate(&self) -> Option<Signal> {
        let uptrend =
            self.ema9 > self.ema21 && self.ema21 > self.sma50 && self.price > self.sma200;
        let macd_up = self.prev_macd <= self.prev_macd_signal && self.macd > self.macd_signal;
        let stoch_up = self.prev_stoch_k <= self.prev_stoch_d
            && self.stoch_k > self.stoch_d
            && self.stoch_k < 30.0;
        if uptrend && (macd_up || stoch_up) && self.rsi > 40.0 && self.rsi < 70.0 {
            return Some(self.signal(SignalSide::Buy, macd_up));
        }

        let downtrend =
            self.ema9 < self.ema21 && self.ema21 < self.sma50 && self.price < self.sma200;
        let macd_down = self.prev_macd >= self.prev_macd_signal && self.macd < self.macd_signal;
        let stoch_down = self.prev_stoch_k >= self.prev_stoch_d
            && self.stoch_k < self.stoch_d
            && self.stoch_k > 70.0;
        if downtrend && (macd_down || stoch_down) && self.rsi > 30.0 && self.rsi < 60.0 {
            return Some(self.signal(SignalSide::Sell, macd_down));
        }
        None
    }

    fn signal(&self, side: SignalSide, macd_cross: bool) -> Signal {
        let trend = match side {
            SignalSide::Buy => "Strong Uptrend",
            SignalSide::Sell => "Strong Downtrend",
        };
        let cross = if macd_cross { "MACD Cross" } else { "Stoch Cross" };
        Signal {
            side,
            price: self.price,
            reason: format!("{trend} + {cross} | RSI: {:.0}", self.rsi),
        }
    }
}

/// Evaluate the last bar of `candles`; at most one signal.
pub fn check_signal(candles: &[Candle]) -> Option<Signal> {
    Snapshot::from_candles(candles)?.evaluate()
}
