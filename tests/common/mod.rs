#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Write;
use tradelab::domain::candle::Candle;
use tradelab::domain::error::TradelabError;
use tradelab::ports::data_port::DataPort;

pub const HOUR_MS: i64 = 3_600_000;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<Candle>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_candles(mut self, symbol: &str, candles: Vec<Candle>) -> Self {
        self.data.insert(symbol.to_string(), candles);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_candles(&self, symbol: &str) -> Result<Vec<Candle>, TradelabError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(TradelabError::Data {
                reason: reason.clone(),
            });
        }
        match self.data.get(symbol) {
            Some(candles) if !candles.is_empty() => Ok(candles.clone()),
            _ => Err(TradelabError::NoData {
                symbol: symbol.to_string(),
            }),
        }
    }
}

pub fn make_candle(index: usize, close: f64, spread: f64, volume: f64) -> Candle {
    Candle {
        time: index as i64 * HOUR_MS,
        open: close,
        high: close + spread,
        low: close - spread,
        close,
        volume,
    }
}

pub fn flat_candles(count: usize, price: f64) -> Vec<Candle> {
    (0..count).map(|i| make_candle(i, price, 0.0, 100.0)).collect()
}

/// Hourly candles following `closes`, opening at the previous close.
pub fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Candle {
                time: i as i64 * HOUR_MS,
                open,
                high: open.max(close) * 1.002,
                low: open.min(close) * 0.998,
                close,
                volume: 100.0 + (i % 7) as f64 * 10.0,
            }
        })
        .collect()
}

/// 50 quiet bars alternating 100.5 / 99.5, a five-bar selloff on heavy
/// volume, then a recovery back above 100.
pub fn selloff_and_recovery() -> Vec<Candle> {
    let mut candles: Vec<Candle> = (0..50)
        .map(|i| {
            let close = if i % 2 == 0 { 100.5 } else { 99.5 };
            make_candle(i, close, 0.25, 100.0)
        })
        .collect();
    for (k, close) in [98.0, 96.0, 94.0, 92.0, 90.0].into_iter().enumerate() {
        candles.push(make_candle(50 + k, close, 0.5, 300.0));
    }
    for (k, close) in [92.0, 94.0, 96.0, 98.0, 100.0, 102.0, 103.0, 104.0]
        .into_iter()
        .enumerate()
    {
        candles.push(make_candle(55 + k, close, 0.5, 100.0));
    }
    candles
}

pub fn write_candles_csv(dir: &std::path::Path, symbol: &str, candles: &[Candle]) {
    let mut file = std::fs::File::create(dir.join(format!("{symbol}.csv"))).unwrap();
    writeln!(file, "time,open,high,low,close,volume").unwrap();
    for c in candles {
        writeln!(
            file,
            "{},{},{},{},{},{}",
            c.time, c.open, c.high, c.low, c.close, c.volume
        )
        .unwrap();
    }
}

/// 250 hourly bars climbing half a point per bar with a sine wobble, so the
/// climb is broken by short red pullbacks.
pub fn uptrend_with_oscillation() -> Vec<Candle> {
    let closes: Vec<f64> = (0..250)
        .map(|i| 100.0 + i as f64 * 0.5 + (i as f64).sin())
        .collect();
    candles_from_closes(&closes)
}
