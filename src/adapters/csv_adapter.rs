//! CSV file data adapter.
//!
//! Reads `<base>/<symbol>.csv` with the header `time,open,high,low,close,volume`.
//! `time` is either epoch milliseconds or a date / date-time (`YYYY-MM-DD`,
//! `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS`, RFC 3339), taken as UTC.
//! Rows come back in file order.

use crate::domain::candle::Candle;
use crate::domain::error::TradelabError;
use crate::ports::data_port::DataPort;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{symbol}.csv"))
    }
}

/// Epoch milliseconds for any supported `time` format.
pub fn parse_time(value: &str) -> Result<i64, TradelabError> {
    let value = value.trim();
    if let Ok(ms) = value.parse::<i64>() {
        return Ok(ms);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.timestamp_millis());
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(dt.and_utc().timestamp_millis());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
        .ok_or_else(|| TradelabError::Data {
            reason: format!("invalid time value: {value}"),
        })
}

fn parse_price(record: &csv::StringRecord, index: usize, name: &str) -> Result<f64, TradelabError> {
    record
        .get(index)
        .ok_or_else(|| TradelabError::Data {
            reason: format!("missing {name} column"),
        })?
        .trim()
        .parse()
        .map_err(|e| TradelabError::Data {
            reason: format!("invalid {name} value: {e}"),
        })
}

impl DataPort for CsvAdapter {
    fn fetch_candles(&self, symbol: &str) -> Result<Vec<Candle>, TradelabError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| TradelabError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut candles: Vec<Candle> = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| TradelabError::Data {
                reason: format!("CSV parse error: {e}"),
            })?;

            let time = parse_time(record.get(0).ok_or_else(|| TradelabError::Data {
                reason: "missing time column".into(),
            })?)?;

            if let Some(prev) = candles.last() {
                if time <= prev.time {
                    log::warn!(
                        "{symbol}: row {} time {time} does not follow {}",
                        candles.len() + 1,
                        prev.time
                    );
                }
            }

            candles.push(Candle {
                time,
                open: parse_price(&record, 1, "open")?,
                high: parse_price(&record, 2, "high")?,
                low: parse_price(&record, 3, "low")?,
                close: parse_price(&record, 4, "close")?,
                volume: parse_price(&record, 5, "volume")?,
            });
        }

        if candles.is_empty() {
            return Err(TradelabError::NoData {
                symbol: symbol.to_string(),
            });
        }
        log::debug!("{symbol}: loaded {} candles from {}", candles.len(), path.display());
        Ok(candles)
    }
}
