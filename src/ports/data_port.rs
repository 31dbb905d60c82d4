//! Market data port.

use crate::domain::candle::Candle;
use crate::domain::error::TradelabError;

pub trait DataPort {
    /// All candles for `symbol`, in source order.
    fn fetch_candles(&self, symbol: &str) -> Result<Vec<Candle>, TradelabError>;
}
