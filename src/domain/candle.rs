//! Candle (price bar) representation.

#[derive(Debug, Clone, PartialEq)]
pub struct Candle {
    /// Bar open time, milliseconds since the Unix epoch.
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }

    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    /// Closed above its open ("green").
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// Closed below its open ("red").
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_candle() -> Candle {
        Candle {
            time: 1_700_000_000_000,
            open: 100.0,
            high: 110.0,
            low: 90.0,
            close: 105.0,
            volume: 50_000.0,
        }
    }

    #[test]
    fn true_range_hl_dominates() {
        let c = sample_candle();
        // high-low=20, |high-100|=10, |low-100|=10 → 20
        assert!((c.true_range(100.0) - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn true_range_gap_up() {
        let c = sample_candle();
        // high-low=20, |110-70|=40, |90-70|=20 → 40
        assert!((c.true_range(70.0) - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn true_range_gap_down() {
        let c = sample_candle();
        assert!((c.true_range(130.0) - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn geometry() {
        let c = sample_candle();
        assert!((c.range() - 20.0).abs() < f64::EPSILON);
        assert!((c.body() - 5.0).abs() < f64::EPSILON);
        assert!(c.is_bullish());
        assert!(!c.is_bearish());
    }

    #[test]
    fn doji_has_no_colour() {
        let c = Candle {
            close: 100.0,
            ..sample_candle()
        };
        assert!(!c.is_bullish());
        assert!(!c.is_bearish());
        assert_eq!(c.body(), 0.0);
    }
}
