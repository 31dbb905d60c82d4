//! Human-readable metadata for each strategy.

use super::StrategyId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrategyDescription {
    pub name: &'static str,
    pub description: &'static str,
    pub buy_rules: &'static [&'static str],
    pub sell_rules: &'static [&'static str],
}

/// Unknown ids resolve to the default strategy's description.
pub fn get_strategy_description(id: &str) -> StrategyDescription {
    describe(StrategyId::parse_or_default(id))
}

pub fn describe(id: StrategyId) -> StrategyDescription {
    match id {
        StrategyId::MeanReversionHf => StrategyDescription {
            name: "Mean Reversion (BB + RSI - High Frequency)",
            description: "Bidirectional mean reversion strategy targeting 500+ trades over 5 years with 55-65% win rate.",
            buy_rules: &[
                "Long when the low tags the lower band with RSI(14) below 35 on volume above 1.2x its 20-bar mean",
                "Exit at the middle band, on RSI above 70, at a 3% stop or after 48 bars",
                "Risk 2% of balance per trade",
            ],
            sell_rules: &[
                "Short when the high tags the upper band with RSI(14) above 65 on volume above 1.2x its 20-bar mean",
                "Exit at the middle band, on RSI below 30, at a 3% stop or after 48 bars",
            ],
        },
        StrategyId::EmaCrossoverPartial => StrategyDescription {
            name: "EMA Crossover with Partial Exits",
            description: "Trend following on EMA 20/50 crosses with a 1.8% stop and profit taken at 1.5R and 2.5R.",
            buy_rules: &[
                "Long when EMA 20 crosses above EMA 50 with RSI above 50",
                "Stop 1.8% below entry",
                "Close half at 1.5R and move the stop to entry",
                "Close the rest at 2.5R",
            ],
            sell_rules: &[
                "Short when EMA 20 crosses below EMA 50 with RSI below 50",
                "Stop 1.8% above entry",
                "Close half at 1.5R and move the stop to entry",
                "Close the rest at 2.5R",
            ],
        },
        StrategyId::BbSqueezeBreakout => StrategyDescription {
            name: "BB Squeeze Breakout (Pro)",
            description: "Trades the expansion out of a Bollinger squeeze, confirmed by volume, RSI and MACD momentum.",
            buy_rules: &[
                "Band width in the lowest 20% of the last 90 bars, then a close above the upper band",
                "Volume above 2x average, RSI 50-70, MACD histogram positive and rising",
                "Close half at +2.5% and half the rest at +4.5%",
                "Stop 1.8%, breakeven after the first target, 2% trailing after the second",
            ],
            sell_rules: &[
                "Squeeze, then a close below the lower band",
                "Volume above 2x average, RSI 30-50, MACD histogram negative and falling",
                "Close half at -2.5% and half the rest at -4.5%",
                "Maximum hold 48 bars",
            ],
        },
        StrategyId::Ema50TrendContinuation => StrategyDescription {
            name: "50 EMA Trend Continuation (Price Action)",
            description: "Price action entries after a pullback against the 50 EMA trend, targeting 2R.",
            buy_rules: &[
                "Close above the 50 EMA",
                "At least two red pullback candles",
                "Enter on a bullish engulfing candle",
                "Stop under the recent swing low, target 2R",
            ],
            sell_rules: &[
                "Close below the 50 EMA",
                "At least two green pullback candles",
                "Enter on a bearish engulfing candle",
                "Stop over the recent swing high, target 2R",
            ],
        },
        StrategyId::BbSnapBack => StrategyDescription {
            name: "BB Snap Back (Rubber Band Effect)",
            description: "EMA 200 trend filter with Bollinger (20, 2) and RSI(7): buys the snap back from an overstretched move.",
            buy_rules: &[
                "Close above EMA 200, low tags the lower band, RSI(7) below 30",
                "Enter when the same candle closes green back inside the band",
                "Close half at the middle band and move the stop to entry",
                "Close the rest at the upper band; stop at the swing low or 1.5 ATR",
            ],
            sell_rules: &[
                "Close below EMA 200, high tags the upper band, RSI(7) above 70",
                "Enter when the same candle closes red back inside the band",
                "Close half at the middle band and move the stop to entry",
                "Close the rest at the lower band; stop at the swing high or 1.5 ATR",
            ],
        },
        StrategyId::HoffmanIrb => StrategyDescription {
            name: "Hoffman IRB (Inventory Retracement Bar)",
            description: "Rob Hoffman's inventory retracement bar: trend by EMA 20/80 slope, entry on the IRB breakout.",
            buy_rules: &[
                "EMA 20 above EMA 80 with a slope of at least 28 degrees",
                "Previous candle retraces 45% of its range (IRB)",
                "Enter on a break of the IRB high",
                "Stop under the IRB low, target 1.3R, breakeven at 1R",
            ],
            sell_rules: &[
                "EMA 20 below EMA 80 with a slope of at most -28 degrees",
                "Previous candle retraces 45% of its range (IRB)",
                "Enter on a break of the IRB low",
                "Stop over the IRB high, target 1.3R, breakeven at 1R",
            ],
        },
        StrategyId::HtfSmaCrossoverMomentum => StrategyDescription {
            name: "HTF Momentum (EMA 200/50 Pullback)",
            description: "Long-only continuation: buys pullbacks to the 50 EMA while price holds above the 200 EMA.",
            buy_rules: PULLBACK_BUY_RULES,
            sell_rules: PULLBACK_SELL_RULES,
        },
        StrategyId::DynamicRetest => StrategyDescription {
            name: "Dynamic Retest (50 EMA)",
            description: "Long-only retest of the 50 EMA as dynamic support inside a 200 EMA uptrend.",
            buy_rules: PULLBACK_BUY_RULES,
            sell_rules: PULLBACK_SELL_RULES,
        },
    }
}

const PULLBACK_BUY_RULES: &[&str] = &[
    "Low above EMA 200 while the bar touches EMA 50 with RSI 40-55",
    "Setup lapses after 5 bars or on a close 1% under EMA 50",
    "Enter at the next open after a green close above EMA 50",
    "Stop under the 10-bar swing low, at least 2 ATR away",
];

const PULLBACK_SELL_RULES: &[&str] = &[
    "Close half at the prior 20-bar swing high and move the stop to entry",
    "Close the rest when a candle closes under EMA 20",
    "No short entries",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_strategy_is_described() {
        for id in StrategyId::ALL {
            let d = get_strategy_description(id.as_str());
            assert!(!d.name.is_empty(), "{id}");
            assert!(!d.description.is_empty(), "{id}");
            assert!(!d.buy_rules.is_empty(), "{id}");
            assert!(!d.sell_rules.is_empty(), "{id}");
            assert!(d.buy_rules.iter().chain(d.sell_rules).all(|r| !r.is_empty()));
        }
    }

    #[test]
    fn unknown_id_describes_default() {
        assert_eq!(
            get_strategy_description("does-not-exist"),
            describe(StrategyId::DEFAULT)
        );
        assert_eq!(
            get_strategy_description("").name,
            "Mean Reversion (BB + RSI - High Frequency)"
        );
    }

    #[test]
    fn names_are_distinct() {
        let mut names: Vec<_> = StrategyId::ALL.iter().map(|id| describe(*id).name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), StrategyId::ALL.len());
    }
}
